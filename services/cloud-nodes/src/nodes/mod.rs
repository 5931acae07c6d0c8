//! Node Lookup
//!
//! Resolves a tag query against a cloud provider into load-balancing pool
//! members. Interfaces are preferred; virtual machines are consulted only
//! when no interface yields an address of the requested type.

mod node;
mod query;

pub use node::{select_nodes, to_nodes, Node};
pub use query::{
    parse_provider_options, parse_tag, split_pair, AddressType, NodesQuery, RawNodesQuery,
};

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info, trace};

use crate::error::NodesError;
use crate::provider::{CloudProviderClient, ProviderContext, ProviderRegistry};

type ClientCell = Arc<OnceCell<Arc<dyn CloudProviderClient>>>;

/// Node Lookup handler.
///
/// Long-lived: clients are built on first use of each cloud and reused
/// by every later request.
pub struct NodesWorker {
    registry: Arc<ProviderRegistry>,
    context: ProviderContext,
    pinned: Option<Arc<dyn CloudProviderClient>>,
    clients: Mutex<HashMap<String, ClientCell>>,
}

impl NodesWorker {
    pub const URI_PATH: &'static str = "shared/cloud/nodes";

    pub fn new(registry: Arc<ProviderRegistry>, context: ProviderContext) -> Self {
        Self {
            registry,
            context,
            pinned: None,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Use `client` for every cloud instead of building one from the registry
    pub fn with_provider(mut self, client: Arc<dyn CloudProviderClient>) -> Self {
        self.pinned = Some(client);
        self
    }

    /// Validate a raw query and run the lookup
    pub async fn handle(&self, raw: RawNodesQuery) -> Result<Vec<Node>, NodesError> {
        debug!("Handling node lookup request");
        let query = NodesQuery::try_from(raw)?;
        self.lookup(&query).await
    }

    #[tracing::instrument(skip_all, fields(cloud = %query.cloud))]
    pub async fn lookup(&self, query: &NodesQuery) -> Result<Vec<Node>, NodesError> {
        debug!(cloud = %query.cloud, "using cloud");

        let client = self.client_for(&query.cloud).await?;

        let result = self.fetch_nodes(client.as_ref(), query).await;
        if let Err(e) = &result {
            error!(error = %e, "Error while getting nodes");
        }
        result
    }

    async fn fetch_nodes(
        &self,
        client: &dyn CloudProviderClient,
        query: &NodesQuery,
    ) -> Result<Vec<Node>, NodesError> {
        debug!(mgmt_port = query.options.mgmt_port, "Initializing cloud provider");
        client.init(&query.options).await?;

        debug!("Getting NICs");
        trace!(key = ?query.tag.key, value = %query.tag.value, "member tag");

        let (nics, vms) = futures::try_join!(
            client.get_nics_by_tag(&query.tag),
            client.get_vms_by_tag(&query.tag),
        )?;

        trace!(
            nics = nics.as_ref().map_or(0, |n| n.len()),
            vms = vms.as_ref().map_or(0, |v| v.len()),
            "provider owners"
        );

        let nodes = select_nodes(nics, vms, query.address_type);
        if nodes.is_empty() {
            debug!("no valid pool nodes found");
        }

        Ok(nodes)
    }

    async fn client_for(&self, cloud: &str) -> Result<Arc<dyn CloudProviderClient>, NodesError> {
        if let Some(client) = &self.pinned {
            return Ok(client.clone());
        }

        if !self.registry.contains(cloud) {
            return Err(NodesError::ProviderNotSupported(cloud.to_string()));
        }

        let cell = {
            let mut clients = self.clients.lock().await;
            clients.entry(cloud.to_string()).or_default().clone()
        };

        let client = cell
            .get_or_try_init(|| async {
                info!(cloud = %cloud, user = %self.context.user, "Creating cloud provider client");
                self.registry.create(cloud, &self.context)
            })
            .await?;

        Ok(client.clone())
    }
}
