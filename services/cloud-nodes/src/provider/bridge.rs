//! Provider Bridge Client
//!
//! Talks to a cloud provider library exposed on a local HTTP endpoint:
//!
//! - `POST {base}/init` with `{"user": ..., "options": {...}}`
//! - `GET {base}/nics?key=..&value=..`
//! - `GET {base}/vms?key=..&value=..`
//!
//! Owner queries answer with a JSON array of owners, or `null`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::{CloudProviderClient, Owner, ProviderContext, ProviderError, ProviderOptions, Tag};

/// Where a cloud's bridge lives and how long to wait on it
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl BridgeConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[derive(Debug, Serialize)]
struct InitRequest<'a> {
    user: &'a str,
    options: &'a ProviderOptions,
}

/// `CloudProviderClient` backed by a provider bridge
pub struct BridgeProvider {
    cloud: String,
    base_url: String,
    http_client: Client,
    context: ProviderContext,
    initialized: AtomicBool,
}

impl BridgeProvider {
    pub fn new(
        cloud: &str,
        config: &BridgeConfig,
        context: &ProviderContext,
    ) -> Result<Self, ProviderError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            cloud: cloud.to_string(),
            base_url: config.base_url.clone(),
            http_client,
            context: context.clone(),
            initialized: AtomicBool::new(false),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_owners(
        &self,
        resource: &str,
        tag: &Tag,
    ) -> Result<Option<Vec<Owner>>, ProviderError> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(ProviderError::NotInitialized(self.cloud.clone()));
        }

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(key) = tag.key.as_deref() {
            query.push(("key", key));
        }
        query.push(("value", tag.value.as_str()));

        debug!(cloud = %self.cloud, resource = %resource, tag = %tag, "Querying provider bridge");

        let response = self
            .http_client
            .get(self.url(resource))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "{} {} returned {}: {}",
                self.cloud, resource, status, body
            )));
        }

        response
            .json::<Option<Vec<Owner>>>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CloudProviderClient for BridgeProvider {
    async fn init(&self, options: &ProviderOptions) -> Result<(), ProviderError> {
        let body = InitRequest {
            user: &self.context.user,
            options,
        };

        let response = self
            .http_client
            .post(self.url("init"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "{} init returned {}: {}",
                self.cloud, status, body
            )));
        }

        self.initialized.store(true, Ordering::Release);
        info!(cloud = %self.cloud, mgmt_port = options.mgmt_port, "Provider bridge initialized");
        Ok(())
    }

    async fn get_nics_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError> {
        self.fetch_owners("nics", tag).await
    }

    async fn get_vms_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError> {
        self.fetch_owners("vms", tag).await
    }
}
