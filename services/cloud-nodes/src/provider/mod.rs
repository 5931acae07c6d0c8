//! Cloud Provider Clients
//!
//! Contract for the per-cloud libraries that answer tag queries, and the
//! registry that maps cloud names to client factories.
//!
//! ## Architecture
//!
//! - **Client**: `CloudProviderClient` is implemented once per cloud
//! - **Registry**: `ProviderRegistry` is populated at startup and resolves a
//!   cloud name to a freshly constructed client
//! - **Bridge**: `BridgeProvider` talks to a provider library over local HTTP

mod bridge;
mod registry;

#[cfg(test)]
pub(crate) mod mock;

pub use bridge::{BridgeConfig, BridgeProvider};
pub use registry::{ProviderFactory, ProviderRegistry};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Management port used when the request does not name one
pub const DEFAULT_MGMT_PORT: u16 = 443;

/// User every provider client is constructed for
pub const DEFAULT_ADMIN_USER: &str = "admin";

/// Credential context handed to every client at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderContext {
    pub user: String,
}

impl ProviderContext {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
        }
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_USER)
    }
}

/// Tag filter for owner queries.
///
/// A missing key means "match the value under any key"; how that is
/// evaluated is up to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl Tag {
    pub fn new(key: Option<&str>, value: &str) -> Self {
        Self {
            key: key.map(|k| k.to_string()),
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}={}", key, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Addresses attached to an owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerIp {
    #[serde(default)]
    pub public: Option<String>,
    #[serde(default)]
    pub private: Option<String>,
}

/// A network interface or virtual machine returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub ip: OwnerIp,
}

impl Owner {
    pub fn new(id: &str, public: Option<&str>, private: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            ip: OwnerIp {
                public: public.map(|s| s.to_string()),
                private: private.map(|s| s.to_string()),
            },
        }
    }
}

/// Options passed to `CloudProviderClient::init`.
///
/// Serializes as one flat object: `{"mgmtPort": 443, "<key>": "<value>", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    pub mgmt_port: u16,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ProviderOptions {
    pub fn new(mgmt_port: u16) -> Self {
        Self {
            mgmt_port,
            extra: BTreeMap::new(),
        }
    }

    /// Look up a provider-specific option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(|v| v.as_str())
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MGMT_PORT)
    }
}

/// Errors raised by provider construction or provider calls
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No factory is registered for the cloud
    #[error("Cloud provider not supported: {0}")]
    NotSupported(String),

    /// Query issued before `init` completed
    #[error("Cloud provider {0} is not initialized")]
    NotInitialized(String),

    /// Transport or non-success status from the provider
    #[error("Provider request failed: {0}")]
    Request(String),

    /// Provider answered with a body that is not an owner list
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err.to_string())
    }
}

/// Client for one cloud's provider library
#[async_trait]
pub trait CloudProviderClient: Send + Sync {
    /// Prepare the client for the queries that follow
    async fn init(&self, options: &ProviderOptions) -> Result<(), ProviderError>;

    /// Network interfaces carrying the tag; `None` when the provider has no list
    async fn get_nics_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError>;

    /// Virtual machines carrying the tag; `None` when the provider has no list
    async fn get_vms_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError>;
}
