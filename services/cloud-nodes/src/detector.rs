//! Cloud Provider Detection
//!
//! Guesses the hosting cloud from provider install markers on the local
//! filesystem. The first marker that exists wins.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// A provider and the path whose existence identifies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMarker {
    pub provider: String,
    pub path: PathBuf,
}

impl ProviderMarker {
    pub fn new(provider: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            provider: provider.to_string(),
            path: path.into(),
        }
    }

    /// Built-in markers, in precedence order
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("aws", "/config/cloud/aws"),
            Self::new("azure", "/config/cloud/node_modules"),
        ]
    }
}

impl std::str::FromStr for ProviderMarker {
    type Err = String;

    /// Parse `provider=path`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((provider, path)) if !provider.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self::new(provider.trim(), path.trim()))
            }
            _ => Err(format!("expected provider=path, got {}", s)),
        }
    }
}

/// Detection result; `cloudProvider` is omitted when nothing matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloudDetector {
    markers: Vec<ProviderMarker>,
}

impl CloudDetector {
    pub const URI_PATH: &'static str = "shared/cloud/service-discovery/cloud-detector";

    pub fn new(markers: Vec<ProviderMarker>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[ProviderMarker] {
        &self.markers
    }

    /// Check markers in order. Filesystem errors count as "not present".
    pub async fn detect(&self) -> Detection {
        for marker in &self.markers {
            match tokio::fs::try_exists(&marker.path).await {
                Ok(true) => {
                    info!(provider = %marker.provider, path = %marker.path.display(), "Detected cloud provider");
                    return Detection {
                        cloud_provider: Some(marker.provider.clone()),
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    debug!(path = %marker.path.display(), error = %e, "Marker existence check failed");
                }
            }
        }

        debug!("No cloud provider markers found");
        Detection::default()
    }
}

impl Default for CloudDetector {
    fn default() -> Self {
        Self::new(ProviderMarker::defaults())
    }
}
