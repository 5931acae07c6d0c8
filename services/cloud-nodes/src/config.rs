//! Service configuration from flags and environment

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::detector::ProviderMarker;
use crate::provider::{
    BridgeConfig, BridgeProvider, CloudProviderClient, ProviderContext, ProviderRegistry,
};

/// A cloud and the URL of its provider bridge, parsed from `cloud=url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub cloud: String,
    pub url: String,
}

impl std::str::FromStr for ProviderEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((cloud, url)) if !cloud.trim().is_empty() && !url.trim().is_empty() => {
                Ok(Self {
                    cloud: cloud.trim().to_string(),
                    url: url.trim().to_string(),
                })
            }
            _ => Err(format!("expected cloud=url, got {}", s)),
        }
    }
}

/// Cloud Nodes Worker - cloud detection and pool member discovery
#[derive(Parser, Debug, Clone)]
#[command(name = "cloud-nodes-worker", version, about)]
pub struct Config {
    /// Address to serve HTTP on
    #[arg(long, default_value = "0.0.0.0:8080", env = "LISTEN_ADDR")]
    pub listen_addr: SocketAddr,

    /// Cloud marker as provider=path, in precedence order (defaults to the built-in markers)
    #[arg(long = "marker", env = "CLOUD_MARKERS", value_delimiter = ',')]
    pub markers: Vec<ProviderMarker>,

    /// Provider bridge as cloud=url, one per supported cloud
    #[arg(long = "provider-endpoint", env = "PROVIDER_ENDPOINTS", value_delimiter = ',')]
    pub provider_endpoints: Vec<ProviderEndpoint>,

    /// User provider clients act as
    #[arg(long, default_value = "admin", env = "PROVIDER_ADMIN_USER")]
    pub admin_user: String,

    /// Timeout for each provider bridge request, in seconds
    #[arg(long, default_value = "30", env = "PROVIDER_TIMEOUT_SECS")]
    pub provider_timeout_secs: u64,
}

impl Config {
    /// Configured markers, or the built-in ones when none were given
    pub fn markers(&self) -> Vec<ProviderMarker> {
        if self.markers.is_empty() {
            ProviderMarker::defaults()
        } else {
            self.markers.clone()
        }
    }

    pub fn provider_context(&self) -> ProviderContext {
        ProviderContext::new(&self.admin_user)
    }

    /// Registry with one bridge-backed provider per configured endpoint
    pub fn provider_registry(&self) -> ProviderRegistry {
        let timeout = Duration::from_secs(self.provider_timeout_secs);
        let mut registry = ProviderRegistry::new();

        for endpoint in &self.provider_endpoints {
            let cloud = endpoint.cloud.clone();
            let bridge = BridgeConfig::new(&endpoint.url, timeout);

            registry.register(&endpoint.cloud, move |ctx| {
                let client = BridgeProvider::new(&cloud, &bridge, ctx)?;
                Ok(Arc::new(client) as Arc<dyn CloudProviderClient>)
            });
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["cloud-nodes-worker"]).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.markers(), ProviderMarker::defaults());
        assert_eq!(config.provider_context(), ProviderContext::default());
        assert_eq!(config.provider_timeout_secs, 30);
        assert!(config.provider_registry().is_empty());
    }

    #[test]
    fn test_endpoints_register_providers() {
        let config = Config::try_parse_from([
            "cloud-nodes-worker",
            "--provider-endpoint",
            "aws=http://127.0.0.1:9101",
            "--provider-endpoint",
            "azure=http://127.0.0.1:9102/",
        ])
        .unwrap();

        let registry = config.provider_registry();
        assert_eq!(registry.clouds(), vec!["aws", "azure"]);
        assert!(registry.create("aws", &config.provider_context()).is_ok());
    }

    #[test]
    fn test_custom_markers() {
        let config = Config::try_parse_from([
            "cloud-nodes-worker",
            "--marker",
            "gce=/config/cloud/gce,aws=/config/cloud/aws",
        ])
        .unwrap();

        let providers: Vec<String> = config.markers().into_iter().map(|m| m.provider).collect();
        assert_eq!(providers, vec!["gce", "aws"]);
    }

    #[test]
    fn test_malformed_endpoint_rejected() {
        let result = Config::try_parse_from(["cloud-nodes-worker", "--provider-endpoint", "aws"]);
        assert!(result.is_err());
    }
}
