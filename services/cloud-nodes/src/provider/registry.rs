//! Provider Registry
//!
//! Maps cloud names to client factories. Populated once at startup and
//! consulted on every request that needs a client it has not built yet.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{CloudProviderClient, ProviderContext, ProviderError};

/// Builds a client for one cloud
pub type ProviderFactory = Arc<
    dyn Fn(&ProviderContext) -> Result<Arc<dyn CloudProviderClient>, ProviderError> + Send + Sync,
>;

/// Cloud name to factory lookup
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for a cloud
    pub fn register<F>(&mut self, cloud: &str, factory: F)
    where
        F: Fn(&ProviderContext) -> Result<Arc<dyn CloudProviderClient>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        debug!(cloud = %cloud, "Registering cloud provider");
        self.factories.insert(cloud.to_string(), Arc::new(factory));
    }

    /// Builder-style `register`
    pub fn with_provider<F>(mut self, cloud: &str, factory: F) -> Self
    where
        F: Fn(&ProviderContext) -> Result<Arc<dyn CloudProviderClient>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.register(cloud, factory);
        self
    }

    pub fn contains(&self, cloud: &str) -> bool {
        self.factories.contains_key(cloud)
    }

    /// Registered cloud names, sorted
    pub fn clouds(&self) -> Vec<&str> {
        let mut clouds: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        clouds.sort_unstable();
        clouds
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct a client for `cloud`
    pub fn create(
        &self,
        cloud: &str,
        context: &ProviderContext,
    ) -> Result<Arc<dyn CloudProviderClient>, ProviderError> {
        let factory = self
            .factories
            .get(cloud)
            .ok_or_else(|| ProviderError::NotSupported(cloud.to_string()))?;

        factory(context)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("clouds", &self.clouds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    #[test]
    fn test_create_registered_provider() {
        let registry = ProviderRegistry::new().with_provider("aws", |_ctx| {
            Ok(Arc::new(MockProvider::default()) as Arc<dyn CloudProviderClient>)
        });

        assert!(registry.contains("aws"));
        assert!(registry.create("aws", &ProviderContext::default()).is_ok());
    }

    #[test]
    fn test_unknown_cloud_not_supported() {
        let registry = ProviderRegistry::new();

        let err = registry
            .create("openstack", &ProviderContext::default())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::NotSupported(ref c) if c == "openstack"));
    }

    #[test]
    fn test_factory_receives_context() {
        let registry = ProviderRegistry::new().with_provider("azure", |ctx| {
            if ctx.user == "admin" {
                Ok(Arc::new(MockProvider::default()) as Arc<dyn CloudProviderClient>)
            } else {
                Err(ProviderError::Request(format!("unexpected user {}", ctx.user)))
            }
        });

        assert!(registry.create("azure", &ProviderContext::default()).is_ok());
        assert!(registry
            .create("azure", &ProviderContext::new("operator"))
            .is_err());
    }

    #[test]
    fn test_clouds_sorted() {
        let factory = |_: &ProviderContext| {
            Ok(Arc::new(MockProvider::default()) as Arc<dyn CloudProviderClient>)
        };
        let registry = ProviderRegistry::new()
            .with_provider("gce", factory)
            .with_provider("aws", factory)
            .with_provider("azure", factory);

        assert_eq!(registry.clouds(), vec!["aws", "azure", "gce"]);
    }
}
