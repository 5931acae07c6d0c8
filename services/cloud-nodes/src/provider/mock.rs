//! In-memory provider used by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{CloudProviderClient, Owner, ProviderError, ProviderOptions, Tag};

#[derive(Default)]
pub(crate) struct MockProvider {
    pub nics: Option<Vec<Owner>>,
    pub vms: Option<Vec<Owner>>,
    pub fail_init: Option<String>,
    pub fail_nics: Option<String>,
    pub fail_vms: Option<String>,
    pub init_options: Mutex<Option<ProviderOptions>>,
    pub tags: Mutex<Vec<Tag>>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_owners(nics: Option<Vec<Owner>>, vms: Option<Vec<Owner>>) -> Self {
        Self {
            nics,
            vms,
            ..Default::default()
        }
    }

    pub fn init_options(&self) -> Option<ProviderOptions> {
        self.init_options.lock().unwrap().clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudProviderClient for MockProvider {
    async fn init(&self, options: &ProviderOptions) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.init_options.lock().unwrap() = Some(options.clone());
        match &self.fail_init {
            Some(msg) => Err(ProviderError::Request(msg.clone())),
            None => Ok(()),
        }
    }

    async fn get_nics_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tags.lock().unwrap().push(tag.clone());
        match &self.fail_nics {
            Some(msg) => Err(ProviderError::Request(msg.clone())),
            None => Ok(self.nics.clone()),
        }
    }

    async fn get_vms_by_tag(&self, tag: &Tag) -> Result<Option<Vec<Owner>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tags.lock().unwrap().push(tag.clone());
        match &self.fail_vms {
            Some(msg) => Err(ProviderError::Request(msg.clone())),
            None => Ok(self.vms.clone()),
        }
    }
}
