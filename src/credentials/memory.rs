use crate::{
    credentials::{traits::CredentialStore, Credential},
    error::Result,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryCredentialStore {
    value: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            value: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        Ok(self.value.read().await.clone())
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        *self.value.write().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.value.write().await = None;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
