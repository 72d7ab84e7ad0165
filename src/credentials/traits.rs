use crate::{credentials::Credential, error::Result};
use async_trait::async_trait;

/// Key under which the API key is persisted.
pub const CREDENTIAL_KEY: &str = "gemini-api-key";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<Credential>>;
    async fn set(&self, credential: &Credential) -> Result<()>;
    async fn clear(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
