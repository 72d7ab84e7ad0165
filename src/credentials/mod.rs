pub mod file;
pub mod gate;
pub mod memory;
pub mod traits;

use crate::{
    config::{CredentialBackend, CredentialStoreConfig},
    error::{IdeationError, Result},
};
use std::fmt;
use std::sync::Arc;

pub use file::FileCredentialStore;
pub use gate::{CredentialGate, GateStatus};
pub use memory::MemoryCredentialStore;
pub use traits::{CredentialStore, CREDENTIAL_KEY};

/// The API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims the input; `None` when nothing is left.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***{} chars)", self.0.len())
    }
}

/// Shared handle to the credential store. Cloning is cheap; all clones see
/// the same backend.
#[derive(Clone)]
pub struct CredentialProvider {
    backend: Arc<dyn CredentialStore>,
}

impl CredentialProvider {
    pub fn new(backend: Arc<dyn CredentialStore>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &CredentialStoreConfig) -> Self {
        let backend: Arc<dyn CredentialStore> = match config.backend {
            CredentialBackend::File => {
                Arc::new(FileCredentialStore::new(config.resolved_file_path()))
            }
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        };
        log::debug!("Using {} credential store", backend.backend_name());
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.backend
    }

    pub async fn current(&self) -> Result<Option<Credential>> {
        self.backend.get().await
    }

    pub async fn require(&self) -> Result<Credential> {
        self.current()
            .await?
            .ok_or(IdeationError::CredentialMissing)
    }

    pub async fn has_credential(&self) -> bool {
        matches!(self.current().await, Ok(Some(_)))
    }

    /// Persists a user-entered key after trimming. Empty input is rejected.
    pub async fn submit(&self, input: &str) -> Result<Credential> {
        let credential = Credential::parse(input)
            .ok_or_else(|| IdeationError::validation("Please enter an API key."))?;
        self.backend.set(&credential).await?;
        log::info!("API key saved to {} store", self.backend.backend_name());
        Ok(credential)
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await?;
        log::info!("API key cleared from {} store", self.backend.backend_name());
        Ok(())
    }
}
