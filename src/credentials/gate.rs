use crate::{
    credentials::{Credential, CredentialProvider},
    error::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// No credential stored; nothing else may run until one is submitted.
    Required,
    Satisfied,
}

/// Entry point for the API key. Does not validate the key against the
/// service: a bad key only shows up when a generation call fails.
#[derive(Clone)]
pub struct CredentialGate {
    provider: CredentialProvider,
}

impl CredentialGate {
    pub fn new(provider: CredentialProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &CredentialProvider {
        &self.provider
    }

    pub async fn status(&self) -> GateStatus {
        if self.provider.has_credential().await {
            GateStatus::Satisfied
        } else {
            GateStatus::Required
        }
    }

    pub async fn submit(&self, input: &str) -> Result<Credential> {
        self.provider.submit(input).await
    }

    /// Explicit sign-out by the user.
    pub async fn dismiss(&self) -> Result<()> {
        self.provider.clear().await
    }
}
