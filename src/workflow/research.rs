use crate::{
    credentials::CredentialProvider,
    models::{GroundedAnswer, LoadingState, RenderedSource},
    service::GenerationService,
    workflow::ActionOutcome,
};
use std::sync::Arc;

pub const RESEARCH_CREDENTIAL_MESSAGE: &str = "API Key error. Please re-select your API key.";
pub const RESEARCH_STATUS: &str = "Finding the latest information...";

/// Single-shot grounded question answering, independent of the ideation
/// workflow. Keeps its own "credential selected" flag: a credential failure
/// sends only this panel back to its key prompt.
pub struct ResearchAssistant {
    service: Arc<dyn GenerationService>,
    credentials: CredentialProvider,
    query: String,
    result: Option<GroundedAnswer>,
    loading: LoadingState,
    error: Option<String>,
    credential_selected: bool,
}

impl ResearchAssistant {
    pub fn new(service: Arc<dyn GenerationService>, credentials: CredentialProvider) -> Self {
        Self {
            service,
            credentials,
            query: String::new(),
            result: None,
            loading: LoadingState::idle(),
            error: None,
            credential_selected: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> Option<&GroundedAnswer> {
        self.result.as_ref()
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn credential_selected(&self) -> bool {
        self.credential_selected
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Leaves the panel's key prompt if the provider holds a credential.
    pub async fn select_credential(&mut self) -> bool {
        if self.credentials.has_credential().await {
            self.credential_selected = true;
            self.error = None;
        }
        self.credential_selected
    }

    pub async fn submit(&mut self) -> ActionOutcome {
        if self.loading.active || !self.credential_selected || self.query.trim().is_empty() {
            return ActionOutcome::Rejected;
        }

        self.loading = LoadingState::busy(RESEARCH_STATUS);
        self.error = None;
        self.result = None;

        let result = match self.credentials.require().await {
            Ok(credential) => {
                self.service
                    .answer_with_grounding(&credential, self.query.trim())
                    .await
            }
            Err(e) => Err(e),
        };
        self.loading = LoadingState::idle();

        match result {
            Ok(answer) => {
                log::info!("Grounded answer with {} sources", answer.sources.len());
                self.result = Some(answer);
                ActionOutcome::Completed
            }
            Err(e) if e.is_credential_error() => {
                log::warn!("Research query failed on credential: {}", e);
                self.error = Some(RESEARCH_CREDENTIAL_MESSAGE.to_string());
                self.credential_selected = false;
                ActionOutcome::CredentialReset
            }
            Err(e) => {
                log::error!("Research query failed: {}", e);
                self.error = Some(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn rendered_sources(&self) -> Vec<RenderedSource> {
        self.result
            .as_ref()
            .map(GroundedAnswer::rendered_sources)
            .unwrap_or_default()
    }
}
