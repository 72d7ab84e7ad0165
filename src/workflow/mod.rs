pub mod ideation;
pub mod research;

pub use ideation::{IdeationAction, IdeationWorkflow};
pub use research::ResearchAssistant;

/// Result of a user action on a controller. Details (error text, new state)
/// are read back from the controller itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Refused locally; no request was sent.
    Rejected,
    /// The generation call failed; state is unchanged.
    Failed,
    /// The call failed on the credential; the gate must be shown again.
    CredentialReset,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed)
    }
}
