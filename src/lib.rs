//! Image ideation on top of the Gemini API: generate an image from a prompt,
//! refine it with text edits, animate it into a short video, and ask
//! search-grounded research questions on the side.
//!
//! The controllers in [`workflow`] depend only on the [`GenerationService`]
//! trait and a [`CredentialProvider`], so both can be swapped in tests.

pub mod config;
pub mod credentials;
pub mod error;
pub mod files;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod service;
pub mod workflow;

pub use config::{AppConfig, CredentialStoreConfig, GeminiConfig};
pub use credentials::{Credential, CredentialGate, CredentialProvider, CredentialStore, GateStatus};
pub use error::{ErrorClass, IdeationError, Result};
pub use gemini::GeminiClient;
pub use models::{
    AspectRatio, GroundedAnswer, ImageArtifact, LoadingState, RenderedSource, SourceCitation,
    Stage, StageStatus, VideoEvent, VideoReference, VideoRequest,
};
pub use service::{GenerationService, VideoJob};
pub use workflow::{ActionOutcome, IdeationAction, IdeationWorkflow, ResearchAssistant};
