mod common;

use common::{invalid_key, provider_with_key, ScriptedService};
use visual_ideation::workflow::research::RESEARCH_CREDENTIAL_MESSAGE;
use visual_ideation::{
    ActionOutcome, CredentialProvider, GroundedAnswer, IdeationError, ResearchAssistant,
    SourceCitation,
};

async fn selected_assistant(service: std::sync::Arc<ScriptedService>) -> (ResearchAssistant, CredentialProvider) {
    let provider = provider_with_key().await;
    let mut assistant = ResearchAssistant::new(service, provider.clone());
    assert!(assistant.select_credential().await);
    (assistant, provider)
}

#[tokio::test]
async fn test_empty_query_is_ignored() {
    let service = ScriptedService::new();
    let (mut assistant, _) = selected_assistant(service.clone()).await;

    assistant.set_query("  ");
    assert_eq!(assistant.submit().await, ActionOutcome::Rejected);
    assert!(assistant.error().is_none());
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_query_requires_selected_credential() {
    let service = ScriptedService::new();
    let mut assistant = ResearchAssistant::new(service.clone(), CredentialProvider::in_memory());

    assert!(!assistant.select_credential().await);
    assistant.set_query("latest trends in isometric illustration");
    assert_eq!(assistant.submit().await, ActionOutcome::Rejected);
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_answer_with_rendered_sources() {
    let service = ScriptedService::new();
    let (mut assistant, _) = selected_assistant(service.clone()).await;

    service.push_answer(Ok(GroundedAnswer {
        text: "Muted pastels and grain are popular this year.".into(),
        sources: vec![
            SourceCitation::new(Some("https://design.example/trends"), Some("Design Trends")),
            SourceCitation::new(None, Some("No link")),
            SourceCitation::new(Some("https://blog.example/grain"), Some("")),
        ],
    }));

    assistant.set_query("  illustration trends  ");
    assert_eq!(assistant.submit().await, ActionOutcome::Completed);
    assert_eq!(service.prompts.lock().unwrap()[0], "illustration trends");
    assert!(!assistant.loading().active);

    let sources = assistant.rendered_sources();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].label, "Design Trends");
    assert_eq!(sources[1].label, "https://blog.example/grain");
    assert_eq!(sources[1].uri, "https://blog.example/grain");
}

#[tokio::test]
async fn test_credential_error_unselects_without_clearing_store() {
    let service = ScriptedService::new();
    let (mut assistant, provider) = selected_assistant(service.clone()).await;

    service.push_answer(Err(invalid_key()));
    assistant.set_query("color palettes");
    assert_eq!(assistant.submit().await, ActionOutcome::CredentialReset);

    assert_eq!(assistant.error(), Some(RESEARCH_CREDENTIAL_MESSAGE));
    assert!(!assistant.credential_selected());
    assert!(assistant.result().is_none());
    assert!(provider.has_credential().await);

    assert!(assistant.select_credential().await);
    assert!(assistant.error().is_none());
}

#[tokio::test]
async fn test_operation_error_keeps_selection() {
    let service = ScriptedService::new();
    let (mut assistant, _) = selected_assistant(service.clone()).await;

    service.push_answer(Err(IdeationError::ApiError {
        status: 500,
        message: "Internal error encountered.".into(),
    }));
    assistant.set_query("color palettes");
    assert_eq!(assistant.submit().await, ActionOutcome::Failed);
    assert_eq!(assistant.error(), Some("Internal error encountered."));
    assert!(assistant.credential_selected());
}
