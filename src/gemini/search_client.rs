use crate::{
    credentials::Credential,
    error::{IdeationError, Result},
    gemini::transport::ApiTransport,
    models::{gemini::GenerateContentResponse, GroundedAnswer, SourceCitation},
};
use serde_json::json;

#[derive(Clone)]
pub struct SearchClient {
    transport: ApiTransport,
    model: String,
}

impl SearchClient {
    pub fn new(transport: ApiTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub async fn answer(&self, credential: &Credential, query: &str) -> Result<GroundedAnswer> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": query }] }],
            "tools": [{ "google_search": {} }]
        });

        log::info!("Grounded query with model: {}", self.model);

        let response: GenerateContentResponse = self
            .transport
            .post_json(
                credential,
                &format!("models/{}:generateContent", self.model),
                &payload,
            )
            .await?;

        answer_from_content(response)
    }
}

pub fn answer_from_content(response: GenerateContentResponse) -> Result<GroundedAnswer> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();
        return Err(IdeationError::ResponseError(format!(
            "No answer was returned{}.",
            reason
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .map(|chunk| match chunk.web {
                    Some(web) => SourceCitation {
                        uri: web.uri,
                        title: web.title,
                    },
                    None => SourceCitation::default(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GroundedAnswer { text, sources })
}
