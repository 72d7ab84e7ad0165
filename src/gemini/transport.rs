use crate::{
    credentials::Credential,
    error::{IdeationError, Result},
    models::gemini::{ApiErrorBody, ApiErrorEnvelope},
};
use reqwest::{header::HeaderValue, Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP plumbing shared by the Gemini sub-clients.
#[derive(Clone)]
pub struct ApiTransport {
    client: Client,
    base_url: String,
}

impl ApiTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Relative paths are joined to the base URL; absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// The key is only attached to requests for the API's own origin, so
    /// absolute URLs taken from responses cannot leak it elsewhere.
    pub fn sends_key_to(&self, url: &str) -> bool {
        match (Url::parse(&self.base_url), Url::parse(url)) {
            (Ok(base), Ok(target)) => {
                base.scheme() == target.scheme()
                    && base.host_str() == target.host_str()
                    && base.port_or_known_default() == target.port_or_known_default()
            }
            _ => false,
        }
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        payload: &Value,
    ) -> Result<T> {
        let url = self.url_for(path);
        log::debug!("POST {}", url);
        let request = self.client.post(&url).json(payload);
        let response = self.authorized(request, &url, credential)?.send().await?;
        Self::read_json(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<T> {
        let url = self.url_for(path);
        log::debug!("GET {}", url);
        let response = self
            .authorized(self.client.get(&url), &url, credential)?
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn get_bytes(&self, credential: &Credential, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path);
        log::debug!("GET {} (binary)", url);
        let response = self
            .authorized(self.client.get(&url), &url, credential)?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        url: &str,
        credential: &Credential,
    ) -> Result<RequestBuilder> {
        if !self.sends_key_to(url) {
            log::warn!("Not sending the API key to foreign host: {}", url);
            return Ok(request);
        }
        let value = HeaderValue::from_str(credential.expose()).map_err(|_| {
            IdeationError::CredentialInvalid(
                "API key contains characters that are not allowed.".into(),
            )
        })?;
        Ok(request.header(API_KEY_HEADER, value))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!("Gemini API returned {}: {}", status, body);
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::debug!("Unparseable Gemini response: {}", body);
            IdeationError::ResponseError(format!("unexpected response shape: {}", e))
        })
    }
}

/// Maps a non-success HTTP response to an error, separating credential
/// failures from everything else.
pub fn api_error(status: u16, body: &str) -> IdeationError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => error_from_body(status, envelope.error),
        Err(_) => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                format!("Request failed with HTTP status {}", status)
            } else {
                trimmed.to_string()
            };
            classify(status, None, false, message)
        }
    }
}

/// Same mapping for an error embedded in a long-running operation.
pub fn error_from_body(status: u16, body: ApiErrorBody) -> IdeationError {
    let status = body.code.unwrap_or(status);
    let key_invalid = body
        .details
        .iter()
        .any(|d| d.get("reason").and_then(Value::as_str) == Some("API_KEY_INVALID"));
    let message = if body.message.trim().is_empty() {
        format!("Request failed with HTTP status {}", status)
    } else {
        body.message
    };
    classify(status, body.status.as_deref(), key_invalid, message)
}

fn classify(
    status: u16,
    status_name: Option<&str>,
    key_invalid: bool,
    message: String,
) -> IdeationError {
    let lower = message.to_lowercase();
    let credential_failure = status == 401
        || status_name == Some("UNAUTHENTICATED")
        || key_invalid
        || lower.contains("api key")
        || lower.contains("requested entity was not found");

    if credential_failure {
        IdeationError::CredentialInvalid(message)
    } else {
        IdeationError::ApiError { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn test_invalid_key_response() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        }"#;
        let err = api_error(400, body);
        assert_eq!(err.classify(), ErrorClass::Credential);
        assert_eq!(err.to_string(), "API key not valid. Please pass a valid API key.");
    }

    #[test]
    fn test_entity_not_found_is_credential_failure() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        assert!(api_error(404, body).is_credential_error());
    }

    #[test]
    fn test_unauthenticated_status() {
        let body = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#;
        assert!(api_error(401, body).is_credential_error());
    }

    #[test]
    fn test_quota_error_is_operation_failure() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        match api_error(429, body) {
            IdeationError::ApiError { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource has been exhausted (e.g. check quota).");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body() {
        match api_error(502, "  Bad Gateway  ") {
            IdeationError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            api_error(503, "").to_string(),
            "Request failed with HTTP status 503"
        );
    }

    #[test]
    fn test_url_for() {
        let transport = ApiTransport::new(Client::new(), "https://api.example/v1beta");
        assert_eq!(
            transport.url_for("models/x:predict"),
            "https://api.example/v1beta/models/x:predict"
        );
        assert_eq!(
            transport.url_for("https://files.example/v.mp4"),
            "https://files.example/v.mp4"
        );
    }

    #[test]
    fn test_key_only_sent_to_api_origin() {
        let transport = ApiTransport::new(Client::new(), "https://api.example/v1beta");
        assert!(transport.sends_key_to(&transport.url_for("files/abc:download?alt=media")));
        assert!(transport.sends_key_to("https://api.example/v1beta/files/abc"));
        assert!(!transport.sends_key_to("https://files.example/v.mp4"));
        assert!(!transport.sends_key_to("http://api.example/v1beta/files/abc"));
        assert!(!transport.sends_key_to("https://api.example:8443/files/abc"));
        assert!(!transport.sends_key_to("not a url"));
    }
}
