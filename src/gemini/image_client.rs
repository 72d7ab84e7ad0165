use crate::{
    credentials::Credential,
    error::{IdeationError, Result},
    gemini::transport::ApiTransport,
    models::{
        gemini::{GenerateContentResponse, ImagenPredictResponse},
        ImageArtifact,
    },
};
use serde_json::json;

#[derive(Clone)]
pub struct ImageClient {
    transport: ApiTransport,
    image_model: String,
    edit_model: String,
}

impl ImageClient {
    pub fn new(
        transport: ApiTransport,
        image_model: impl Into<String>,
        edit_model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            image_model: image_model.into(),
            edit_model: edit_model.into(),
        }
    }

    pub async fn generate(&self, credential: &Credential, prompt: &str) -> Result<ImageArtifact> {
        let payload = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "outputMimeType": "image/png",
                "aspectRatio": "1:1"
            }
        });

        log::info!("Generating image with model: {}", self.image_model);

        let response: ImagenPredictResponse = self
            .transport
            .post_json(
                credential,
                &format!("models/{}:predict", self.image_model),
                &payload,
            )
            .await?;

        image_from_predictions(response)
    }

    pub async fn edit(
        &self,
        credential: &Credential,
        instruction: &str,
        base: &ImageArtifact,
    ) -> Result<ImageArtifact> {
        let payload = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": base.mime_type, "data": base.base64 } },
                    { "text": instruction }
                ]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"]
            }
        });

        log::info!(
            "Editing {} image with model: {}",
            base.mime_type,
            self.edit_model
        );

        let response: GenerateContentResponse = self
            .transport
            .post_json(
                credential,
                &format!("models/{}:generateContent", self.edit_model),
                &payload,
            )
            .await?;

        image_from_content(response)
    }
}

pub fn image_from_predictions(response: ImagenPredictResponse) -> Result<ImageArtifact> {
    let mut filtered_reason = None;

    for prediction in response.predictions {
        if let Some(data) = prediction.bytes_base64_encoded.filter(|d| !d.is_empty()) {
            let mime_type = prediction
                .mime_type
                .unwrap_or_else(|| "image/png".to_string());
            return Ok(ImageArtifact::new(data, mime_type));
        }
        if filtered_reason.is_none() {
            filtered_reason = prediction.rai_filtered_reason;
        }
    }

    match filtered_reason {
        Some(reason) => Err(IdeationError::ResponseError(format!(
            "The image was blocked: {}",
            reason
        ))),
        None => Err(IdeationError::ResponseError(
            "No image was generated.".into(),
        )),
    }
}

pub fn image_from_content(response: GenerateContentResponse) -> Result<ImageArtifact> {
    let mut text_reply = String::new();
    let mut finish_reason = None;

    for candidate in &response.candidates {
        if finish_reason.is_none() {
            finish_reason = candidate.finish_reason.clone();
        }
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                return Ok(ImageArtifact::new(inline.data.clone(), inline.mime_type.clone()));
            }
            if let Some(text) = &part.text {
                text_reply.push_str(text);
            }
        }
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(IdeationError::ResponseError(format!(
            "The edit was blocked: {}",
            reason
        )));
    }

    if text_reply.trim().is_empty() {
        Err(IdeationError::ResponseError(match finish_reason {
            Some(reason) if reason != "STOP" => {
                format!("No image was returned by the edit model ({}).", reason)
            }
            _ => "No image was returned by the edit model.".into(),
        }))
    } else {
        Err(IdeationError::ResponseError(format!(
            "The model did not return an image: {}",
            text_reply.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_parsing() {
        let response: ImagenPredictResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"iVBORw0K","mimeType":"image/png"}]}"#,
        )
        .unwrap();
        let image = image_from_predictions(response).unwrap();
        assert_eq!(image.base64, "iVBORw0K");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_filtered_prediction() {
        let response: ImagenPredictResponse = serde_json::from_str(
            r#"{"predictions":[{"raiFilteredReason":"unsafe content"}]}"#,
        )
        .unwrap();
        let err = image_from_predictions(response).unwrap_err();
        assert!(err.to_string().contains("unsafe content"));

        let empty: ImagenPredictResponse = serde_json::from_str("{}").unwrap();
        assert!(image_from_predictions(empty).is_err());
    }

    #[test]
    fn test_content_picks_first_inline_image() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your edit."},
                {"inlineData":{"mimeType":"image/jpeg","data":"/9j/4AAQ"}},
                {"inlineData":{"mimeType":"image/png","data":"second"}}
            ]}}]}"#,
        )
        .unwrap();
        let image = image_from_content(response).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.base64, "/9j/4AAQ");
    }

    #[test]
    fn test_content_text_only_reply() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"I cannot do that."}]}}]}"#,
        )
        .unwrap();
        let err = image_from_content(response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response error: The model did not return an image: I cannot do that."
        );
    }

    #[test]
    fn test_empty_candidate_reports_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"finishReason":"IMAGE_SAFETY"}]}"#,
        )
        .unwrap();
        assert_eq!(
            image_from_content(response).unwrap_err().to_string(),
            "Response error: No image was returned by the edit model (IMAGE_SAFETY)."
        );

        let stopped: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"STOP"}]}"#).unwrap();
        assert_eq!(
            image_from_content(stopped).unwrap_err().to_string(),
            "Response error: No image was returned by the edit model."
        );
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(image_from_content(response)
            .unwrap_err()
            .to_string()
            .contains("SAFETY"));
    }
}
