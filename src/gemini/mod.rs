pub mod image_client;
pub mod search_client;
pub mod transport;
pub mod video_client;

use crate::{
    config::GeminiConfig,
    credentials::Credential,
    error::{IdeationError, Result},
    models::{GroundedAnswer, ImageArtifact, VideoReference, VideoRequest},
    service::{GenerationService, VideoJob},
};
use async_trait::async_trait;

pub use image_client::ImageClient;
pub use search_client::SearchClient;
pub use transport::ApiTransport;
pub use video_client::VideoClient;

/// Gemini API client. Holds no credential of its own: every call is made
/// with the credential passed in by the caller.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    video_client: VideoClient,
    search_client: SearchClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| IdeationError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        let transport = ApiTransport::new(http, config.base_url());

        Ok(Self {
            image_client: ImageClient::new(
                transport.clone(),
                config.image_model(),
                config.edit_model(),
            ),
            video_client: VideoClient::new(
                transport.clone(),
                config.video_model(),
                config.video_poll_interval(),
            ),
            search_client: SearchClient::new(transport, config.search_model()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn video(&self) -> &VideoClient {
        &self.video_client
    }

    pub fn search(&self) -> &SearchClient {
        &self.search_client
    }

    pub async fn fetch_video(
        &self,
        credential: &Credential,
        reference: &VideoReference,
    ) -> Result<Vec<u8>> {
        self.video_client.fetch(credential, reference).await
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn synthesize_image(&self, credential: &Credential, prompt: &str) -> Result<ImageArtifact> {
        self.image_client.generate(credential, prompt).await
    }

    async fn edit_image(
        &self,
        credential: &Credential,
        instruction: &str,
        base: &ImageArtifact,
    ) -> Result<ImageArtifact> {
        self.image_client.edit(credential, instruction, base).await
    }

    async fn synthesize_video(&self, credential: &Credential, request: VideoRequest) -> Result<VideoJob> {
        self.video_client.start(credential, request).await
    }

    async fn answer_with_grounding(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<GroundedAnswer> {
        self.search_client.answer(credential, query).await
    }
}
