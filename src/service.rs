use crate::{
    credentials::Credential,
    error::{IdeationError, Result},
    models::{GroundedAnswer, ImageArtifact, VideoEvent, VideoReference, VideoRequest},
};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// The four generation operations the controllers depend on.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn synthesize_image(&self, credential: &Credential, prompt: &str)
        -> Result<ImageArtifact>;

    async fn edit_image(
        &self,
        credential: &Credential,
        instruction: &str,
        base: &ImageArtifact,
    ) -> Result<ImageArtifact>;

    /// Starts a long-running video synthesis. Progress and the final reference
    /// arrive on the returned job.
    async fn synthesize_video(&self, credential: &Credential, request: VideoRequest)
        -> Result<VideoJob>;

    async fn answer_with_grounding(&self, credential: &Credential, query: &str)
        -> Result<GroundedAnswer>;
}

/// Stream of progress events for one video synthesis: zero or more
/// `Progress` items followed by a single `Completed`, or an error.
/// Dropping the job stops whatever is producing its events.
pub struct VideoJob {
    id: String,
    events: Pin<Box<dyn Stream<Item = Result<VideoEvent>> + Send>>,
}

impl VideoJob {
    pub fn new(
        id: impl Into<String>,
        events: impl Stream<Item = Result<VideoEvent>> + Send + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            events: Box::pin(events),
        }
    }

    /// A job replaying a fixed list of events.
    pub fn from_events(events: Vec<Result<VideoEvent>>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), futures::stream::iter(events))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn next_event(&mut self) -> Option<Result<VideoEvent>> {
        self.events.next().await
    }

    /// Drives the job to completion, handing every status message to `on_progress`.
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<VideoReference>
    where
        F: FnMut(&str),
    {
        while let Some(event) = self.next_event().await {
            match event? {
                VideoEvent::Progress(message) => on_progress(&message),
                VideoEvent::Completed(reference) => return Ok(reference),
            }
        }
        Err(IdeationError::ResponseError(
            "video generation ended without producing a video".into(),
        ))
    }
}

impl Stream for VideoJob {
    type Item = Result<VideoEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}
