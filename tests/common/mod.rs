#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use visual_ideation::credentials::MemoryCredentialStore;
use visual_ideation::{
    Credential, CredentialProvider, GenerationService, GroundedAnswer, IdeationError,
    ImageArtifact, Result, VideoEvent, VideoJob, VideoRequest,
};

/// Service double: every call pops the next scripted response for its
/// operation and records what it was asked.
#[derive(Default)]
pub struct ScriptedService {
    images: Mutex<VecDeque<Result<ImageArtifact>>>,
    edits: Mutex<VecDeque<Result<ImageArtifact>>>,
    videos: Mutex<VecDeque<Result<Vec<Result<VideoEvent>>>>>,
    answers: Mutex<VecDeque<Result<GroundedAnswer>>>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub edit_bases: Mutex<Vec<ImageArtifact>>,
    pub video_requests: Mutex<Vec<VideoRequest>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_image(&self, result: Result<ImageArtifact>) {
        self.images.lock().unwrap().push_back(result);
    }

    pub fn push_edit(&self, result: Result<ImageArtifact>) {
        self.edits.lock().unwrap().push_back(result);
    }

    pub fn push_video(&self, result: Result<Vec<Result<VideoEvent>>>) {
        self.videos.lock().unwrap().push_back(result);
    }

    pub fn push_answer(&self, result: Result<GroundedAnswer>) {
        self.answers.lock().unwrap().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, prompt: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
    }
}

fn unscripted<T>() -> Result<T> {
    Err(IdeationError::ResponseError("no scripted response".into()))
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn synthesize_image(&self, _credential: &Credential, prompt: &str) -> Result<ImageArtifact> {
        self.record(prompt);
        self.images.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn edit_image(
        &self,
        _credential: &Credential,
        instruction: &str,
        base: &ImageArtifact,
    ) -> Result<ImageArtifact> {
        self.record(instruction);
        self.edit_bases.lock().unwrap().push(base.clone());
        self.edits.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn synthesize_video(&self, _credential: &Credential, request: VideoRequest) -> Result<VideoJob> {
        self.record(&request.prompt);
        self.video_requests.lock().unwrap().push(request);
        let events = self.videos.lock().unwrap().pop_front().unwrap_or_else(unscripted)?;
        Ok(VideoJob::from_events(events))
    }

    async fn answer_with_grounding(&self, _credential: &Credential, query: &str) -> Result<GroundedAnswer> {
        self.record(query);
        self.answers.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }
}

pub async fn provider_with_key() -> CredentialProvider {
    let key = Credential::parse("test-key").unwrap();
    CredentialProvider::new(Arc::new(MemoryCredentialStore::with_credential(key)))
}

pub fn image(tag: &str) -> ImageArtifact {
    ImageArtifact::from_bytes(tag.as_bytes(), "image/png")
}

pub fn invalid_key() -> IdeationError {
    IdeationError::CredentialInvalid("API key not valid. Please pass a valid API key.".into())
}
