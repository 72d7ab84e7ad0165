use crate::{
    credentials::CredentialProvider,
    error::{ErrorClass, IdeationError, Result},
    files,
    models::{
        AspectRatio, ImageArtifact, LoadingState, Stage, StageStatus, VideoReference,
        VideoRequest,
    },
    service::GenerationService,
    workflow::ActionOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CREDENTIAL_RESET_MESSAGE: &str =
    "API Key not valid. Please enter a valid API key to continue.";
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt.";
pub const EMPTY_EDIT_MESSAGE: &str = "Please enter an edit instruction.";
pub const EMPTY_VIDEO_PROMPT_MESSAGE: &str = "Please enter a prompt for the video.";
pub const NO_IMAGE_MESSAGE: &str = "There is no current image to work with.";
pub const NO_FILE_MESSAGE: &str = "Please choose an image file to upload.";

const GENERATING_STATUS: &str = "Generating initial concept...";
const UPLOADING_STATUS: &str = "Uploading image...";
const EDITING_STATUS: &str = "Applying edits...";
const VIDEO_PREPARING_STATUS: &str = "Preparing video generation...";

/// Controls offered to the user, depending on the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeationAction {
    Generate,
    Upload,
    Edit,
    AdvanceToVideo,
    SetAspectRatio,
    GenerateVideo,
    BackToEdit,
    DownloadImage,
    SaveVideo,
    Reset,
}

/// The GENERATE -> EDIT -> VIDEO state machine.
///
/// Every action takes `&mut self`, so one instance never has two requests in
/// flight. Failures are recorded in [`error`](Self::error) and never touch the
/// stage or the current image.
pub struct IdeationWorkflow {
    service: Arc<dyn GenerationService>,
    credentials: CredentialProvider,
    stage: Stage,
    current_image: Option<ImageArtifact>,
    prompt: String,
    video: Option<VideoReference>,
    aspect_ratio: AspectRatio,
    loading: LoadingState,
    error: Option<String>,
    gate_required: bool,
}

impl IdeationWorkflow {
    pub fn new(service: Arc<dyn GenerationService>, credentials: CredentialProvider) -> Self {
        Self {
            service,
            credentials,
            stage: Stage::Generate,
            current_image: None,
            prompt: String::new(),
            video: None,
            aspect_ratio: AspectRatio::default(),
            loading: LoadingState::idle(),
            error: None,
            gate_required: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn current_image(&self) -> Option<&ImageArtifact> {
        self.current_image.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn video(&self) -> Option<&VideoReference> {
        self.video.as_ref()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True after a credential failure, until [`credential_restored`](Self::credential_restored).
    pub fn gate_required(&self) -> bool {
        self.gate_required
    }

    pub fn can_reset(&self) -> bool {
        self.video.is_some()
    }

    pub fn stage_indicator(&self) -> Vec<(Stage, StageStatus)> {
        Stage::all()
            .into_iter()
            .map(|s| (s, s.status_relative_to(self.stage)))
            .collect()
    }

    pub fn available_actions(&self) -> Vec<IdeationAction> {
        if self.loading.active {
            return Vec::new();
        }

        let mut actions = match self.stage {
            Stage::Generate => vec![IdeationAction::Generate, IdeationAction::Upload],
            Stage::Edit => vec![IdeationAction::Edit, IdeationAction::AdvanceToVideo],
            Stage::Video => vec![
                IdeationAction::SetAspectRatio,
                IdeationAction::GenerateVideo,
                IdeationAction::BackToEdit,
            ],
        };
        if self.current_image.is_some() {
            actions.push(IdeationAction::DownloadImage);
        }
        if self.video.is_some() {
            actions.push(IdeationAction::SaveVideo);
        }
        if self.can_reset() {
            actions.push(IdeationAction::Reset);
        }
        actions
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Called once the gate has a fresh credential. Workflow state is kept
    /// across the credential reset.
    pub fn credential_restored(&mut self) {
        self.gate_required = false;
        self.error = None;
    }

    pub async fn generate(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard(Stage::Generate) {
            return outcome;
        }
        if self.prompt.trim().is_empty() {
            return self.reject(EMPTY_PROMPT_MESSAGE);
        }

        self.begin(GENERATING_STATUS);
        let result = match self.credentials.require().await {
            Ok(credential) => {
                self.service
                    .synthesize_image(&credential, self.prompt.trim())
                    .await
            }
            Err(e) => Err(e),
        };
        self.loading = LoadingState::idle();

        match result {
            Ok(image) => {
                log::info!("Initial concept ready ({})", image.mime_type);
                self.current_image = Some(image);
                self.stage = Stage::Edit;
                self.prompt.clear();
                ActionOutcome::Completed
            }
            Err(e) => self.handle_error(e).await,
        }
    }

    /// Uses a local image file as the starting point instead of generating one.
    pub async fn upload_image(&mut self, path: impl AsRef<Path>) -> ActionOutcome {
        if let Some(outcome) = self.guard(Stage::Generate) {
            return outcome;
        }
        if path.as_ref().as_os_str().is_empty() {
            return self.reject(NO_FILE_MESSAGE);
        }

        self.begin(UPLOADING_STATUS);
        let result = files::read_image_file(path).await;
        self.loading = LoadingState::idle();

        match result {
            Ok(image) => {
                self.current_image = Some(image);
                self.stage = Stage::Edit;
                ActionOutcome::Completed
            }
            Err(e) => self.handle_error(e).await,
        }
    }

    pub async fn edit(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard(Stage::Edit) {
            return outcome;
        }
        if self.prompt.trim().is_empty() {
            return self.reject(EMPTY_EDIT_MESSAGE);
        }
        let Some(base) = self.current_image.clone() else {
            return self.reject(NO_IMAGE_MESSAGE);
        };

        self.begin(EDITING_STATUS);
        let result = match self.credentials.require().await {
            Ok(credential) => {
                self.service
                    .edit_image(&credential, self.prompt.trim(), &base)
                    .await
            }
            Err(e) => Err(e),
        };
        self.loading = LoadingState::idle();

        match result {
            Ok(image) => {
                self.current_image = Some(image);
                self.prompt.clear();
                ActionOutcome::Completed
            }
            Err(e) => self.handle_error(e).await,
        }
    }

    pub fn advance_to_video(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard(Stage::Edit) {
            return outcome;
        }
        if self.current_image.is_none() {
            return self.reject(NO_IMAGE_MESSAGE);
        }
        self.transition(Stage::Video)
    }

    pub fn back_to_edit(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard(Stage::Video) {
            return outcome;
        }
        self.transition(Stage::Edit)
    }

    /// Animates the current image. `on_progress` sees the loading state after
    /// every status update from the service.
    pub async fn generate_video<F>(&mut self, motion_prompt: &str, mut on_progress: F) -> ActionOutcome
    where
        F: FnMut(&LoadingState),
    {
        if let Some(outcome) = self.guard(Stage::Video) {
            return outcome;
        }
        if motion_prompt.trim().is_empty() {
            return self.reject(EMPTY_VIDEO_PROMPT_MESSAGE);
        }
        let Some(image) = self.current_image.clone() else {
            return self.reject(NO_IMAGE_MESSAGE);
        };

        self.begin(VIDEO_PREPARING_STATUS);
        self.video = None;
        on_progress(&self.loading);

        let request = VideoRequest {
            prompt: motion_prompt.trim().to_string(),
            image,
            aspect_ratio: self.aspect_ratio,
        };

        let result = match self.credentials.require().await {
            Ok(credential) => match self.service.synthesize_video(&credential, request).await {
                Ok(job) => {
                    log::info!("Waiting on video job {}", job.id());
                    let loading = &mut self.loading;
                    job.wait(|message| {
                        loading.message = message.to_string();
                        on_progress(&*loading);
                    })
                    .await
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.loading = LoadingState::idle();

        match result {
            Ok(reference) => {
                log::info!("Video ready at {}", reference.uri);
                self.video = Some(reference);
                ActionOutcome::Completed
            }
            Err(e) => self.handle_error(e).await,
        }
    }

    /// Back to GENERATE with image, video, prompt and error discarded.
    pub fn reset(&mut self) {
        self.stage = Stage::Generate;
        self.current_image = None;
        self.prompt.clear();
        self.video = None;
        self.error = None;
        self.loading = LoadingState::idle();
    }

    pub async fn download_image(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let image = self
            .current_image
            .as_ref()
            .ok_or_else(|| IdeationError::validation(NO_IMAGE_MESSAGE))?;
        files::save_image(image, dir).await
    }

    fn guard(&mut self, expected: Stage) -> Option<ActionOutcome> {
        if self.loading.active {
            return Some(ActionOutcome::Rejected);
        }
        if self.stage != expected {
            return Some(self.reject(&format!(
                "This action is only available in the {} stage.",
                expected
            )));
        }
        None
    }

    fn transition(&mut self, next: Stage) -> ActionOutcome {
        if !self.stage.can_transition_to(next) {
            return self.reject(&format!("Cannot move from {} to {}.", self.stage, next));
        }
        log::debug!("Stage {} -> {}", self.stage, next);
        self.stage = next;
        self.error = None;
        ActionOutcome::Completed
    }

    fn begin(&mut self, status: &str) {
        self.error = None;
        self.loading = LoadingState::busy(status);
    }

    fn reject(&mut self, message: &str) -> ActionOutcome {
        self.error = Some(message.to_string());
        ActionOutcome::Rejected
    }

    async fn handle_error(&mut self, err: IdeationError) -> ActionOutcome {
        log::error!("Ideation step failed: {}", err);
        match err.classify() {
            ErrorClass::Credential => {
                if let Err(e) = self.credentials.clear().await {
                    log::warn!("Could not clear stored API key: {}", e);
                }
                self.error = Some(CREDENTIAL_RESET_MESSAGE.to_string());
                self.gate_required = true;
                ActionOutcome::CredentialReset
            }
            ErrorClass::Validation => {
                self.error = Some(err.to_string());
                ActionOutcome::Rejected
            }
            ErrorClass::Operation => {
                self.error = Some(err.to_string());
                ActionOutcome::Failed
            }
        }
    }
}
