use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VIDEO_POLL_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialBackend {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: Option<String>,
    pub image_model: Option<String>,
    pub edit_model: Option<String>,
    pub video_model: Option<String>,
    pub search_model: Option<String>,
    pub video_poll_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub backend: CredentialBackend,
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub credentials: CredentialStoreConfig,
    pub output_dir: Option<PathBuf>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            base_url: None,
            image_model: None,
            edit_model: None,
            video_model: None,
            search_model: None,
            video_poll_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        GeminiConfig {
            base_url: env::var("GEMINI_API_BASE_URL").ok(),
            image_model: env::var("GEMINI_IMAGE_MODEL").ok(),
            edit_model: env::var("GEMINI_EDIT_MODEL").ok(),
            video_model: env::var("GEMINI_VIDEO_MODEL").ok(),
            search_model: env::var("GEMINI_SEARCH_MODEL").ok(),
            video_poll_secs: env::var("GEMINI_VIDEO_POLL_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            request_timeout_secs: env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_models(
        mut self,
        image: impl Into<String>,
        edit: impl Into<String>,
        video: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        self.image_model = Some(image.into());
        self.edit_model = Some(edit.into());
        self.video_model = Some(video.into());
        self.search_model = Some(search.into());
        self
    }

    pub fn with_video_poll_secs(mut self, secs: u64) -> Self {
        self.video_poll_secs = Some(secs);
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn image_model(&self) -> &str {
        self.image_model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn edit_model(&self) -> &str {
        self.edit_model.as_deref().unwrap_or(DEFAULT_EDIT_MODEL)
    }

    pub fn video_model(&self) -> &str {
        self.video_model.as_deref().unwrap_or(DEFAULT_VIDEO_MODEL)
    }

    pub fn search_model(&self) -> &str {
        self.search_model.as_deref().unwrap_or(DEFAULT_SEARCH_MODEL)
    }

    /// Never below one second.
    pub fn video_poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.video_poll_secs
                .unwrap_or(DEFAULT_VIDEO_POLL_SECS)
                .max(1),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

impl Default for CredentialStoreConfig {
    fn default() -> Self {
        CredentialStoreConfig {
            backend: CredentialBackend::File,
            file_path: None,
        }
    }
}

impl CredentialStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let backend = match env::var("IDEATION_CREDENTIAL_STORE").ok().as_deref() {
            Some("memory") => CredentialBackend::Memory,
            _ => CredentialBackend::File,
        };
        let file_path = env::var("IDEATION_CREDENTIAL_FILE").ok().map(PathBuf::from);

        CredentialStoreConfig { backend, file_path }
    }

    pub fn memory() -> Self {
        CredentialStoreConfig {
            backend: CredentialBackend::Memory,
            file_path: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = CredentialBackend::File;
        self.file_path = Some(path.into());
        self
    }

    /// Configured file, or `$HOME/.config/visual-ideation/credentials.json`.
    pub fn resolved_file_path(&self) -> PathBuf {
        if let Some(path) = &self.file_path {
            return path.clone();
        }
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        home.join(".config")
            .join("visual-ideation")
            .join("credentials.json")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gemini: GeminiConfig::default(),
            credentials: CredentialStoreConfig::default(),
            output_dir: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        AppConfig {
            gemini: GeminiConfig::from_env(),
            credentials: CredentialStoreConfig::from_env(),
            output_dir: env::var("IDEATION_OUTPUT_DIR").ok().map(PathBuf::from),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_credentials(mut self, config: CredentialStoreConfig) -> Self {
        self.credentials = config;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
