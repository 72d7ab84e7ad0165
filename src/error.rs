use thiserror::Error;

/// How a failure should be handled by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The credential is missing, invalid or revoked. The gate must be shown again.
    Credential,
    /// Rejected locally before any network call.
    Validation,
    /// Any other failure of a generation call.
    Operation,
}

#[derive(Debug, Error)]
pub enum IdeationError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("No API key has been provided.")]
    CredentialMissing,

    #[error("{0}")]
    CredentialInvalid(String),

    /// Error payload returned by the generation API. Displayed verbatim.
    #[error("{message}")]
    ApiError { status: u16, message: String },

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    FileError(String),

    #[error("Credential storage error: {0}")]
    StorageError(String),
}

impl IdeationError {
    pub fn classify(&self) -> ErrorClass {
        match self {
            IdeationError::CredentialMissing | IdeationError::CredentialInvalid(_) => {
                ErrorClass::Credential
            }
            IdeationError::ValidationError(_) => ErrorClass::Validation,
            _ => ErrorClass::Operation,
        }
    }

    pub fn is_credential_error(&self) -> bool {
        self.classify() == ErrorClass::Credential
    }

    pub fn validation(message: impl Into<String>) -> Self {
        IdeationError::ValidationError(message.into())
    }
}

impl From<reqwest::Error> for IdeationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            IdeationError::RequestError(format!("request timed out: {}", e))
        } else {
            IdeationError::RequestError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for IdeationError {
    fn from(e: serde_json::Error) -> Self {
        IdeationError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for IdeationError {
    fn from(e: std::io::Error) -> Self {
        IdeationError::FileError(e.to_string())
    }
}

impl From<base64::DecodeError> for IdeationError {
    fn from(e: base64::DecodeError) -> Self {
        IdeationError::ResponseError(format!("invalid base64 payload: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, IdeationError>;
