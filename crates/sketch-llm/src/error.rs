use thiserror::Error;

/// Shown when a failure carries no usable message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate diagram. Please try again later.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    RemoteService(String),
}

impl GenerationError {
    /// Remote failure with `message`, or the generic text when it is blank.
    pub fn remote(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::RemoteService(GENERIC_FAILURE_MESSAGE.to_string())
        } else {
            Self::RemoteService(message)
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        Self::remote(error.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(error: serde_json::Error) -> Self {
        Self::remote(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
