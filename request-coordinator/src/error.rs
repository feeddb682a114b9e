use thiserror::Error;

/// Terminal outcome of an execution that did not produce a value.
///
/// `Clone` because one outcome is handed to every caller attached to the same
/// in-flight execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request `{key}` failed after {attempts} attempt(s): {message}")]
    Failed {
        key: String,
        attempts: u32,
        message: String,
    },

    #[error("request `{key}` resolved to a different type than the caller expected")]
    TypeMismatch { key: String },

    #[error("request `{key}` was aborted before completing")]
    Aborted { key: String },
}

impl RequestError {
    pub fn key(&self) -> &str {
        match self {
            RequestError::Failed { key, .. }
            | RequestError::TypeMismatch { key }
            | RequestError::Aborted { key } => key,
        }
    }

    /// Human-readable message without the key prefix, for status lines.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Failed { message, .. } => message.clone(),
            RequestError::TypeMismatch { .. } => "unexpected response type".to_string(),
            RequestError::Aborted { .. } => "request aborted".to_string(),
        }
    }
}
