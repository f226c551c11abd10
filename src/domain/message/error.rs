use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MessageProcessorError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("message is not a JSON object")]
    NotAnObject,
    #[error("message has no 'Payload'")]
    MissingPayload,
    #[error("'Payload' must be a string, got {0}")]
    InvalidPayload(&'static str),
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("synthesis error: {0}")]
    Synthesis(String),
    #[error("playback error: {0}")]
    Playback(String),
}

impl MessageProcessorError {
    pub(crate) fn clipboard(err: AppError) -> Self {
        MessageProcessorError::Clipboard(err.to_string())
    }

    pub(crate) fn synthesis(err: AppError) -> Self {
        MessageProcessorError::Synthesis(err.to_string())
    }

    pub(crate) fn playback(err: AppError) -> Self {
        MessageProcessorError::Playback(err.to_string())
    }
}
