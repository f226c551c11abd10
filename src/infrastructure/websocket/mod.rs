pub mod tungstenite_connector;

pub use tungstenite_connector::TungsteniteConnector;

use async_trait::async_trait;

use crate::error::AppResult;

/// Why a receive on an open connection failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiveError {
    /// The connection went away without a clean closing handshake
    #[error("connection closed abnormally: {0}")]
    AbnormalClose(String),
    /// The server closed with a normal (1000) or going-away (1001) code
    #[error("connection closed by server: {0}")]
    NormalClose(String),
    #[error("receive failed: {0}")]
    Other(String),
}

impl ReceiveError {
    /// Abnormal closes are the only failures announced with the alert tone
    pub fn is_abnormal_close(&self) -> bool {
        matches!(self, ReceiveError::AbnormalClose(_))
    }
}

/// Opens WebSocket connections
#[async_trait]
pub trait WebSocketConnector: Send + Sync {
    async fn connect(&self, uri: &str) -> AppResult<Box<dyn MessageStream>>;
}

/// An open connection that yields text messages
#[async_trait]
pub trait MessageStream: Send {
    /// Wait for the next text message
    ///
    /// Control frames and keep-alive traffic are handled internally; only
    /// message text or a terminal error is returned.
    async fn next_message(&mut self) -> Result<String, ReceiveError>;
}
