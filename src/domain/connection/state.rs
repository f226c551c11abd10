use std::fmt;

use crate::infrastructure::websocket::MessageStream;

/// Lifecycle of the single logical connection
pub enum ConnectionState {
    /// No socket; `reconnecting` is false only before the first attempt
    Disconnected { reconnecting: bool },
    /// Handshake completed, nothing received yet
    Connected(Box<dyn MessageStream>),
    /// Waiting on the socket for the next message
    Receiving(Box<dyn MessageStream>),
}

/// Stream-less view of [`ConnectionState`] for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    Connected,
    Receiving,
}

impl ConnectionState {
    pub fn initial() -> Self {
        ConnectionState::Disconnected {
            reconnecting: false,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        match self {
            ConnectionState::Disconnected { .. } => ConnectionPhase::Disconnected,
            ConnectionState::Connected(_) => ConnectionPhase::Connected,
            ConnectionState::Receiving(_) => ConnectionPhase::Receiving,
        }
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected { reconnecting } => f
                .debug_struct("Disconnected")
                .field("reconnecting", reconnecting)
                .finish(),
            ConnectionState::Connected(_) => f.write_str("Connected"),
            ConnectionState::Receiving(_) => f.write_str("Receiving"),
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPhase::Disconnected => "disconnected",
            ConnectionPhase::Connected => "connected",
            ConnectionPhase::Receiving => "receiving",
        };
        f.write_str(name)
    }
}
