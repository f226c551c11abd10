use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::state::ConnectionState;
use crate::domain::message::MessageProcessorApi;
use crate::infrastructure::audio::{AlertTone, AudioOutput};
use crate::infrastructure::websocket::WebSocketConnector;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub uri: String,
    /// Pause before each reconnect attempt; zero retries immediately
    pub reconnect_delay: Duration,
    pub alert_tone: AlertTone,
}

/// Keeps one logical WebSocket connection alive and feeds its messages to the processor
///
/// Messages are processed inline: the next receive starts only after the
/// previous message was spoken, which keeps playback in arrival order.
pub struct ConnectionManager {
    settings: ConnectionSettings,
    connector: Arc<dyn WebSocketConnector>,
    processor: Arc<dyn MessageProcessorApi>,
    audio: Arc<dyn AudioOutput>,
}

impl ConnectionManager {
    pub fn new(
        settings: ConnectionSettings,
        connector: Arc<dyn WebSocketConnector>,
        processor: Arc<dyn MessageProcessorApi>,
        audio: Arc<dyn AudioOutput>,
    ) -> Self {
        Self {
            settings,
            connector,
            processor,
            audio,
        }
    }

    /// Run the connection loop until `shutdown` resolves
    ///
    /// The in-flight state is dropped as is; a message being spoken is not
    /// finished first.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!(uri = %self.settings.uri, "Stopping WebSocket client");
            }
            _ = self.run() => {}
        }
    }

    /// Drive the state machine forever
    pub async fn run(&self) {
        let mut state = ConnectionState::initial();
        loop {
            state = self.step(state).await;
            tracing::trace!(phase = %state.phase(), "Connection state changed");
        }
    }

    /// Perform one transition of the state machine
    pub async fn step(&self, state: ConnectionState) -> ConnectionState {
        match state {
            ConnectionState::Disconnected { reconnecting } => {
                if reconnecting {
                    tracing::info!("Reconnecting...");
                    if !self.settings.reconnect_delay.is_zero() {
                        tokio::time::sleep(self.settings.reconnect_delay).await;
                    }
                }

                match self.connector.connect(&self.settings.uri).await {
                    Ok(stream) => ConnectionState::Connected(stream),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            uri = %self.settings.uri,
                            "WebSocket connection failed"
                        );
                        ConnectionState::Disconnected { reconnecting: true }
                    }
                }
            }
            ConnectionState::Connected(stream) => {
                tracing::info!(uri = %self.settings.uri, "Connected to WebSocket server");
                ConnectionState::Receiving(stream)
            }
            ConnectionState::Receiving(mut stream) => match stream.next_message().await {
                Ok(message) => {
                    tracing::info!(raw = %message, "Received message");
                    self.processor.handle(&message).await;
                    ConnectionState::Receiving(stream)
                }
                Err(e) if e.is_abnormal_close() => {
                    tracing::warn!(
                        error = %e,
                        "WebSocket connection closed while receiving message"
                    );
                    self.alert().await;
                    ConnectionState::Disconnected { reconnecting: true }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error receiving message");
                    ConnectionState::Disconnected { reconnecting: true }
                }
            },
        }
    }

    async fn alert(&self) {
        if let Err(e) = self.audio.beep(self.settings.alert_tone).await {
            tracing::warn!(error = %e, "Failed to play disconnect alert");
        }
    }
}
