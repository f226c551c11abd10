use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{MessageStream, ReceiveError, WebSocketConnector};
use crate::error::{AppError, AppResult};

/// Upper bound on the opening handshake
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client built on tokio-tungstenite with ping/pong liveness
pub struct TungsteniteConnector {
    ping_interval: Duration,
    pong_timeout: Duration,
}

impl TungsteniteConnector {
    /// A zero `ping_interval` disables keep-alive pings
    pub fn new(ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            ping_interval,
            pong_timeout,
        }
    }
}

#[async_trait]
impl WebSocketConnector for TungsteniteConnector {
    async fn connect(&self, uri: &str) -> AppResult<Box<dyn MessageStream>> {
        let (ws, response) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(uri))
            .await
            .map_err(|_| {
                AppError::ExternalService(format!(
                    "connection attempt timed out after {:?}",
                    CONNECT_TIMEOUT
                ))
            })??;

        tracing::debug!(
            uri = %uri,
            status = %response.status(),
            "WebSocket handshake completed"
        );

        Ok(Box::new(TungsteniteStream::new(
            ws,
            self.ping_interval,
            self.pong_timeout,
        )))
    }
}

struct TungsteniteStream {
    ws: WsStream,
    ping: Option<Interval>,
    pong_timeout: Duration,
    pong_deadline: Option<Instant>,
}

impl TungsteniteStream {
    fn new(ws: WsStream, ping_interval: Duration, pong_timeout: Duration) -> Self {
        let ping = (!ping_interval.is_zero()).then(|| {
            let mut ping = interval_at(Instant::now() + ping_interval, ping_interval);
            ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ping
        });

        Self {
            ws,
            ping,
            pong_timeout,
            pong_deadline: None,
        }
    }

    /// Returns `None` for frames that do not end the wait
    fn on_frame(
        &mut self,
        frame: Option<Result<Message, WsError>>,
    ) -> Option<Result<String, ReceiveError>> {
        let message = match frame {
            None => {
                return Some(Err(ReceiveError::AbnormalClose(
                    "stream ended without a close frame".to_string(),
                )))
            }
            Some(Err(e)) => return Some(Err(classify_error(e))),
            Some(Ok(message)) => message,
        };

        // Any inbound frame shows the peer is alive
        self.pong_deadline = None;

        match message {
            Message::Text(text) => Some(Ok(text)),
            Message::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Some(Ok(text)),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping binary frame that is not UTF-8");
                    None
                }
            },
            // tungstenite answers pings on the next read
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
            Message::Close(frame) => Some(Err(classify_close(frame))),
        }
    }

    async fn send_ping(&mut self) -> Result<(), ReceiveError> {
        if self.pong_deadline.is_some() {
            return Ok(());
        }

        self.ws
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(classify_error)?;
        self.pong_deadline = Some(Instant::now() + self.pong_timeout);
        tracing::trace!("Keep-alive ping sent");

        Ok(())
    }
}

#[async_trait]
impl MessageStream for TungsteniteStream {
    async fn next_message(&mut self) -> Result<String, ReceiveError> {
        loop {
            let deadline = self.pong_deadline;

            // Buffered frames win over an expired deadline
            tokio::select! {
                biased;

                frame = self.ws.next() => {
                    if let Some(result) = self.on_frame(frame) {
                        return result;
                    }
                }
                _ = next_tick(&mut self.ping) => {
                    self.send_ping().await?;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    return Err(ReceiveError::AbnormalClose(format!(
                        "no pong received within {:?}",
                        self.pong_timeout
                    )));
                }
            }
        }
    }
}

async fn next_tick(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// A close handshake is clean only with a normal or going-away code
fn classify_close(frame: Option<CloseFrame<'_>>) -> ReceiveError {
    match frame {
        Some(frame) => {
            let code = u16::from(frame.code);
            let detail = if frame.reason.is_empty() {
                format!("code {}", code)
            } else {
                format!("code {} ({})", code, frame.reason)
            };

            match frame.code {
                CloseCode::Normal | CloseCode::Away => ReceiveError::NormalClose(detail),
                _ => ReceiveError::AbnormalClose(detail),
            }
        }
        None => ReceiveError::AbnormalClose("close frame without status code".to_string()),
    }
}

fn classify_error(error: WsError) -> ReceiveError {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            ReceiveError::NormalClose(error.to_string())
        }
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) | WsError::Io(_) => {
            ReceiveError::AbnormalClose(error.to_string())
        }
        other => ReceiveError::Other(other.to_string()),
    }
}
