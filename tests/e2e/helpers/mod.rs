use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tts_bridge::domain::connection::{ConnectionManager, ConnectionSettings};
use tts_bridge::domain::message::MessageProcessor;
use tts_bridge::infrastructure::audio::AlertTone;
use tts_bridge::infrastructure::websocket::{TungsteniteConnector, WebSocketConnector};


use fakes::{mock_audio_bytes, RecordingAudioOutput, RecordingClipboard, ScriptedTtsRepository};
use ws_server::TestWsServer;

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reconnects in tests are spaced out a little so a dead server is not hammered
pub const TEST_RECONNECT_DELAY: Duration = Duration::from_millis(10);

/// A running client wired to a local event feed and recording fakes
pub struct TestContext {
    pub server: TestWsServer,
    pub clipboard: Arc<RecordingClipboard>,
    pub tts: Arc<ScriptedTtsRepository>,
    pub audio: Arc<RecordingAudioOutput>,
    shutdown: Option<oneshot::Sender<()>>,
    client: Option<JoinHandle<()>>,
}

impl TestContext {
    /// Start a server and a client with the given keep-alive settings
    pub async fn start(ping_interval: Duration, pong_timeout: Duration) -> Self {
        let server = TestWsServer::start().await;
        let connector = Arc::new(TungsteniteConnector::new(ping_interval, pong_timeout));
        Self::start_with(server, connector).await
    }

    pub async fn start_with(server: TestWsServer, connector: Arc<dyn WebSocketConnector>) -> Self {
        let clipboard = Arc::new(RecordingClipboard::default());
        let tts = Arc::new(ScriptedTtsRepository::returning(mock_audio_bytes()));
        let audio = Arc::new(RecordingAudioOutput::default());

        let processor = Arc::new(MessageProcessor::new(
            clipboard.clone(),
            tts.clone(),
            audio.clone(),
        ));
        let settings = ConnectionSettings {
            uri: server.uri.clone(),
            reconnect_delay: TEST_RECONNECT_DELAY,
            alert_tone: AlertTone::default(),
        };
        let manager = ConnectionManager::new(settings, connector, processor, audio.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let client = tokio::spawn(async move {
            manager
                .run_until(async {
                    let _ = rx.await;
                })
                .await;
        });

        Self {
            server,
            clipboard,
            tts,
            audio,
            shutdown: Some(tx),
            client: Some(client),
        }
    }

    /// Stop the client and wait for its loop to exit
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(client) = self.client.take() {
            tokio::time::timeout(WAIT_TIMEOUT, client)
                .await
                .expect("Client did not stop in time")
                .expect("Client task panicked");
        }
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            // Pings stay out of the way; keep-alive has its own test
            Self::start(Duration::from_secs(60), Duration::from_secs(5)).await
        }
    }

    fn teardown(mut self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.stop().await;
        }
    }
}

/// Poll `condition` until it holds, failing the test after a few seconds
pub async fn wait_until<F>(description: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let started = tokio::time::Instant::now();
    while !condition() {
        if started.elapsed() > WAIT_TIMEOUT {
            panic!("Timed out waiting for {}", description);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

// Helper to build a feed message
pub fn payload_message(text: &str) -> String {
    serde_json::json!({ "Payload": text }).to_string()
}
