use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_bridge::domain::connection::ConnectionManager;
use tts_bridge::domain::message::MessageProcessor;
use tts_bridge::infrastructure::audio::AudioOutput;
use tts_bridge::infrastructure::clipboard::SystemClipboard;
use tts_bridge::infrastructure::config::{Config, LogFormat};
use tts_bridge::infrastructure::repositories::GradioTtsRepository;
use tts_bridge::infrastructure::websocket::TungsteniteConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        uri = %config.websocket_uri,
        tts_endpoint = %config.tts_space_url,
        in_process_playback = tts_bridge::infrastructure::audio::IN_PROCESS_PLAYBACK,
        "Starting TTS bridge"
    );

    if config.hf_token.is_none() {
        tracing::warn!("HF_TOKEN not set; calling the inference endpoint anonymously");
    }

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Inference endpoint
    let http_client = reqwest::Client::builder()
        .timeout(config.tts_request_timeout)
        .build()
        .context("failed to build HTTP client")?;
    let tts_repo = Arc::new(GradioTtsRepository::new(
        http_client,
        config.tts_space_url.clone(),
        config.tts_api_name.clone(),
        config.hf_token.clone(),
    ));

    // 2. Local side effects
    let clipboard = Arc::new(SystemClipboard::new());
    let audio = build_audio_output(&config);

    // 3. Services
    let processor = Arc::new(MessageProcessor::new(clipboard, tts_repo, audio.clone()));
    let connector = Arc::new(TungsteniteConnector::new(
        config.ping_interval,
        config.pong_timeout,
    ));
    let manager = ConnectionManager::new(
        config.connection_settings(),
        connector,
        processor,
        audio,
    );

    manager
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("Program interrupted by user");

    Ok(())
}

#[cfg(any(feature = "rodio", windows, target_os = "macos"))]
fn build_audio_output(_config: &Config) -> Arc<dyn AudioOutput> {
    tracing::info!("Using in-process audio output");
    Arc::new(tts_bridge::infrastructure::audio::RodioAudioOutput::new())
}

#[cfg(not(any(feature = "rodio", windows, target_os = "macos")))]
fn build_audio_output(config: &Config) -> Arc<dyn AudioOutput> {
    Arc::new(tts_bridge::infrastructure::audio::CommandAudioOutput::detect(
        config.audio_player.as_deref(),
    ))
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_bridge=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_bridge=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
