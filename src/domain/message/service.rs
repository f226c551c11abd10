use super::error::MessageProcessorError;
use super::InboundMessage;
use crate::domain::tts::SynthesisRequest;
use crate::infrastructure::audio::AudioOutput;
use crate::infrastructure::clipboard::ClipboardSink;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// What happened to a message that was processed without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Synthesized audio was played to completion
    Played { audio_size_bytes: usize },
    /// The endpoint answered without usable audio
    EmptyAudio { audio_size_bytes: usize },
}

pub struct MessageProcessor {
    clipboard: Arc<dyn ClipboardSink>,
    tts_repo: Arc<dyn TtsRepository>,
    audio: Arc<dyn AudioOutput>,
}

impl MessageProcessor {
    pub fn new(
        clipboard: Arc<dyn ClipboardSink>,
        tts_repo: Arc<dyn TtsRepository>,
        audio: Arc<dyn AudioOutput>,
    ) -> Self {
        Self {
            clipboard,
            tts_repo,
            audio,
        }
    }
}

#[async_trait]
pub trait MessageProcessorApi: Send + Sync {
    /// Act on one raw frame from the event feed
    ///
    /// This operation:
    /// - Parses the JSON envelope and extracts `Payload`
    /// - Copies the payload to the clipboard
    /// - Synthesizes it with the fixed voice settings
    /// - Plays the audio when the result is usable
    async fn process(&self, raw: &str) -> Result<ProcessOutcome, MessageProcessorError>;

    /// Process a frame and log the result; never fails so the receive loop keeps going
    async fn handle(&self, raw: &str) {
        match self.process(raw).await {
            Ok(ProcessOutcome::Played { audio_size_bytes }) => {
                tracing::debug!(audio_size_bytes, "Message processed");
            }
            Ok(ProcessOutcome::EmptyAudio { audio_size_bytes }) => {
                tracing::warn!(audio_size_bytes, "TTS result is empty or malformed");
            }
            Err(MessageProcessorError::MissingPayload) => {
                tracing::warn!("Received message without 'Payload'");
            }
            Err(MessageProcessorError::InvalidJson(e)) => {
                tracing::error!(error = %e, "Error decoding JSON message");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error processing message");
            }
        }
    }
}

#[async_trait]
impl MessageProcessorApi for MessageProcessor {
    async fn process(&self, raw: &str) -> Result<ProcessOutcome, MessageProcessorError> {
        // 1. Parse envelope
        let message = InboundMessage::parse(raw)?;

        // 2. Extract text
        let text = message.payload_text()?;

        // 3. Clipboard
        self.clipboard
            .copy_text(text)
            .map_err(MessageProcessorError::clipboard)?;

        // 4. Synthesize
        let request = SynthesisRequest::new(text);
        let audio = self
            .tts_repo
            .synthesize(&request)
            .await
            .map_err(MessageProcessorError::synthesis)?;

        // 5. Play only usable results
        let audio_size_bytes = audio.len();
        if !audio.is_playable() {
            return Ok(ProcessOutcome::EmptyAudio { audio_size_bytes });
        }

        self.audio
            .play(audio)
            .await
            .map_err(MessageProcessorError::playback)?;

        tracing::info!(
            text_length = request.text.chars().count(),
            audio_size_bytes,
            "Payload spoken"
        );

        Ok(ProcessOutcome::Played { audio_size_bytes })
    }
}
