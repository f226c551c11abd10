use std::io::Cursor;

use async_trait::async_trait;
use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, Sink};

use super::{AlertTone, AudioOutput};
use crate::domain::tts::SynthesizedAudio;
use crate::error::{AppError, AppResult};

/// In-process playback on the default output device
///
/// The output stream is opened per call on a blocking thread; the handle is
/// not `Send` and must live on the thread that plays.
#[derive(Debug, Default)]
pub struct RodioAudioOutput;

impl RodioAudioOutput {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioOutput for RodioAudioOutput {
    async fn play(&self, audio: SynthesizedAudio) -> AppResult<()> {
        tokio::task::spawn_blocking(move || {
            let (_stream, handle) = OutputStream::try_default()
                .map_err(|e| AppError::Audio(format!("no output device: {}", e)))?;
            let sink = Sink::try_new(&handle)
                .map_err(|e| AppError::Audio(format!("failed to open sink: {}", e)))?;
            let source = Decoder::new(Cursor::new(audio.bytes))
                .map_err(|e| AppError::Audio(format!("failed to decode audio: {}", e)))?;

            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(format!("playback task failed: {}", e)))?
    }

    async fn beep(&self, tone: AlertTone) -> AppResult<()> {
        tokio::task::spawn_blocking(move || {
            let (_stream, handle) = OutputStream::try_default()
                .map_err(|e| AppError::Audio(format!("no output device: {}", e)))?;
            let sink = Sink::try_new(&handle)
                .map_err(|e| AppError::Audio(format!("failed to open sink: {}", e)))?;

            sink.append(
                SineWave::new(tone.frequency_hz as f32)
                    .take_duration(tone.duration)
                    .amplify(0.5),
            );
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(format!("alert task failed: {}", e)))?
    }
}
