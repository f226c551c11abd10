//! Local audio output
//!
//! Two backends implement [`AudioOutput`]:
//! - [`CommandAudioOutput`] hands files to an external player found on `PATH`
//!   (ffplay, mpv, afplay, paplay, aplay). Always available.
//! - `RodioAudioOutput` decodes and plays in-process. Built by default on
//!   Windows and macOS; elsewhere it needs the `rodio` cargo feature and the
//!   platform audio development packages.

pub mod command;
#[cfg(any(feature = "rodio", windows, target_os = "macos"))]
pub mod rodio_output;

pub use command::CommandAudioOutput;
#[cfg(any(feature = "rodio", windows, target_os = "macos"))]
pub use rodio_output::RodioAudioOutput;

use std::f32::consts::PI;
use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::tts::SynthesizedAudio;
use crate::error::{AppError, AppResult};

/// Whether this build plays audio in-process instead of through an external player
pub const IN_PROCESS_PLAYBACK: bool = cfg!(any(feature = "rodio", windows, target_os = "macos"));

/// Sample rate used when rendering alert tones
pub const TONE_SAMPLE_RATE: u32 = 44_100;

/// Short sine beep played when the connection drops abnormally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

impl Default for AlertTone {
    fn default() -> Self {
        Self {
            frequency_hz: 500,
            duration: Duration::from_millis(50),
        }
    }
}

#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play synthesized audio until it finishes or fails
    async fn play(&self, audio: SynthesizedAudio) -> AppResult<()>;

    /// Play a short sine tone
    async fn beep(&self, tone: AlertTone) -> AppResult<()>;
}

/// Render `tone` as a mono 16-bit PCM WAV file
pub fn render_tone_wav(tone: AlertTone, sample_rate: u32) -> AppResult<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let sample_count = (tone.duration.as_secs_f64() * sample_rate as f64).round() as u32;
    let amplitude = i16::MAX as f32 * 0.5;
    let step = 2.0 * PI * tone.frequency_hz as f32 / sample_rate as f32;

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|e| AppError::Audio(format!("failed to start WAV writer: {}", e)))?;
        for n in 0..sample_count {
            let sample = (step * n as f32).sin() * amplitude;
            writer
                .write_sample(sample as i16)
                .map_err(|e| AppError::Audio(format!("failed to write tone sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| AppError::Audio(format!("failed to finalize tone: {}", e)))?;
    }

    Ok(buffer.into_inner())
}
