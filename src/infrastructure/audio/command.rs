use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::{render_tone_wav, AlertTone, AudioOutput, TONE_SAMPLE_RATE};
use crate::domain::tts::SynthesizedAudio;
use crate::error::{AppError, AppResult};

/// Players probed on `PATH`, in order of preference
const PLAYER_CANDIDATES: &[&str] = &["ffplay", "mpv", "afplay", "paplay", "aplay"];

const FFPLAY_ARGS: &[&str] = &["-nodisp", "-autoexit", "-loglevel", "quiet"];
const MPV_ARGS: &[&str] = &["--no-video", "--really-quiet"];
const APLAY_ARGS: &[&str] = &["-q"];

/// Plays audio by writing it to a temporary file and running an external player
pub struct CommandAudioOutput {
    player: Option<PathBuf>,
}

impl CommandAudioOutput {
    pub fn new(player: Option<PathBuf>) -> Self {
        Self { player }
    }

    /// Use `preferred` when it resolves on `PATH`, otherwise the first known player
    pub fn detect(preferred: Option<&str>) -> Self {
        let player = preferred
            .and_then(find_on_path)
            .or_else(|| PLAYER_CANDIDATES.iter().find_map(|name| find_on_path(name)));

        match &player {
            Some(path) => tracing::info!(player = %path.display(), "Audio player selected"),
            None => tracing::warn!(
                candidates = ?PLAYER_CANDIDATES,
                hint = "install ffmpeg or mpv, or build with --features rodio",
                "No audio player found on PATH; playback and alerts will fail"
            ),
        }

        Self { player }
    }

    async fn play_bytes(&self, bytes: &[u8]) -> AppResult<()> {
        let player = self
            .player
            .as_ref()
            .ok_or_else(|| AppError::Audio("no audio player available".to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("tts-bridge-")
            .suffix(sniff_extension(bytes))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        let status = Command::new(player)
            .args(player_args(player))
            .arg(file.path())
            .status()
            .await?;

        if !status.success() {
            return Err(AppError::Audio(format!(
                "{} exited with {}",
                player.display(),
                status
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioOutput for CommandAudioOutput {
    async fn play(&self, audio: SynthesizedAudio) -> AppResult<()> {
        tracing::debug!(audio_size_bytes = audio.len(), "Playing synthesized audio");
        self.play_bytes(&audio.bytes).await
    }

    async fn beep(&self, tone: AlertTone) -> AppResult<()> {
        let wav = render_tone_wav(tone, TONE_SAMPLE_RATE)?;
        self.play_bytes(&wav).await
    }
}

/// Flags that make each player exit after a single file without a window
fn player_args(player: &Path) -> &'static [&'static str] {
    let name = player.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    match name {
        "ffplay" => FFPLAY_ARGS,
        "mpv" => MPV_ARGS,
        "aplay" => APLAY_ARGS,
        _ => &[],
    }
}

/// Pick a file extension from the container magic so players can probe the format
fn sniff_extension(bytes: &[u8]) -> &'static str {
    match bytes {
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => ".wav",
        [b'O', b'g', b'g', b'S', ..] => ".ogg",
        [b'f', b'L', b'a', b'C', ..] => ".flac",
        _ => ".mp3",
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(name);
        if full.is_file() {
            return Some(full);
        }
        let exe = full.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}
