use crate::domain::tts::{SynthesisRequest, SynthesizedAudio};
use crate::error::AppResult;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the remote inference endpoint that turns text into audio.
///
/// Implementations are responsible for:
/// - Encoding the request the way the provider expects it
/// - Waiting for the provider to finish
/// - Fetching the produced audio file
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize the request's text with its voice settings
    ///
    /// Returns the raw audio file as produced by the provider. An empty value
    /// means the provider answered without usable audio.
    ///
    /// # Errors
    /// Returns error if the provider is unreachable or reports a failure
    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<SynthesizedAudio>;
}
