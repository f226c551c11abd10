use serde_json::{json, Value};

/// Neural voice used for every synthesis request
pub const VOICE_ID: &str = "ja-JP-NanamiNeural";

/// Speaking rate offset in percent (-10 reads at 90% speed)
pub const SPEED_OFFSET: i32 = -10;

/// Ask the endpoint to cut leading/trailing silence
pub const TRIM_SILENCE: bool = true;

/// Parameters sent to the speech synthesis endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub speed_offset: i32,
    pub trim_silence: bool,
}

impl SynthesisRequest {
    /// Build a request for `text` with the fixed voice settings
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: VOICE_ID.to_string(),
            speed_offset: SPEED_OFFSET,
            trim_silence: TRIM_SILENCE,
        }
    }

    /// Positional argument list in the order the endpoint declares its inputs
    pub fn to_positional_args(&self) -> Value {
        json!([self.text, self.voice, self.speed_offset, self.trim_silence])
    }
}

/// Audio returned by the synthesis endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
}

impl SynthesizedAudio {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Only results longer than a single byte are worth handing to the player
    pub fn is_playable(&self) -> bool {
        self.bytes.len() > 1
    }
}
