use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::connection::ConnectionSettings;
use crate::error::{AppError, AppResult};
use crate::infrastructure::audio::AlertTone;

pub const DEFAULT_WEBSOCKET_URI: &str = "ws://127.0.0.1:3000/Messages";
pub const DEFAULT_TTS_SPACE_URL: &str = "https://rafag-tts-rapido.hf.space";
pub const DEFAULT_TTS_API_NAME: &str = "/controlador_generate_audio";

#[derive(Clone)]
pub struct Config {
    pub websocket_uri: String,
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
    pub reconnect_delay: Duration,
    // Inference endpoint
    pub hf_token: Option<String>,
    pub tts_space_url: String,
    pub tts_api_name: String,
    pub tts_request_timeout: Duration,
    // Audio
    pub alert_tone: AlertTone,
    pub audio_player: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            websocket_uri: env::var("WEBSOCKET_URI")
                .unwrap_or_else(|_| DEFAULT_WEBSOCKET_URI.to_string()),
            ping_interval: Duration::from_secs(parse_var("PING_INTERVAL_SECS", 10)?),
            pong_timeout: Duration::from_secs(parse_var("PONG_TIMEOUT_SECS", 5)?),
            reconnect_delay: Duration::from_millis(parse_var("RECONNECT_DELAY_MS", 0)?),
            hf_token: env::var("HF_TOKEN").ok().filter(|token| !token.is_empty()),
            tts_space_url: env::var("TTS_SPACE_URL")
                .unwrap_or_else(|_| DEFAULT_TTS_SPACE_URL.to_string()),
            tts_api_name: env::var("TTS_API_NAME")
                .unwrap_or_else(|_| DEFAULT_TTS_API_NAME.to_string()),
            tts_request_timeout: Duration::from_secs(parse_var("TTS_REQUEST_TIMEOUT_SECS", 120)?),
            alert_tone: AlertTone {
                frequency_hz: parse_var("ALERT_FREQUENCY_HZ", 500)?,
                duration: Duration::from_millis(parse_var("ALERT_DURATION_MS", 50)?),
            },
            audio_player: env::var("AUDIO_PLAYER").ok().filter(|p| !p.is_empty()),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        if config.pong_timeout.is_zero() {
            return Err(AppError::Config("PONG_TIMEOUT_SECS must be greater than 0".to_string()));
        }

        Ok(config)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            uri: self.websocket_uri.clone(),
            reconnect_delay: self.reconnect_delay,
            alert_tone: self.alert_tone,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("websocket_uri", &self.websocket_uri)
            .field("ping_interval", &self.ping_interval)
            .field("pong_timeout", &self.pong_timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .field("tts_space_url", &self.tts_space_url)
            .field("tts_api_name", &self.tts_api_name)
            .field("tts_request_timeout", &self.tts_request_timeout)
            .field("alert_tone", &self.alert_tone)
            .field("audio_player", &self.audio_player)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_var<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}={:?} is invalid: {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
