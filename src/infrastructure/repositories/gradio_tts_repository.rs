use super::tts_repository::TtsRepository;
use crate::domain::tts::{SynthesisRequest, SynthesizedAudio};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

/// Response of the queue submission call
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    event_id: String,
}

/// Gradio implementation of TTS repository
///
/// Talks to a hosted Gradio app through its two-step "call" API: the request is
/// queued with a POST, the result is read from a server-sent event stream and
/// the produced audio file is downloaded afterwards.
pub struct GradioTtsRepository {
    client: Client,
    base_url: String,
    api_name: String,
    access_token: Option<String>,
}

impl GradioTtsRepository {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_name: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_name: api_name.into().trim_start_matches('/').to_string(),
            access_token,
        }
    }

    fn call_url(&self) -> String {
        format!("{}/call/{}", self.base_url, self.api_name)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Queue the prediction and return its event id
    async fn submit(&self, request: &SynthesisRequest) -> AppResult<String> {
        tracing::info!(
            api_name = %self.api_name,
            voice = %request.voice,
            speed_offset = request.speed_offset,
            trim_silence = request.trim_silence,
            text_length = request.text.chars().count(),
            "Submitting TTS prediction"
        );

        let response = self
            .authorize(self.client.post(self.call_url()))
            .json(&json!({ "data": request.to_positional_args() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status.as_u16(),
                body = %body,
                "TTS prediction submission rejected"
            );
            return Err(AppError::ExternalService(format!(
                "prediction submission failed with status {}",
                status
            )));
        }

        let submitted: SubmitResponse = response.json().await?;
        tracing::debug!(event_id = %submitted.event_id, "TTS prediction queued");

        Ok(submitted.event_id)
    }

    /// Read the event stream for `event_id` until the prediction completes
    async fn await_output(&self, event_id: &str) -> AppResult<Value> {
        let url = format!("{}/{}", self.call_url(), event_id);
        let response = self.authorize(self.client.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "prediction result request failed with status {}",
                status
            )));
        }

        let body = response.text().await?;
        parse_event_stream(&body).map_err(AppError::ExternalService)
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        tracing::debug!(url = %url, "Downloading synthesized audio");

        let response = self.authorize(self.client.get(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "audio download failed with status {}",
                status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TtsRepository for GradioTtsRepository {
    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<SynthesizedAudio> {
        let start_time = std::time::Instant::now();

        let event_id = self.submit(request).await?;
        let output = self.await_output(&event_id).await?;

        let Some(url) = resolve_audio_url(&self.base_url, &output) else {
            tracing::warn!(output = %output, "TTS prediction returned no audio file");
            return Ok(SynthesizedAudio::empty());
        };

        let audio = SynthesizedAudio::new(self.download(&url).await?);

        tracing::info!(
            provider = "gradio",
            api_name = %self.api_name,
            voice = %request.voice,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = request.text.chars().count(),
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        Ok(audio)
    }
}

/// Extract the `complete` payload from a Gradio server-sent event stream
///
/// Events are separated by blank lines; each carries an `event:` line and one
/// or more `data:` lines.
fn parse_event_stream(body: &str) -> Result<Value, String> {
    let normalized = body.replace("\r\n", "\n");

    for block in normalized.split("\n\n") {
        let mut event = None;
        let mut data = Vec::new();

        for line in block.lines() {
            if let Some(name) = line.strip_prefix("event:") {
                event = Some(name.trim());
            } else if let Some(chunk) = line.strip_prefix("data:") {
                data.push(chunk.trim());
            }
        }

        let data = data.join("\n");
        match event {
            Some("complete") => {
                return serde_json::from_str(&data)
                    .map_err(|e| format!("malformed prediction output: {}", e));
            }
            Some("error") => {
                let detail = if data.is_empty() || data == "null" {
                    "no details provided".to_string()
                } else {
                    data
                };
                return Err(format!("prediction failed: {}", detail));
            }
            _ => {}
        }
    }

    Err("event stream ended without a result".to_string())
}

/// Locate the audio file referenced by the first output component
///
/// The output is either a plain server-side path or a file object carrying a
/// `url` and/or a `path`. Paths are served under `{base}/file=`.
fn resolve_audio_url(base_url: &str, output: &Value) -> Option<String> {
    let first = match output {
        Value::Array(items) => items.first()?,
        other => other,
    };

    let from_path = |path: &str| {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/file={}", base_url, path)
        }
    };

    match first {
        Value::String(path) if !path.is_empty() => Some(from_path(path.as_str())),
        Value::Object(file) => {
            let url = file.get("url").and_then(Value::as_str).filter(|u| !u.is_empty());
            let path = file.get("path").and_then(Value::as_str).filter(|p| !p.is_empty());
            url.map(str::to_string).or_else(|| path.map(from_path))
        }
        _ => None,
    }
}
