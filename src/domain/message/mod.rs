pub mod error;
pub mod service;

pub use error::MessageProcessorError;
pub use service::{MessageProcessor, MessageProcessorApi, ProcessOutcome};

use serde::Deserialize;
use serde_json::Value;

/// Envelope pushed by the event feed; fields other than `Payload` are ignored
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Payload", default)]
    pub payload: Option<Value>,
}

impl InboundMessage {
    /// Parse a raw frame, requiring a top-level JSON object
    pub fn parse(raw: &str) -> Result<Self, MessageProcessorError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(MessageProcessorError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The text to speak
    ///
    /// Absent, null and empty values (`""`, `false`, `0`, `[]`, `{}`) count as
    /// missing; any other non-string value is invalid.
    pub fn payload_text(&self) -> Result<&str, MessageProcessorError> {
        let Some(value) = self.payload.as_ref().filter(|v| !is_empty_value(v)) else {
            return Err(MessageProcessorError::MissingPayload);
        };

        match value {
            Value::String(text) => Ok(text.as_str()),
            Value::Bool(_) => Err(MessageProcessorError::InvalidPayload("boolean")),
            Value::Number(_) => Err(MessageProcessorError::InvalidPayload("number")),
            Value::Array(_) => Err(MessageProcessorError::InvalidPayload("array")),
            Value::Object(_) => Err(MessageProcessorError::InvalidPayload("object")),
            Value::Null => Err(MessageProcessorError::MissingPayload),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
