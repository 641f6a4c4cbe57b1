use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SwitchBotError};

/// Success.
pub const STATUS_SUCCESS: i64 = 100;
/// Vendor advisory, e.g. a device that is not reachable via the cloud.
pub const STATUS_ADVISORY: i64 = 190;

/// The uniform response wrapper of the SwitchBot API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Usually an integer, but anything the vendor sends is kept.
    pub status_code: Value,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// What a request produced once the envelope has been looked at.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The `message` of an advisory or of a success without payload.
    Message(Value),
    /// The `body` of a successful request.
    Body(Value),
    /// Any other status code. Carries the whole envelope so that the caller
    /// can see what the vendor reported.
    Unrecognized(Value),
}

impl Reply {
    pub fn into_value(self) -> Value {
        match self {
            Reply::Message(value) | Reply::Body(value) | Reply::Unrecognized(value) => value,
        }
    }
}

/// Parses a raw response text and interprets it, see [`interpret`].
pub fn parse(text: &str) -> Result<Reply> {
    let raw: Value = serde_json::from_str(text)?;
    interpret(raw)
}

/// Maps a response envelope onto a [`Reply`]:
/// - 190 → `message`
/// - 100 with a truthy `body` → `body`
/// - 100 otherwise → `message`
/// - anything else → the raw envelope
pub fn interpret(raw: Value) -> Result<Reply> {
    let envelope = Envelope::deserialize(&raw).map_err(|err| {
        SwitchBotError::MalformedEnvelope(format!("{err}: {raw}"))
    })?;

    let Envelope {
        status_code,
        body,
        message,
    } = envelope;

    let reply = match status_code_of(&status_code) {
        Some(STATUS_ADVISORY) => Reply::Message(message.unwrap_or(Value::Null)),
        Some(STATUS_SUCCESS) => match body {
            Some(body) if is_truthy(&body) => Reply::Body(body),
            _ => Reply::Message(message.unwrap_or(Value::Null)),
        },
        _ => {
            debug!("unrecognized status code {status_code}, passing envelope through");
            Reply::Unrecognized(raw)
        }
    };
    Ok(reply)
}

/// Integral numbers only, `100.0` counts as 100. Strings and other values
/// never match a known code.
fn status_code_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

/// Empty containers, empty strings, zero, false and null are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
