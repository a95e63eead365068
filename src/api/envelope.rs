//! The `{status, data, message}` wrapper shared by every dashboard response.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::ApiError;

const SUCCESS: &str = "success";

#[derive(Debug, Clone, Deserialize)]
struct EnvelopeWire {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode an envelope body and return its `data` payload.
///
/// A `status` other than `"success"` becomes [`ApiError::Rejected`]. A missing
/// or `null` `data` yields `Ok(None)`; a payload that does not match `T` is
/// [`ApiError::Decode`].
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Decode("Empty response body".to_string()));
    }
    let envelope: EnvelopeWire = serde_json::from_str(trimmed)
        .map_err(|err| ApiError::Decode(format!("{err}: {}", preview(trimmed))))?;
    match envelope.status.as_deref() {
        Some(SUCCESS) => {}
        other => {
            let message = envelope.message.unwrap_or_else(|| match other {
                Some(status) => format!("status '{status}'"),
                None => "missing status".to_string(),
            });
            return Err(ApiError::Rejected(message));
        }
    }
    match envelope.data {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|err| ApiError::Decode(err.to_string())),
    }
}

/// Decode an envelope that carries no meaningful payload, checking only its status.
pub fn decode_ack(body: &str) -> Result<(), ApiError> {
    decode_data::<serde_json::Value>(body).map(|_| ())
}

fn preview(body: &str) -> &str {
    const MAX_PREVIEW: usize = 200;
    if body.len() <= MAX_PREVIEW {
        return body;
    }
    let mut end = MAX_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
