//! Response envelope shared by every Skola24 endpoint.
//!
//! ```json
//! { "error": null, "exception": null, "validation": [], "data": { ... } }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct Envelope {
    error: Option<Value>,
    exception: Option<Value>,
    validation: Option<Value>,
    data: Option<Value>,
}

/// Check the failure markers in order (status, `error`, `exception`,
/// `validation`) and return the `data` payload of a clean response.
pub fn inspect(status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(Error::Upstream(format!("HTTP {}: {}", status.as_u16(), body)));
    }

    let envelope: Envelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.error {
        return Err(Error::Upstream(serde_json::to_string(&error)?));
    }

    if let Some(exception) = envelope.exception {
        return Err(Error::Upstream(serde_json::to_string(&exception)?));
    }

    if let Some(validation) = envelope.validation.filter(is_complaint) {
        return Err(Error::Upstream(serde_json::to_string(&validation)?));
    }

    envelope
        .data
        .ok_or_else(|| Error::MalformedPayload("response has no data".to_string()))
}

/// Only a non-empty list or message string counts; anything else is absent
fn is_complaint(validation: &Value) -> bool {
    match validation {
        Value::Array(items) => !items.is_empty(),
        Value::String(text) => !text.is_empty(),
        _ => false,
    }
}

/// Deserialize a clean `data` payload into its wire type
pub fn decode<T: DeserializeOwned>(data: Value, what: &str) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| Error::MalformedPayload(format!("unexpected {} payload: {}", what, e)))
}
