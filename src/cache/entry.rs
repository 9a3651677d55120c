//! Cache entries and failure descriptions.
//!
//! An entry is the resolved outcome of fetching one resource key: either a
//! success payload or a failure. Pending fetches are never stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries no description of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error happened while fetching the data.";

/// Category of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// The response arrived with a status outside the 2xx range.
    Http { status: u16 },
    /// The request never produced a response.
    Transport,
    /// The body could not be decoded as JSON.
    Parse,
    /// A failure with no usable description.
    Unknown,
}

/// Description of a failed fetch, stored in place of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn http_status(status: u16) -> Self {
        Self {
            kind: FailureKind::Http { status },
            message: format!("HTTP error Status:{status}"),
        }
    }

    /// Transport failures keep their own text; blank text falls back to the generic message.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::unknown();
        }
        Self {
            kind: FailureKind::Transport,
            message,
        }
    }

    pub fn parse(error: &serde_json::Error) -> Self {
        Self {
            kind: FailureKind::Parse,
            message: format!("failed to parse response body: {error}"),
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: FailureKind::Unknown,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// HTTP status carried by the failure, if it was a status failure.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::Http { status } => Some(status),
            _ => None,
        }
    }
}

/// Resolved outcome for one resource key.
///
/// On the wire an entry is `{"data": <json|null>, "error": <failure|null>}`.
/// A JSON `null` payload is stored as an absent payload so that entries
/// compare equal after a transfer round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEntry", into = "WireEntry")]
pub struct CacheEntry {
    payload: Option<Value>,
    failure: Option<FetchFailure>,
}

impl CacheEntry {
    pub fn success(payload: Value) -> Self {
        Self {
            payload: (!payload.is_null()).then_some(payload),
            failure: None,
        }
    }

    pub fn failure(failure: FetchFailure) -> Self {
        Self {
            payload: None,
            failure: Some(failure),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn failure_ref(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_parts(self) -> (Option<Value>, Option<FetchFailure>) {
        (self.payload, self.failure)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEntry {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<FetchFailure>,
}

#[derive(Debug, Error)]
#[error("cache entry carries both data and error")]
pub struct AmbiguousEntry;

impl TryFrom<WireEntry> for CacheEntry {
    type Error = AmbiguousEntry;

    fn try_from(wire: WireEntry) -> Result<Self, Self::Error> {
        match (wire.data, wire.error) {
            (Value::Null, Some(failure)) => Ok(Self::failure(failure)),
            (_, Some(_)) => Err(AmbiguousEntry),
            (data, None) => Ok(Self::success(data)),
        }
    }
}

impl From<CacheEntry> for WireEntry {
    fn from(entry: CacheEntry) -> Self {
        Self {
            data: entry.payload.unwrap_or(Value::Null),
            error: entry.failure,
        }
    }
}

/// Truthiness of a payload as the fetch trigger sees it.
///
/// `null`, `false`, `0` and `""` are falsy; every other value, including
/// empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
