//! Typed response-envelope decoders.
//!
//! The backends wrap their payloads inconsistently: a list may arrive
//! bare, under an endpoint-specific key, under `data`, behind a
//! `{success, ...}` flag, or as a lone object. Each endpoint declares its
//! expected shape once and gets a discriminated result back instead of
//! shape-guessing at every call site.

use grapho_core::ScoreMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Envelope description for a list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ListShape {
    /// Keys that may hold the list, in preference order.
    pub list_keys: &'static [&'static str],
    /// Keys whose presence marks a lone object as a record of this
    /// endpoint (singleton coercion) rather than an unrelated envelope.
    pub record_keys: &'static [&'static str],
}

/// Result of decoding a list endpoint's envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The payload held a list (bare, keyed, or flagged).
    List(Vec<T>),
    /// The payload was a single record; callers treat it as a
    /// one-element list.
    Singleton(T),
    /// No known shape matched.
    Malformed,
}

impl<T> Decoded<T> {
    /// Normalize to a plain list (`Malformed` becomes empty).
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Decoded::List(items) => items,
            Decoded::Singleton(item) => vec![item],
            Decoded::Malformed => Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Decoded::Malformed)
    }
}

/// Decode a list endpoint's envelope.
///
/// Shapes are tried in order: bare array; an object with one of the
/// declared list keys holding an array; any other object value holding an
/// array; a lone record identified by one of the declared record keys.
pub fn decode_list<T: DeserializeOwned>(value: &Value, shape: &ListShape) -> Decoded<T> {
    if let Some(items) = value.as_array() {
        return Decoded::List(decode_items(items));
    }

    if let Some(object) = value.as_object() {
        for key in shape.list_keys {
            if let Some(items) = object.get(*key).and_then(Value::as_array) {
                return Decoded::List(decode_items(items));
            }
        }
        for candidate in object.values() {
            if let Some(items) = candidate.as_array() {
                return Decoded::List(decode_items(items));
            }
        }
        if shape.record_keys.iter().any(|key| object.contains_key(*key)) {
            if let Ok(single) = serde_json::from_value::<T>(value.clone()) {
                return Decoded::Singleton(single);
            }
        }
    }

    Decoded::Malformed
}

/// List-endpoint policy: malformed envelopes normalize to an empty list
/// with a warning instead of failing the whole view.
pub fn decode_list_or_empty<T: DeserializeOwned>(
    value: &Value,
    shape: &ListShape,
    endpoint: &'static str,
) -> Vec<T> {
    let decoded = decode_list(value, shape);
    if decoded.is_malformed() {
        tracing::warn!(endpoint, "unrecognized list envelope; treating as empty");
    }
    decoded.into_vec()
}

fn decode_items<T: DeserializeOwned>(items: &[Value]) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value(item.clone()) {
            Ok(decoded) => out.push(decoded),
            Err(err) => tracing::warn!(%err, "skipping malformed list entry"),
        }
    }
    out
}

/// Decode a required single record, possibly nested under one of `keys`.
///
/// Used for endpoints whose payload is mandatory (create/update echoes,
/// the profile); unlike list endpoints these fail loudly.
pub fn decode_record<T: DeserializeOwned>(
    value: &Value,
    keys: &[&str],
) -> Result<T, String> {
    if let Some(object) = value.as_object() {
        for key in keys {
            if let Some(nested) = object.get(*key) {
                if nested.is_object() {
                    return serde_json::from_value(nested.clone()).map_err(|e| e.to_string());
                }
            }
        }
    }
    serde_json::from_value(value.clone()).map_err(|e| e.to_string())
}

/// Decode the analysis upload envelope into a score map.
///
/// The service reports `status`; anything but `"success"` carries an
/// `error` message. The score map itself has appeared as `script_scores`
/// or `scriptScores`, at top level or under `data`.
pub fn decode_score_envelope(value: &Value) -> Result<ScoreMap, ScoreEnvelopeError> {
    if let Some(status) = value.get("status").and_then(Value::as_str) {
        if status != "success" {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Processing failed")
                .to_string();
            return Err(ScoreEnvelopeError::Rejected(message));
        }
    }

    const SCORE_KEYS: [&str; 2] = ["script_scores", "scriptScores"];
    let mut candidates = vec![value];
    if let Some(data) = value.get("data") {
        candidates.push(data);
    }

    for candidate in candidates {
        for key in SCORE_KEYS {
            if let Some(scores) = candidate.get(key) {
                return serde_json::from_value::<ScoreMap>(scores.clone())
                    .map_err(|e| ScoreEnvelopeError::Unreadable(e.to_string()));
            }
        }
    }

    Err(ScoreEnvelopeError::MissingScores)
}

/// Failures decoding the upload envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreEnvelopeError {
    /// The service processed the sample and reported a failure.
    #[error("{0}")]
    Rejected(String),
    /// A score map was present but did not parse.
    #[error("score map did not parse: {0}")]
    Unreadable(String),
    /// No score map under any known key.
    #[error("no script scores found in response")]
    MissingScores,
}
