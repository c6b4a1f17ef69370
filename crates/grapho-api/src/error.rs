//! Error taxonomy for the API layer.
//!
//! Four families, handled differently at the call sites:
//! - validation errors: reported inline, no request was sent;
//! - auth errors: the session was invalidated, the caller returns to login;
//! - network/HTTP errors: carry the best human-readable message available;
//! - decode errors: a required payload did not match any known shape.

use serde_json::Value;

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credentials are stored; the caller never logged in (or the
    /// session was already invalidated earlier).
    #[error("not authenticated")]
    NotAuthenticated,

    /// An active session was just invalidated by a 401. Reported exactly
    /// once; later calls see [`AuthError::NotAuthenticated`].
    #[error("session expired, please log in again")]
    SessionExpired,
}

/// Errors surfaced by the typed API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Authentication failure; credentials were cleared where applicable.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request did not complete within its deadline.
    #[error("the request took too long; try again or check your connection")]
    Timeout,

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A required payload matched none of the known envelope shapes.
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode {
        endpoint: &'static str,
        detail: String,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this is an input-validation failure (nothing was sent).
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the caller should return to the login view.
    #[inline]
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub(crate) fn decode(endpoint: &'static str, detail: impl Into<String>) -> Self {
        Self::Decode {
            endpoint,
            detail: detail.into(),
        }
    }
}

/// Best-effort human-readable message for an error response body.
///
/// Servers disagree on the field name; `error` wins over `message`, and a
/// generic status line is the fallback.
#[must_use]
pub(crate) fn error_message(status: u16, body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("server error: {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_wins_over_message() {
        let body = json!({"error": "bad token", "message": "ignored"});
        assert_eq!(error_message(401, &body), "bad token");
    }

    #[test]
    fn message_field_is_the_second_choice() {
        let body = json!({"message": "not found"});
        assert_eq!(error_message(404, &body), "not found");
    }

    #[test]
    fn generic_fallback_names_the_status() {
        assert_eq!(error_message(500, &Value::Null), "server error: 500");
    }

    #[test]
    fn classification_helpers() {
        assert!(ApiError::Validation("x".into()).is_validation());
        assert!(ApiError::Auth(AuthError::SessionExpired).is_auth());
        assert!(!ApiError::Timeout.is_auth());
    }
}
