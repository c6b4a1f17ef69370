//! Injected session context.
//!
//! One store owns the bearer token and the kind of signed-in user; every
//! authenticated request reads it from here, and `invalidate` is the
//! single place a session dies. The first invalidation of an active
//! session reports true so the caller can redirect to login exactly once.

use std::sync::Mutex;

/// Kind of signed-in principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    EndUser,
    Admin,
}

/// Stored credentials for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub kind: UserKind,
}

impl Credentials {
    #[must_use]
    pub fn new(token: impl Into<String>, kind: UserKind) -> Self {
        Self {
            token: token.into(),
            kind,
        }
    }
}

/// Session context shared by the API clients.
pub trait SessionStore: Send + Sync {
    /// Current credentials, if a session is active.
    fn credentials(&self) -> Option<Credentials>;

    /// Begin a session.
    fn store(&self, credentials: Credentials);

    /// Replace the token after a successful refresh, keeping the user kind.
    /// No-op when no session is active.
    fn update_token(&self, token: String);

    /// End the session. Returns true if an active session was cleared by
    /// this call (the signal to redirect to login) and false if the
    /// session was already gone.
    fn invalidate(&self) -> bool;
}

/// Convenience accessors over any store.
impl dyn SessionStore {
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.credentials().map(|c| c.token)
    }

    #[must_use]
    pub fn user_kind(&self) -> Option<UserKind> {
        self.credentials().map(|c| c.kind)
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemorySessionStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts with an active session.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn credentials(&self) -> Option<Credentials> {
        self.inner.lock().expect("session lock poisoned").clone()
    }

    fn store(&self, credentials: Credentials) {
        *self.inner.lock().expect("session lock poisoned") = Some(credentials);
    }

    fn update_token(&self, token: String) {
        if let Some(credentials) = self.inner.lock().expect("session lock poisoned").as_mut() {
            credentials.token = token;
        }
    }

    fn invalidate(&self) -> bool {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .take()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_reports_true_only_once() {
        let store = MemorySessionStore::with_credentials(Credentials::new("t1", UserKind::EndUser));
        assert!(store.invalidate());
        assert!(!store.invalidate());
        assert!(store.credentials().is_none());
    }

    #[test]
    fn update_token_keeps_user_kind() {
        let store = MemorySessionStore::with_credentials(Credentials::new("t1", UserKind::Admin));
        store.update_token("t2".into());
        let credentials = store.credentials().unwrap();
        assert_eq!(credentials.token, "t2");
        assert_eq!(credentials.kind, UserKind::Admin);
    }

    #[test]
    fn update_token_without_session_is_a_no_op() {
        let store = MemorySessionStore::new();
        store.update_token("t2".into());
        assert!(store.credentials().is_none());
    }
}
