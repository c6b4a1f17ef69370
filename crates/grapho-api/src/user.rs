//! Session/user API: profile, logout.
//!
//! This is the primary session API; its calls are refresh-eligible on a
//! 401.

use std::sync::Arc;

use grapho_core::UserAccount;

use crate::envelope::decode_record;
use crate::error::ApiError;
use crate::gateway::{CallOptions, Gateway};

pub struct UserApi {
    gateway: Arc<Gateway>,
}

impl UserApi {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetch the signed-in user's profile.
    ///
    /// The payload arrives either bare or under a `user` key.
    pub async fn profile(&self) -> Result<UserAccount, ApiError> {
        let response = self
            .gateway
            .get("/api/user/profile", CallOptions::REFRESHABLE)
            .await?;
        decode_record(&response.body, &["user"])
            .map_err(|detail| ApiError::decode("user/profile", detail))
    }

    /// End the session.
    ///
    /// The server-side logout is best-effort: a failure is logged and the
    /// local session is cleared regardless.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .gateway
            .post("/api/user/logout", None, CallOptions::PLAIN)
            .await;
        if let Err(err) = result {
            if !err.is_auth() {
                tracing::warn!(%err, "logout request failed; clearing session anyway");
            }
        }
        self.gateway.session().invalidate();
        Ok(())
    }
}
