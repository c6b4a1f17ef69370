//! Admin API: pending users, user list, activity log, verification.

use std::sync::Arc;

use grapho_core::{ActivityRecord, UserAccount};
use serde_json::Value;

use crate::envelope::{decode_list_or_empty, ListShape};
use crate::error::ApiError;
use crate::gateway::{CallOptions, Gateway};

/// Admin list payloads arrive bare, keyed, or behind a success flag.
const USER_LIST: ListShape = ListShape {
    list_keys: &["users", "data"],
    record_keys: &["_id", "id", "email"],
};

const ACTIVITY_LIST: ListShape = ListShape {
    list_keys: &["activities", "data"],
    record_keys: &["_id", "action", "timestamp"],
};

/// Everything the admin dashboard renders, fetched in one sweep.
#[derive(Debug, Clone, Default)]
pub struct AdminSnapshot {
    pub pending_users: Vec<UserAccount>,
    pub users: Vec<UserAccount>,
    pub activities: Vec<ActivityRecord>,
}

impl AdminSnapshot {
    #[must_use]
    pub fn verified_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_verified).count()
    }

    #[must_use]
    pub fn login_count(&self) -> usize {
        self.activities
            .iter()
            .filter(|a| a.action.as_deref() == Some("login"))
            .count()
    }
}

pub struct AdminApi {
    gateway: Arc<Gateway>,
}

impl AdminApi {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn pending_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let response = self
            .gateway
            .get("/api/admin/pending-users", CallOptions::PLAIN)
            .await?;
        Ok(decode_list_or_empty(
            &response.body,
            &USER_LIST,
            "admin/pending-users",
        ))
    }

    pub async fn users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let response = self
            .gateway
            .get("/api/admin/users", CallOptions::PLAIN)
            .await?;
        Ok(decode_list_or_empty(
            &response.body,
            &USER_LIST,
            "admin/users",
        ))
    }

    pub async fn activities(&self) -> Result<Vec<ActivityRecord>, ApiError> {
        let response = self
            .gateway
            .get("/api/admin/user-activities", CallOptions::PLAIN)
            .await?;
        Ok(decode_list_or_empty(
            &response.body,
            &ACTIVITY_LIST,
            "admin/user-activities",
        ))
    }

    /// Fetch the three dashboard lists concurrently.
    pub async fn dashboard_snapshot(&self) -> Result<AdminSnapshot, ApiError> {
        let (pending_users, users, activities) =
            tokio::join!(self.pending_users(), self.users(), self.activities());
        Ok(AdminSnapshot {
            pending_users: pending_users?,
            users: users?,
            activities: activities?,
        })
    }

    /// Approve a pending registration. Returns the server's message.
    pub async fn verify_user(&self, user_id: &str) -> Result<String, ApiError> {
        let response = self
            .gateway
            .post(
                &format!("/api/admin/verify-user/{user_id}"),
                None,
                CallOptions::PLAIN,
            )
            .await?;
        Ok(response
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("User verified successfully! Credentials sent via email.")
            .to_string())
    }
}
