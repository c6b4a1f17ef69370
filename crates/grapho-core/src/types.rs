//! Records exchanged with the remote store.
//!
//! The server speaks camelCase JSON and identifies documents by either
//! `_id` or `id`; decoders accept both. Score maps and weight ride on the
//! client record so a prior session can be resumed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scores::{ScoreMap, Weight};

/// Opaque client identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client record: the subject of an analysis session.
///
/// Owned by the remote store; the directory holds a transient cached copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    #[serde(alias = "_id")]
    pub id: ClientId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_scores: Option<ScoreMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questionnaire_scores: Option<ScoreMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_scores: Option<ScoreMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl ClientRecord {
    /// Bare record with no analysis state yet.
    #[must_use]
    pub fn new(id: ClientId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            script_scores: None,
            questionnaire_scores: None,
            combined_scores: None,
            weight: None,
        }
    }

    /// Whether any analysis step has completed for this client.
    #[must_use]
    pub fn has_scores(&self) -> bool {
        self.script_scores.is_some()
            || self.questionnaire_scores.is_some()
            || self.combined_scores.is_some()
    }
}

/// Payload for creating a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
}

impl NewClient {
    /// Validating constructor; both fields are required.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(CoreError::MissingField("name"));
        }
        if email.trim().is_empty() {
            return Err(CoreError::MissingField("email"));
        }
        Ok(Self { name, email })
    }
}

/// Partial update to a client record.
///
/// Only set fields are serialized, so a patch carries exactly what one
/// workflow step changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_scores: Option<ScoreMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questionnaire_scores: Option<ScoreMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_scores: Option<ScoreMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl ClientPatch {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_script_scores(mut self, scores: ScoreMap) -> Self {
        self.script_scores = Some(scores);
        self
    }

    #[must_use]
    pub fn with_questionnaire_scores(mut self, scores: ScoreMap) -> Self {
        self.questionnaire_scores = Some(scores);
        self
    }

    #[must_use]
    pub fn with_combined_scores(mut self, scores: ScoreMap) -> Self {
        self.combined_scores = Some(scores);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A registered user as seen by the admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// The acting user embedded in an activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// One entry of the admin activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The server populates this from the user collection; system events
    /// carry no user.
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user: Option<ActivityUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}
