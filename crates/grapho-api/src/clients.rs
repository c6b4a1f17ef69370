//! Client-management API and the optimistic directory service.

use std::sync::Arc;

use grapho_core::{ClientDirectory, ClientId, ClientPatch, ClientRecord, NewClient};
use serde::Deserialize;
use serde_json::json;

use crate::envelope::{decode_list_or_empty, decode_record, ListShape};
use crate::error::ApiError;
use crate::gateway::{CallOptions, Gateway};

const CLIENT_LIST: ListShape = ListShape {
    list_keys: &["clients", "data"],
    record_keys: &["_id", "id", "email"],
};

/// Proof that the user explicitly confirmed a destructive delete.
///
/// Constructed only by the confirmation prompt; the API refuses to take a
/// bare id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfirmation(());

impl DeleteConfirmation {
    /// Record that the user answered the confirmation prompt.
    #[must_use]
    pub fn confirmed() -> Self {
        Self(())
    }
}

/// Result of polling for questionnaire responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseCheck {
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub client: Option<ClientRecord>,
}

pub struct ClientApi {
    gateway: Arc<Gateway>,
}

impl ClientApi {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetch the client list (envelope-tolerant, empty on malformed).
    pub async fn list(&self) -> Result<Vec<ClientRecord>, ApiError> {
        let response = self.gateway.get("/api/clients", CallOptions::PLAIN).await?;
        Ok(decode_list_or_empty(&response.body, &CLIENT_LIST, "clients"))
    }

    /// Create a client, then send the questionnaire form link.
    ///
    /// The send-form follow-up is deliberately best-effort: the client was
    /// created, so its failure is logged and swallowed rather than failing
    /// the creation.
    pub async fn create(&self, new_client: &NewClient) -> Result<ClientRecord, ApiError> {
        let response = self
            .gateway
            .post(
                "/api/clients",
                Some(serde_json::to_value(new_client).expect("NewClient serializes")),
                CallOptions::PLAIN,
            )
            .await?;
        let record: ClientRecord = decode_record(&response.body, &["client", "data"])
            .map_err(|detail| ApiError::decode("clients/create", detail))?;

        if let Err(err) = self.send_form(&record.id).await {
            tracing::warn!(client = %record.id, %err, "send-form after create failed");
        }

        Ok(record)
    }

    /// Apply a partial update and return the server's echo of the record.
    pub async fn update(
        &self,
        id: &ClientId,
        patch: &ClientPatch,
    ) -> Result<ClientRecord, ApiError> {
        let response = self
            .gateway
            .put(
                &format!("/api/clients/{id}"),
                Some(serde_json::to_value(patch).expect("ClientPatch serializes")),
                CallOptions::PLAIN,
            )
            .await?;
        decode_record(&response.body, &["client", "data"])
            .map_err(|detail| ApiError::decode("clients/update", detail))
    }

    /// Delete a client. Requires explicit confirmation.
    pub async fn delete(
        &self,
        id: &ClientId,
        _confirmation: DeleteConfirmation,
    ) -> Result<(), ApiError> {
        self.gateway
            .delete(&format!("/api/clients/{id}"), CallOptions::PLAIN)
            .await?;
        Ok(())
    }

    /// Email the questionnaire form link to a client.
    pub async fn send_form(&self, id: &ClientId) -> Result<(), ApiError> {
        self.gateway
            .post(
                "/api/clients/send-form",
                Some(json!({ "clientId": id })),
                CallOptions::PLAIN,
            )
            .await?;
        Ok(())
    }

    /// Poll whether the client has submitted questionnaire responses.
    pub async fn check_responses(&self, id: &ClientId) -> Result<ResponseCheck, ApiError> {
        let response = self
            .gateway
            .get(
                &format!("/api/clients/{id}/check-responses"),
                CallOptions::PLAIN,
            )
            .await?;
        serde_json::from_value(response.body.clone())
            .map_err(|e| ApiError::decode("clients/check-responses", e.to_string()))
    }
}

/// The client directory backed by the remote API.
///
/// Mutations are optimistic: the cached list changes first and is not
/// rolled back when the remote call fails; the error surfaces and the
/// next [`refresh`](Self::refresh) reconciles with the store. Creation is
/// the exception, since the record's identity is server-assigned.
pub struct DirectoryService {
    api: ClientApi,
    directory: ClientDirectory,
}

impl DirectoryService {
    #[must_use]
    pub fn new(api: ClientApi) -> Self {
        Self {
            api,
            directory: ClientDirectory::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn directory(&self) -> &ClientDirectory {
        &self.directory
    }

    /// Replace the cache with the remote list.
    pub async fn refresh(&mut self) -> Result<&[ClientRecord], ApiError> {
        let clients = self.api.list().await?;
        self.directory.replace_all(clients);
        Ok(self.directory.clients())
    }

    /// Create a client remotely and prepend the echoed record.
    pub async fn create(&mut self, new_client: NewClient) -> Result<ClientRecord, ApiError> {
        let record = self.api.create(&new_client).await?;
        self.directory.apply_create(record.clone());
        Ok(record)
    }

    /// Optimistically update a cached client, then persist.
    pub async fn update(&mut self, id: &ClientId, patch: ClientPatch) -> Result<(), ApiError> {
        if let Some(existing) = self.directory.find(id) {
            let mut optimistic = existing.clone();
            apply_patch(&mut optimistic, &patch);
            self.directory.apply_update(optimistic);
        }

        let echoed = self.api.update(id, &patch).await?;
        self.directory.apply_update(echoed);
        Ok(())
    }

    /// Optimistically remove a client, then persist.
    pub async fn delete(
        &mut self,
        id: &ClientId,
        confirmation: DeleteConfirmation,
    ) -> Result<(), ApiError> {
        self.directory.apply_delete(id);
        self.api.delete(id, confirmation).await
    }

    #[inline]
    #[must_use]
    pub fn api(&self) -> &ClientApi {
        &self.api
    }
}

fn apply_patch(record: &mut ClientRecord, patch: &ClientPatch) {
    if let Some(name) = &patch.name {
        record.name = name.clone();
    }
    if let Some(email) = &patch.email {
        record.email = email.clone();
    }
    if let Some(scores) = &patch.script_scores {
        record.script_scores = Some(scores.clone());
    }
    if let Some(scores) = &patch.questionnaire_scores {
        record.questionnaire_scores = Some(scores.clone());
    }
    if let Some(scores) = &patch.combined_scores {
        record.combined_scores = Some(scores.clone());
    }
    if let Some(weight) = patch.weight {
        record.weight = Some(weight);
    }
}
