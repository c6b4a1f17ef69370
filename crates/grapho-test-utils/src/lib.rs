//! Testing utilities for the grapho workspace
//!
//! Shared fixtures and a scripted transport for driving the typed API
//! clients without a network.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grapho_api::{
    ApiConfig, ApiRequest, ApiResponse, Credentials, Gateway, MemorySessionStore, SessionStore,
    Transport, TransportError, UserKind,
};
use grapho_core::{ClientId, ClientRecord, ScoreMap};
use serde_json::{json, Value};

/// Transport that replays scripted responses in order and records every
/// request it saw.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and JSON body.
    pub fn push_response(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queue a connectivity failure.
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of responses")
    }
}

/// Gateway wired to a scripted transport and an active end-user session.
pub fn scripted_gateway(transport: Arc<ScriptedTransport>) -> Arc<Gateway> {
    scripted_gateway_with_session(
        transport,
        Arc::new(MemorySessionStore::with_credentials(Credentials::new(
            "test-token",
            UserKind::EndUser,
        ))),
    )
}

/// Gateway wired to a scripted transport and the given session store.
pub fn scripted_gateway_with_session(
    transport: Arc<ScriptedTransport>,
    session: Arc<MemorySessionStore>,
) -> Arc<Gateway> {
    let session: Arc<dyn SessionStore> = session;
    Arc::new(Gateway::new(transport, session, ApiConfig::new()))
}

/// The worked-example script map: A:80, B:60, C:40, D:20.
pub fn example_script_scores() -> ScoreMap {
    ScoreMap::from_pairs([("A", 80.0), ("B", 60.0), ("C", 40.0), ("D", 20.0)])
}

/// The worked-example questionnaire map: A:40, B:60, C:80, D:100.
pub fn example_questionnaire_scores() -> ScoreMap {
    ScoreMap::from_pairs([("A", 40.0), ("B", 60.0), ("C", 80.0), ("D", 100.0)])
}

/// A bare client record.
pub fn example_client(id: &str, name: &str) -> ClientRecord {
    ClientRecord::new(
        ClientId::new(id),
        name,
        format!("{}@example.com", name.to_lowercase()),
    )
}

/// JSON for one client as the server sends it.
pub fn client_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
    })
}

/// The three observed client-list envelope shapes around the same record.
pub fn client_list_envelopes(id: &str, name: &str) -> [Value; 3] {
    let record = client_json(id, name);
    [
        json!([record.clone()]),
        json!({ "clients": [record.clone()] }),
        json!({ "data": [record] }),
    ]
}
