//! Client-management flows: create + send-form, optimistic mutations,
//! response polling, and the sample upload path.

use std::sync::Arc;

use grapho_api::{
    AnalysisApi, ApiError, ClientApi, DeleteConfirmation, DirectoryService, TransportError,
};
use grapho_core::{ClientId, ClientPatch, NewClient, Weight};
use grapho_test_utils::{client_json, scripted_gateway, ScriptedTransport};
use serde_json::json;

#[tokio::test]
async fn create_sends_the_form_link() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(201, json!({"client": client_json("c9", "Ada")}));
    transport.push_response(200, json!({"success": true}));

    let api = ClientApi::new(scripted_gateway(Arc::clone(&transport)));
    let record = api
        .create(&NewClient::new("Ada", "ada@example.com").unwrap())
        .await
        .unwrap();

    assert_eq!(record.id, ClientId::new("c9"));
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].url.ends_with("/api/clients/send-form"));
    assert_eq!(requests[1].body.as_ref().unwrap()["clientId"], json!("c9"));
}

#[tokio::test]
async fn send_form_failure_does_not_fail_creation() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(201, json!({"data": client_json("c9", "Ada")}));
    transport.push_error(TransportError::Network("connection reset".into()));

    let api = ClientApi::new(scripted_gateway(transport));
    let record = api
        .create(&NewClient::new("Ada", "ada@example.com").unwrap())
        .await
        .unwrap();
    assert_eq!(record.name, "Ada");
}

#[tokio::test]
async fn optimistic_delete_keeps_local_removal_on_remote_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(200, json!([client_json("c1", "Ada"), client_json("c2", "Bea")]));
    transport.push_error(TransportError::Network("connection reset".into()));

    let api = ClientApi::new(scripted_gateway(transport));
    let mut service = DirectoryService::new(api);
    service.refresh().await.unwrap();
    assert_eq!(service.directory().len(), 2);

    let err = service
        .delete(&ClientId::new("c1"), DeleteConfirmation::confirmed())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    // The cached list already dropped the record; no rollback.
    assert_eq!(service.directory().len(), 1);
    assert!(service.directory().find(&ClientId::new("c1")).is_none());
}

#[tokio::test]
async fn optimistic_update_applies_patch_before_the_echo() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(200, json!([client_json("c1", "Ada")]));
    let mut echoed = client_json("c1", "Ada");
    echoed["weight"] = json!(80);
    transport.push_response(200, json!({"client": echoed}));

    let api = ClientApi::new(scripted_gateway(transport));
    let mut service = DirectoryService::new(api);
    service.refresh().await.unwrap();

    service
        .update(
            &ClientId::new("c1"),
            ClientPatch::new().with_weight(Weight::new(80).unwrap()),
        )
        .await
        .unwrap();

    let cached = service.directory().find(&ClientId::new("c1")).unwrap();
    assert_eq!(cached.weight, Some(Weight::new(80).unwrap()));
}

#[tokio::test]
async fn check_responses_decodes_the_refreshed_client() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut refreshed = client_json("c1", "Ada");
    refreshed["questionnaireScores"] = json!({"Cumulative": 40.0});
    transport.push_response(200, json!({"updated": true, "client": refreshed}));

    let api = ClientApi::new(scripted_gateway(transport));
    let check = api.check_responses(&ClientId::new("c1")).await.unwrap();
    assert!(check.updated);
    let client = check.client.unwrap();
    assert_eq!(
        client.questionnaire_scores.unwrap().get("Cumulative"),
        Some(40.0)
    );
}

#[tokio::test]
async fn upload_validation_rejects_before_any_request() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut api = AnalysisApi::new(scripted_gateway(Arc::clone(&transport)));

    let err = api
        .analyze_sample("sample.gif", vec![0u8; 1024])
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = api
        .analyze_sample("sample.png", vec![0u8; 6 * 1024 * 1024])
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn upload_decodes_scores_and_uses_the_long_deadline() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(
        200,
        json!({"status": "success", "script_scores": {"Cumulative": 72.5, "Analytical": 41.0}}),
    );

    let mut api = AnalysisApi::new(scripted_gateway(Arc::clone(&transport)));
    let scores = api
        .analyze_sample("sample.jpg", vec![0u8; 2048])
        .await
        .unwrap();
    assert_eq!(scores.get("Cumulative"), Some(72.5));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.url.ends_with("/upload"));
    assert!(request.bearer.is_none());
    assert_eq!(
        request.timeout,
        Some(std::time::Duration::from_secs(120))
    );
    assert_eq!(request.file.as_ref().unwrap().field, "file");
}

#[tokio::test]
async fn upload_surfaces_the_service_rejection_message() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(200, json!({"status": "error", "error": "image unreadable"}));

    let mut api = AnalysisApi::new(scripted_gateway(transport));
    let err = api
        .analyze_sample("sample.jpg", vec![0u8; 2048])
        .await
        .unwrap_err();
    match err {
        ApiError::Http { message, .. } => assert_eq!(message, "image unreadable"),
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_timeout_is_reported_as_abandoned() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_error(TransportError::Timeout);

    let mut api = AnalysisApi::new(scripted_gateway(transport));
    let err = api
        .analyze_sample("sample.jpg", vec![0u8; 2048])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}
