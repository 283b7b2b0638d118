//! Tests for PipedriveClient against a mock HTTP server

use std::time::Duration;

use serde_json::json;
use shared::{Deal, RemoteDealSummary};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::SyncError;
use crate::services::pipedrive_client::PipedriveClient;
use crate::traits::CrmClient;
use crate::types::PushOutcome;

fn client_for(server: &MockServer) -> PipedriveClient {
    PipedriveClient::new(&format!("{}/api/v1", server.uri()), "secret-token", Some(Duration::from_secs(5))).unwrap()
}

fn page(data: serde_json::Value, more: bool, next_start: Option<u64>) -> serde_json::Value {
    json!({
        "success": true,
        "data": data,
        "additional_data": {
            "pagination": {
                "start": 0,
                "limit": 2,
                "more_items_in_collection": more,
                "next_start": next_start
            }
        }
    })
}

#[test]
fn test_deals_url_keeps_api_prefix() {
    let with_slash = PipedriveClient::new("https://acme.pipedrive.com/api/v1/", "t", None).unwrap();
    let without_slash = PipedriveClient::new("https://acme.pipedrive.com/api/v1", "t", None).unwrap();
    assert_eq!(with_slash.deals_url().as_str(), "https://acme.pipedrive.com/api/v1/deals");
    assert_eq!(without_slash.deals_url().as_str(), "https://acme.pipedrive.com/api/v1/deals");
}

#[test]
fn test_invalid_base_url_is_config_error() {
    let result = PipedriveClient::new("not a url", "t", None);
    assert!(matches!(result, Err(SyncError::Config { .. })));
}

#[tokio::test]
async fn test_list_deals_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .and(query_param("api_token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 1, "title": "Acme", "value": 100, "currency": "EUR", "status": "open" },
                { "id": 2, "title": "Globex", "value": 20.5, "currency": "EUR", "status": "won" }
            ]),
            false,
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let deals = client_for(&server).list_deals().await.unwrap();
    assert_eq!(
        deals,
        vec![RemoteDealSummary::new("Acme", 100.0), RemoteDealSummary::new("Globex", 20.5)]
    );
}

#[tokio::test]
async fn test_list_deals_follows_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "title": "A", "value": 1 }, { "title": "B", "value": 2 }]),
            true,
            Some(2),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([{ "title": "C", "value": 3 }]), false, None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_page_limit(2);
    let titles: Vec<_> = client.list_deals().await.unwrap().into_iter().map(|d| d.title).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_list_deals_null_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": null })))
        .mount(&server)
        .await;

    assert!(client_for(&server).list_deals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_listing_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(client_for(&server).list_deals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsuccessful_envelope_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false, "error": "nope" })))
        .mount(&server)
        .await;

    assert!(client_for(&server).list_deals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_http_error_is_fatal_and_hides_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).list_deals().await.unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));
    assert!(!err.to_string().contains("secret-token"));
}

#[tokio::test]
async fn test_push_deal_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/deals"))
        .and(query_param("api_token", "secret-token"))
        .and(body_json(json!({ "title": "Acme", "currency": "EUR", "value": 100.0, "status": "open" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).push_deal(&Deal::new("Acme", "EUR", 100.0, "open")).await;
    assert_eq!(outcome, PushOutcome::Succeeded);
}

#[tokio::test]
async fn test_push_deal_only_200_counts_as_success() {
    for status in [201u16, 400, 429, 500] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/deals"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let outcome = client_for(&server).push_deal(&Deal::new("Acme", "EUR", 1.0, "open")).await;
        assert_eq!(outcome, PushOutcome::Rejected { status });
    }
}

#[tokio::test]
async fn test_push_deal_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = PipedriveClient::new(
        &format!("{}/api/v1", server.uri()),
        "secret-token",
        Some(Duration::from_millis(50)),
    )
    .unwrap();

    match client.push_deal(&Deal::new("Acme", "EUR", 1.0, "open")).await {
        PushOutcome::Transport { message } => assert!(!message.contains("secret-token")),
        other => panic!("expected transport failure, got {other:?}"),
    }
}
