//! Helpers for driving a full sync against a mock CRM

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use dealsync::core::FieldMapping;
use dealsync::services::{CsvDealSource, PipedriveClient};
use dealsync::{DealSync, SyncOptions, SyncReport};
use serde_json::Value;
use shared::RunId;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "integration-token";

/// Serve `body` as the deal listing
pub async fn mount_listing(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn crm_for(server: &MockServer) -> PipedriveClient {
    PipedriveClient::new(&format!("{}/api/v1", server.uri()), TOKEN, Some(Duration::from_secs(5)))
        .expect("mock server URL should be valid")
}

/// Run a sync of the export file at `input` against `server`
pub async fn run_sync(server: &MockServer, input: &Path, options: SyncOptions) -> SyncReport {
    let source = CsvDealSource::new(input, FieldMapping::export());
    DealSync::new(RunId::new(), source, crm_for(server), options)
        .run()
        .await
        .expect("sync run should complete")
}

/// Bodies of every POST the server received, in arrival order
pub async fn posted_titles(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.to_string() == "POST")
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|body| body.get("title").and_then(Value::as_str).map(str::to_string))
        .collect()
}
