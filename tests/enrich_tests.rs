//! Enrichment lookups against a mocked search backend.

use prospect::EnrichmentClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn search_results_land_in_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "serper-key"))
        .and(body_partial_json(json!({ "q": "jane@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [{ "title": "Jane Roe | Acme Corp", "link": "https://acme.example" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EnrichmentClient::new("serper-key").with_search_base(server.uri());
    let report = client.gather(Some("jane@example.com"), None).await;
    assert!(!report.is_empty());
    assert_eq!(report.serper["organic"][0]["title"], "Jane Roe | Acme Corp");
}

#[tokio::test]
async fn linkedin_is_the_fallback_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "q": "https://linkedin.com/in/janeroe" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EnrichmentClient::new("serper-key").with_search_base(server.uri());
    let report = client
        .gather(None, Some("https://linkedin.com/in/janeroe"))
        .await;
    assert!(!report.is_empty());
}

#[tokio::test]
async fn backend_failure_degrades_to_an_empty_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&server)
        .await;

    let client = EnrichmentClient::new("bad-key").with_search_base(server.uri());
    let report = client.gather(Some("jane@example.com"), None).await;
    assert!(report.is_empty());
}
