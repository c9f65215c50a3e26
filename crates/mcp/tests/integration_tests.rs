//! Integration tests for the Marquee MCP server
//!
//! These tests drive the tool bodies directly against the built-in sample catalog:
//! - query results and their response envelopes
//! - parameter validation
//! - dataset summaries at each depth
//! - behaviour when the catalog could not be loaded

use std::sync::Arc;

use marquee_agent::AgentRuntime;
use marquee_core::dataset::{sample_table, Catalog};
use serde_json::Value;

use marquee_mcp::{BusinessQueryInput, DatasetInfoInput, MarqueeMcpServer, TestQueryInput};

fn server_with(catalog: Catalog) -> MarqueeMcpServer {
    let runtime = AgentRuntime::builder(catalog).build().expect("runtime");
    MarqueeMcpServer::new(Arc::new(runtime), 4)
}

fn sample_server() -> MarqueeMcpServer {
    server_with(Catalog::from_table(sample_table()))
}

fn question(text: &str) -> BusinessQueryInput {
    BusinessQueryInput { natural_language_query: text.to_owned(), audience: None, locale: None }
}

#[tokio::test]
async fn business_query_returns_a_success_envelope() {
    let server = sample_server();

    let value = server
        .business_query_json(question("What are the most popular genres?"))
        .await
        .expect("tool result");

    assert_eq!(value["status"], "success");
    assert_eq!(value["category"], "analytics");
    assert!(value["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(value["verdicts"].as_array().map(Vec::len), Some(4));
    let genres = value["evidence"]["top_genres"].as_array().expect("ranked genres");
    assert!(genres.iter().all(|entry| entry["name"].is_string() && entry["count"].is_u64()));
}

#[tokio::test]
async fn empty_query_is_an_error_response_not_a_protocol_error() {
    let server = sample_server();

    let value = server.business_query_json(question("")).await.expect("tool result");

    assert_eq!(value["status"], "error");
    assert_eq!(value["reason"], "empty query");
    assert!(value.get("request_id").is_none());
}

#[tokio::test]
async fn unknown_audience_is_rejected_as_invalid_params() {
    let server = sample_server();
    let input = BusinessQueryInput {
        audience: Some("elders".to_owned()),
        ..question("Recommend a comedy")
    };

    let error = server.business_query_json(input).await.expect_err("invalid audience");

    assert_eq!(error.error_code(), -32602);
    assert_eq!(server.runtime().stats().requests_served, 0);
}

#[tokio::test]
async fn unsafe_request_for_kids_is_rejected_by_content_safety() {
    let server = sample_server();
    let input = BusinessQueryInput {
        audience: Some("kids".to_owned()),
        ..question("Is Squid Game good for my kids?")
    };

    let value = server.business_query_json(input).await.expect("tool result");

    assert_eq!(value["status"], "rejected");
    let failed = value["failed_checks"].as_array().expect("failed checks");
    assert!(failed.iter().any(|kind| kind == "content_safety"), "{value}");
    assert!(value["reason"].as_str().is_some_and(|reason| reason.contains("content-safety")));
}

#[tokio::test]
async fn unavailable_dataset_yields_dataset_unavailable_everywhere() {
    let server = server_with(Catalog::Unavailable("file not found".to_owned()));

    let query = server
        .business_query_json(question("How many movies are in the catalog?"))
        .await
        .expect("tool result");
    let info = server.dataset_info_json(DatasetInfoInput::default()).expect("tool result");

    assert_eq!(query["status"], "error");
    assert_eq!(query["reason"], "dataset unavailable");
    assert_eq!(info["status"], "error");
    assert_eq!(info["reason"], "dataset unavailable");
    let status = server.test_query_json(TestQueryInput::default());
    assert_eq!(status["server_info"]["dataset_loaded"], false);
}

#[test]
fn dataset_info_depth_grows_with_detail_level() {
    let server = sample_server();
    let level = |name: &str| {
        server
            .dataset_info_json(DatasetInfoInput { detail_level: name.to_owned() })
            .expect("dataset info")
    };

    let basic = level("basic");
    assert_eq!(basic["row_count"], 200);
    assert_eq!(basic["summary"]["total_titles"], 200);
    assert!(basic["summary"].get("top_countries").is_none());

    let detailed = level("detailed");
    let countries = detailed["summary"]["top_countries"].as_array().expect("ranked countries");
    assert_eq!(countries[0]["name"], "United States");
    let counts: Vec<u64> = countries.iter().filter_map(|entry| entry["count"].as_u64()).collect();
    assert_eq!(counts.len(), countries.len());
    assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]), "{counts:?}");
    assert!(detailed["summary"].get("missing_values").is_none());

    let full = level("full");
    assert!(full["summary"]["missing_values"].is_object());
    assert!(full["summary"]["international_percentage"].is_number());
}

#[tokio::test]
async fn test_query_reports_counters_after_traffic() {
    let server = sample_server();
    server.business_query_json(question("")).await.expect("tool result");
    server
        .business_query_json(question("Which countries produce the most titles?"))
        .await
        .expect("tool result");

    let value = server.test_query_json(TestQueryInput { test_message: "ping".to_owned() });

    assert_eq!(value["echo"], "ping");
    assert_eq!(value["server_info"]["stats"]["requests_served"], 2);
    assert_eq!(value["server_info"]["stats"]["errored"], 1);
    assert_eq!(value["server_info"]["tools"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn concurrent_queries_share_the_limiter() {
    let server = sample_server();
    let questions = [
        "What are the most popular genres?",
        "Which countries produce the most titles?",
        "How many movies versus TV shows?",
        "How do I cancel my subscription?",
        "Recommend a comedy for family movie night",
        "Find Korean dramas",
    ];

    let results = ask_all(&server, &questions).await;

    assert!(results.iter().all(|value| value["status"] != "error"), "{results:?}");
    let status = server.test_query_json(TestQueryInput::default());
    assert_eq!(status["server_info"]["available_permits"], 4);
}

async fn ask_all(server: &MarqueeMcpServer, questions: &[&str]) -> Vec<Value> {
    let mut handles = Vec::new();
    for text in questions {
        let server = server.clone();
        let input = question(text);
        handles.push(tokio::spawn(async move { server.business_query_json(input).await }));
    }
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("join").expect("tool result"));
    }
    results
}
