//! End-to-end runs of the query pipeline through `AgentRuntime`.
//!
//! Each test builds a runtime over an in-memory catalog and checks the terminal response:
//! - a grounded analytics answer over a synthetic thousand-title catalog
//! - input errors that never reach classification
//! - content-safety rejection for a kids audience
//! - an unloaded catalog
//! - a judge that outlives the reasoning timeout

use std::sync::Arc;
use std::time::Duration;

use marquee_agent::providers::ScriptedClient;
use marquee_agent::AgentRuntime;
use marquee_core::dataset::{sample_table, Catalog, DatasetSource, Table, Title, TitleKind};
use marquee_core::domain::{Audience, Category, GuardrailKind, QueryContext, Response};

fn title(idx: usize, country: &str) -> Title {
    Title {
        show_id: format!("s{idx}"),
        kind: if idx % 3 == 0 { TitleKind::TvShow } else { TitleKind::Movie },
        title: format!("Catalog Title {idx}"),
        director: "Unknown Director".to_owned(),
        cast: "Unknown Cast".to_owned(),
        country: country.to_owned(),
        date_added: "Unknown Date".to_owned(),
        release_year: 2012 + (idx % 10) as i32,
        rating: "TV-14".to_owned(),
        duration: "95 min".to_owned(),
        listed_in: "Dramas".to_owned(),
        description: "No description available".to_owned(),
    }
}

fn thousand_titles() -> Catalog {
    let titles = (0..1000)
        .map(|idx| title(idx, if idx < 200 { "South Korea" } else { "United States" }))
        .collect();
    Catalog::from_table(Table::new(titles, DatasetSource::Sample))
}

#[tokio::test]
async fn korean_share_is_answered_from_the_catalog() {
    let runtime = AgentRuntime::builder(thousand_titles()).build().expect("runtime");

    let response = runtime
        .handle("What percentage of Korean content is in the catalog?", QueryContext::default())
        .await;

    match &response {
        Response::Success { category, evidence, verdicts, .. } => {
            assert_eq!(*category, Category::Analytics);
            assert_eq!(evidence.percentage("percentage"), Some(20.0));
            assert_eq!(evidence.count("matching_titles"), Some(200));
            assert_eq!(verdicts.len(), 4);
            assert!(verdicts.iter().all(|verdict| verdict.passed));
        }
        other => panic!("expected success, got {}", other.to_json()),
    }
    assert_eq!(runtime.stats().accepted, 1);
}

#[tokio::test]
async fn blank_queries_are_input_errors() {
    let runtime = AgentRuntime::builder(thousand_titles()).build().expect("runtime");

    for text in ["", " \t\n "] {
        let response = runtime.handle(text, QueryContext::default()).await;
        assert_eq!(response, Response::error(None, "empty query"));
    }
    assert_eq!(runtime.stats().errored, 2);
}

#[tokio::test]
async fn mature_title_for_kids_is_rejected_by_content_safety() {
    let runtime =
        AgentRuntime::builder(Catalog::from_table(sample_table())).build().expect("runtime");

    let response = runtime
        .handle("Is Squid Game good for my kids?", QueryContext::for_audience(Audience::Kids))
        .await;

    match &response {
        Response::Rejected { reason, failed_checks, verdicts, .. } => {
            assert!(failed_checks.contains(&GuardrailKind::ContentSafety));
            assert!(reason.contains("content-safety"), "{reason}");
            let safety = verdicts
                .iter()
                .find(|verdict| verdict.kind == GuardrailKind::ContentSafety)
                .expect("content-safety verdict");
            assert!(safety.score < 0.8);
        }
        other => panic!("expected rejection, got {}", other.to_json()),
    }
    assert_eq!(runtime.stats().rejected, 1);
}

#[tokio::test]
async fn unloaded_catalog_answers_every_query_with_dataset_unavailable() {
    let runtime = AgentRuntime::builder(Catalog::Unavailable("file not found".to_owned()))
        .build()
        .expect("runtime");

    for text in ["How many movies are there?", "How do I reset my password?"] {
        let response = runtime.handle(text, QueryContext::default()).await;
        assert_eq!(response.status(), "error");
        assert_eq!(response.reason(), Some("dataset unavailable"));
    }
}

#[tokio::test]
async fn slow_judge_becomes_a_failed_verdict_not_an_error() {
    let client = ScriptedClient::new()
        .reply_when("Pick exactly one category", "analytics")
        .reply_when("Rewrite the draft", "n/a")
        .hang_when("quality assurance judge")
        .with_default_reply("SAFE GOOD SOUND FAIR");
    let runtime = AgentRuntime::builder(thousand_titles())
        .client(Arc::new(client))
        .response_timeout(Duration::from_millis(50))
        .build()
        .expect("runtime");

    let response = runtime
        .handle("What percentage of Korean content is in the catalog?", QueryContext::default())
        .await;

    match &response {
        Response::Rejected { failed_checks, verdicts, .. } => {
            assert_eq!(failed_checks, &vec![GuardrailKind::Quality]);
            assert_eq!(verdicts.len(), 4);
            let quality = verdicts
                .iter()
                .find(|verdict| verdict.kind == GuardrailKind::Quality)
                .expect("quality verdict");
            assert_eq!(quality.score, 0.0);
            assert!(quality.reason.contains("timed out"), "{}", quality.reason);
        }
        other => panic!("expected rejection, got {}", other.to_json()),
    }
    assert_eq!(runtime.stats().errored, 0);
}
