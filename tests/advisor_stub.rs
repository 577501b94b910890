// tests/advisor_stub.rs
//
// Advisor plumbing without real network calls: mock mode, disabled mode,
// caching, and the daily limit.

use serial_test::serial;
use std::path::PathBuf;

use contract_risk_analyzer::advisor::{
    build_client, Advisor, AiClient, CachingClient, MockProvider, Provider,
};
use contract_risk_analyzer::config::AiConfig;
use contract_risk_analyzer::risk::RiskCategory;

fn unique_cache_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("advisor_test_{tag}_{nanos}"));
    dir
}

fn mock(fixed: &str) -> MockProvider {
    MockProvider {
        fixed: fixed.to_string(),
    }
}

#[tokio::test]
#[serial]
async fn mock_mode_overrides_disabled_config() {
    std::env::set_var("AI_TEST_MODE", "mock");
    let config = AiConfig {
        enabled: false,
        cache_dir: unique_cache_dir("mockmode").to_string_lossy().into_owned(),
        ..AiConfig::default()
    };
    let client = build_client(&config);
    std::env::remove_var("AI_TEST_MODE");

    assert_eq!(client.provider_name(), "mock");
    let out = client.complete("anything").await;
    assert_eq!(out.as_deref(), Some("Mock advisory response."));
}

#[tokio::test]
#[serial]
async fn disabled_config_builds_disabled_client() {
    std::env::remove_var("AI_TEST_MODE");
    let client = build_client(&AiConfig::default());
    assert_eq!(client.provider_name(), "disabled");
    assert_eq!(client.complete("anything").await, None);
}

#[tokio::test]
async fn cache_serves_repeat_prompts_without_provider_calls() {
    let dir = unique_cache_dir("cache");

    let first = CachingClient::new(mock("first answer"), dir.clone(), 10);
    assert_eq!(
        first.complete("same prompt").await.as_deref(),
        Some("first answer")
    );

    // A fresh client over the same cache dir would answer differently if the
    // provider were consulted; the cached response must win.
    let second = CachingClient::new(mock("second answer"), dir.clone(), 10);
    assert_eq!(
        second.complete("same prompt").await.as_deref(),
        Some("first answer")
    );
    assert_eq!(
        second.complete("other prompt").await.as_deref(),
        Some("second answer")
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn daily_limit_zero_blocks_all_calls() {
    let dir = unique_cache_dir("limit");
    let client = CachingClient::new(mock("never seen"), dir.clone(), 0);
    assert_eq!(client.complete("prompt").await, None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn advisor_alternatives_fall_back_to_raw_response() {
    let dir = unique_cache_dir("alts");
    let client = CachingClient::new(mock("Mock advisory response."), dir.clone(), 10);
    let advisor = Advisor::new(std::sync::Arc::new(client));

    let alts = advisor
        .suggest_alternatives("Client may terminate at will.", RiskCategory::UnilateralTermination)
        .await;
    assert_eq!(alts, vec!["Mock advisory response.".to_string()]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn advisor_parses_numbered_alternatives() {
    let dir = unique_cache_dir("numbered");
    let client = CachingClient::new(
        mock("Here are options:\n1. Mutual termination with 60 days notice.\n2. Termination for cause only."),
        dir.clone(),
        10,
    );
    let advisor = Advisor::new(std::sync::Arc::new(client));

    let alts = advisor
        .suggest_alternatives("Client may terminate at will.", RiskCategory::UnilateralTermination)
        .await;
    assert_eq!(alts.len(), 2);
    assert!(alts[0].starts_with("1."));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn mock_provider_reports_its_name() {
    assert_eq!(mock("x").name(), "mock");
}
