// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - POST /analyze (success + error statuses)
// - GET  /templates, POST /templates/render
// - GET  /kb/search, /kb/stats
// - POST /report/html
// - GET  /debug/history

use serde_json::{json, Value as Json};
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use contract_risk_analyzer::api::{self, AppState};
use contract_risk_analyzer::config::AppConfig;

const BODY_LIMIT: usize = 4 * 1024 * 1024;

const CONTRACT: &str = "SERVICE AGREEMENT between Acme Pvt. Ltd. and Zen Works LLP.\n\
    1. FEES Client shall pay Rs. 50,000 per month within 30 days of invoice.\n\
    2. TERMINATION Client may terminate at will at its sole discretion without cause.\n\
    3. DISPUTES All disputes shall be referred to arbitration; courts in Pune shall have jurisdiction.";

/// Build the same Router the binary uses, with audit writes off so tests do
/// not leave files behind.
fn test_router() -> Router {
    let mut config = AppConfig::default();
    config.audit.enabled = false;
    api::create_router(AppState::from_config(config))
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

async fn read_json(resp: Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_analyze_returns_expected_json_fields() {
    let app = test_router();

    let payload = json!({ "text": CONTRACT });
    let resp = app
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert!(
        resp.status().is_success(),
        "POST /analyze should be 2xx, got {}",
        resp.status()
    );

    let v = read_json(resp).await;

    // Contract checks for UI consumers
    assert!(v.get("score").is_some(), "missing 'score'");
    assert!(v.get("findings").is_some(), "missing 'findings'");
    assert!(v.get("clauses").is_some(), "missing 'clauses'");
    assert!(v.get("entities").is_some(), "missing 'entities'");
    assert!(v.get("unfavorable_terms").is_some(), "missing 'unfavorable_terms'");
    assert!(v.get("compliance").is_some(), "missing 'compliance'");
    assert!(v.get("ai").is_some(), "missing 'ai'");

    let composite = v["score"]["composite"].as_u64().expect("composite");
    assert!(composite > 0 && composite <= 100);
    assert!(v["score"]["band"].is_string());
    assert_eq!(v["ai"]["used"], Json::Bool(false));
}

#[tokio::test]
async fn api_analyze_rejects_empty_and_fragmentary_text() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &json!({ "text": "   " })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = read_json(resp).await;
    assert!(v["error"].as_str().unwrap().contains("empty"));

    let resp = app
        .oneshot(post_json("/analyze", &json!({ "text": "Hi. Ok. Yes." })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = read_json(resp).await;
    assert!(v["error"].as_str().unwrap().contains("no clauses"));
}

#[tokio::test]
async fn api_explain_clause_reports_risk() {
    let app = test_router();

    let payload = json!({
        "text": "Client may terminate this Agreement at its sole discretion."
    });
    let resp = app
        .oneshot(post_json("/clauses/explain", &payload))
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let v = read_json(resp).await;
    assert_eq!(v["risk"]["level"], "high");
    assert!(v["risk"]["findings"].as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn api_templates_list_and_render() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/templates")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    let v = read_json(resp).await;
    let kinds: Vec<&str> = v.as_array().unwrap().iter().map(|k| k.as_str().unwrap()).collect();
    assert!(kinds.contains(&"nda"));

    let payload = json!({
        "kind": "nda",
        "params": { "parties": { "party1": "Acme Pvt Ltd" } }
    });
    let resp = app
        .clone()
        .oneshot(post_json("/templates/render", &payload))
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let v = read_json(resp).await;
    let body = v["body"].as_str().unwrap();
    assert!(body.contains("Acme Pvt Ltd"));
    assert!(body.contains("MUTUAL NDA"));

    let resp = app
        .oneshot(post_json("/templates/render", &json!({ "kind": "ransom-note" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_kb_search_and_stats() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/kb/search?q=indemnity")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    let v = read_json(resp).await;
    assert!(!v.as_array().unwrap().is_empty());

    // Stats reflect analyses performed through the same state.
    let _ = app
        .clone()
        .oneshot(post_json("/analyze", &json!({ "text": CONTRACT })))
        .await
        .unwrap();
    let req = Request::builder()
        .method("GET")
        .uri("/kb/stats")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let v = read_json(resp).await;
    assert_eq!(v["total_analyses"], 1);
    assert!(v["average_score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn api_report_html_round_trip() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &json!({ "text": CONTRACT })))
        .await
        .unwrap();
    let analysis = read_json(resp).await;

    let resp = app
        .oneshot(post_json("/report/html", &analysis))
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/html"), "got {content_type}");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .unwrap()
        .to_vec();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Contract Analysis Report"));
    assert!(html.contains("Unilateral Termination"));
}

#[tokio::test]
async fn api_debug_history_records_analyses() {
    let app = test_router();

    let _ = app
        .clone()
        .oneshot(post_json("/analyze", &json!({ "text": CONTRACT })))
        .await
        .unwrap();

    let req = Request::builder()
        .method("GET")
        .uri("/debug/history")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let v = read_json(resp).await;
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["risk_score"].as_u64().unwrap() > 0);
    assert!(rows[0]["ts_unix"].as_u64().is_some());
}
