use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::warn;

use crate::analyzer::{AnalysisResult, AnalyzeError, ClauseExplanation, ContractAnalyzer};
use crate::audit::{AuditEntry, AuditLog};
use crate::config::AppConfig;
use crate::history::{History, HistoryEntry};
use crate::ingest::IngestError;
use crate::kb::{KbStats, KnowledgeBase, SearchHit};
use crate::report;
use crate::risk::RiskError;
use crate::templates::{self, Guidelines, TemplateError, TemplateParams};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<ContractAnalyzer>,
    pub kb: Arc<KnowledgeBase>,
    pub history: Arc<History>,
    pub audit: Arc<AuditLog>,
}

impl AppState {
    /// Build the full state from config on disk (or defaults). Used by the
    /// binary and by HTTP-level tests.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::load()?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: AppConfig) -> Self {
        let kb = Arc::new(KnowledgeBase::new());
        let analyzer = Arc::new(ContractAnalyzer::new(&config, kb.clone()));
        let history = Arc::new(History::with_capacity(config.history.capacity));
        let audit = Arc::new(AuditLog::new(config.audit.enabled, &config.audit.dir));
        Self {
            config: Arc::new(config),
            analyzer,
            kb,
            history,
            audit,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/clauses/explain", post(explain_clause))
        .route("/templates", get(templates_list))
        .route("/templates/guidelines", get(templates_guidelines))
        .route("/templates/render", post(templates_render))
        .route("/kb/search", get(kb_search))
        .route("/kb/best-practices", get(kb_best_practices))
        .route("/kb/stats", get(kb_stats))
        .route("/report/html", post(report_html))
        .route("/debug/history", get(debug_history))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
    /// Opt out of the advisory pass even when AI is configured on.
    #[serde(default = "default_use_ai")]
    use_ai: bool,
}

fn default_use_ai() -> bool {
    true
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisResult>, (StatusCode, Json<ErrorBody>)> {
    let result = state
        .analyzer
        .analyze(&body.text, body.use_ai)
        .await
        .map_err(|e| match &e {
            AnalyzeError::Ingest(IngestError::Empty) => {
                error_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            AnalyzeError::Ingest(IngestError::TooLarge { .. }) => {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            AnalyzeError::Risk(RiskError::EmptyClauseSet) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AnalyzeError::Risk(RiskError::UnknownCategory(_)) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    counter!("contract_analyses_total").increment(1);
    counter!("contract_findings_total").increment(result.findings.len() as u64);

    state.history.push(&result);

    let entry = AuditEntry::analysis(
        &body.text,
        result.metadata.language,
        result.metadata.clause_count,
        result.findings.len(),
        result.score.composite,
        result.score.band,
        result.metadata.elapsed_ms,
    );
    if let Err(e) = state.audit.record(&entry) {
        warn!(error = %e, "audit log write failed");
    }

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
struct ExplainReq {
    text: String,
    #[serde(default)]
    context: String,
}

async fn explain_clause(
    State(state): State<AppState>,
    Json(body): Json<ExplainReq>,
) -> Result<Json<ClauseExplanation>, (StatusCode, Json<ErrorBody>)> {
    if body.text.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "clause text must not be empty",
        ));
    }
    let explanation = state
        .analyzer
        .explain_clause(body.text.trim(), body.context.trim())
        .await;
    Ok(Json(explanation))
}

async fn templates_list() -> Json<Vec<&'static str>> {
    Json(templates::TEMPLATE_TYPES.to_vec())
}

async fn templates_guidelines(Query(q): Query<HashMap<String, String>>) -> Json<Guidelines> {
    let kind = q.get("kind").map(String::as_str).unwrap_or("");
    Json(templates::guidelines(kind))
}

#[derive(serde::Deserialize)]
struct RenderReq {
    kind: String,
    #[serde(default)]
    params: TemplateParams,
}

#[derive(serde::Serialize)]
struct RenderedTemplate {
    kind: String,
    body: String,
}

async fn templates_render(
    Json(body): Json<RenderReq>,
) -> Result<Json<RenderedTemplate>, (StatusCode, Json<ErrorBody>)> {
    match templates::render(&body.kind, &body.params) {
        Ok(rendered) => Ok(Json(RenderedTemplate {
            kind: body.kind,
            body: rendered,
        })),
        Err(e @ TemplateError::Unknown(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e @ TemplateError::Unsupported(_)) => {
            Err(error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
    }
}

async fn kb_search(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<SearchHit>> {
    let query = q.get("q").map(String::as_str).unwrap_or("");
    Json(state.kb.search(query))
}

async fn kb_best_practices(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<String>> {
    let category = q.get("category").map(String::as_str).unwrap_or("general");
    Json(state.kb.best_practices(category))
}

async fn kb_stats(State(state): State<AppState>) -> Json<KbStats> {
    Json(state.kb.stats())
}

/// Render a previously returned analysis as a standalone HTML report.
async fn report_html(Json(analysis): Json<AnalysisResult>) -> Html<String> {
    Html(report::render_html(&analysis))
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(10))
}
