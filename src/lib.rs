// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod advisor;
pub mod analyzer;
pub mod api;
pub mod audit;
pub mod config;
pub mod extract;
pub mod history;
pub mod ingest;
pub mod kb;
pub mod metrics;
pub mod report;
pub mod risk;
pub mod templates;

// ---- Re-exports for stable public API ----
pub use crate::analyzer::{AnalysisResult, AnalyzeError, ContractAnalyzer};
pub use crate::api::{create_router, AppState};
pub use crate::risk::{
    evaluate, ContractScore, RiskBand, RiskCategory, RiskError, RiskFinding, Severity,
};

use tracing::info;

/// One-off smoke test of the configured AI provider (call after tracing
/// init). Never panics on failure; it just logs the result.
pub async fn run_ai_quick_probe() -> anyhow::Result<()> {
    let cfg = config::AppConfig::load()?;
    if !cfg.ai.enabled {
        info!("AI quick probe skipped: AI is disabled in config");
        return Ok(());
    }
    let advisor = advisor::Advisor::from_config(&cfg.ai);
    let sample =
        "Either party may terminate this Agreement at its sole discretion without notice.";
    let out = advisor.classify(sample).await;
    info!(provider = advisor.provider_name(), "AI quick probe => {:?}", out);
    Ok(())
}
