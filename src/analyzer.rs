//! Analysis orchestrator: ingest → extract → score → advise.
//!
//! Sequential per document; each request gets its own result set and nothing
//! is shared across requests except the hot-reloaded rule table, the advisor
//! client, and the knowledge-base statistics.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::advisor::{Advisor, Classification};
use crate::config::AppConfig;
use crate::extract::{
    check_compliance, detect_ambiguity, extract_clauses, extract_entities, Ambiguity, Clause,
    Compliance, Entities,
};
use crate::ingest::{self, IngestError, Language};
use crate::kb::KnowledgeBase;
use crate::risk::{
    self, assess_clause, breakdown, scan_unfavorable, ClauseRisk, ContractScore,
    FindingBreakdown, HotReloadRuleTable, RiskError, RiskFinding, UnfavorableTerm,
};

const CRITICAL_CLAUSE_LIMIT: usize = 5;
const AMBIGUOUS_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Risk(#[from] RiskError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub language: Language,
    pub char_count: usize,
    pub word_count: usize,
    pub clause_count: usize,
    pub elapsed_ms: u64,
    pub analyzed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbiguousClause {
    pub clause_id: u32,
    pub excerpt: String,
    pub ambiguity: Ambiguity,
}

/// Advisory section of a result; present but empty when AI is off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiSection {
    pub used: bool,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
}

/// Everything the UI needs for one analyzed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: Metadata,
    pub clauses: Vec<Clause>,
    pub entities: Entities,
    pub findings: Vec<RiskFinding>,
    pub score: ContractScore,
    pub breakdown: FindingBreakdown,
    pub critical_clauses: Vec<ClauseRisk>,
    pub unfavorable_terms: Vec<UnfavorableTerm>,
    pub ambiguous_clauses: Vec<AmbiguousClause>,
    pub compliance: Compliance,
    pub ai: AiSection,
}

/// Per-clause deep dive returned by the explain endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ClauseExplanation {
    pub risk: ClauseRisk,
    pub ambiguity: Ambiguity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub alternatives: Vec<String>,
}

pub struct ContractAnalyzer {
    max_chars: usize,
    min_clause_chars: usize,
    ai_enabled: bool,
    rules: HotReloadRuleTable,
    advisor: Advisor,
    kb: Arc<KnowledgeBase>,
}

impl ContractAnalyzer {
    pub fn new(config: &AppConfig, kb: Arc<KnowledgeBase>) -> Self {
        Self {
            max_chars: config.limits.max_chars,
            min_clause_chars: config.limits.min_clause_chars,
            ai_enabled: config.ai.enabled,
            rules: HotReloadRuleTable::new(None),
            advisor: Advisor::from_config(&config.ai),
            kb,
        }
    }

    /// Band thresholds of the current rule table (for startup diagnostics).
    pub fn bands(&self) -> risk::BandThresholds {
        self.rules.current().bands
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    /// Full analysis pass over raw contract text.
    pub async fn analyze(&self, raw: &str, use_ai: bool) -> Result<AnalysisResult, AnalyzeError> {
        let started = Instant::now();
        let use_ai = use_ai && self.ai_enabled;

        let doc = ingest::prepare(raw, self.max_chars)?;

        // Devanagari documents go through the advisor for translation when AI
        // is on; otherwise the original text is analyzed as-is.
        let mut text = doc.text.clone();
        if use_ai && doc.language != Language::En {
            match self.advisor.translate_to_english(&text).await {
                Some(translated) => text = translated,
                None => warn!("translation unavailable, analyzing original text"),
            }
        }

        let clauses = extract_clauses(&text, self.min_clause_chars);
        let table = self.rules.current();
        let (findings, score) = risk::evaluate(&clauses, &table)?;

        let entities = extract_entities(&text);
        let unfavorable_terms = scan_unfavorable(&clauses);
        let compliance = check_compliance(&text);

        let ambiguous_clauses: Vec<AmbiguousClause> = clauses
            .iter()
            .filter_map(|c| {
                let ambiguity = detect_ambiguity(&c.text);
                ambiguity.is_ambiguous.then(|| AmbiguousClause {
                    clause_id: c.id,
                    excerpt: excerpt(&c.text),
                    ambiguity,
                })
            })
            .collect();

        let critical_clauses = critical_clauses(&clauses, &table);

        let ai = if use_ai {
            let contract_type = self.advisor.classify(&text).await;
            let summary = self.advisor.summarize(&text, &entities, score.band).await;
            AiSection {
                used: contract_type.is_some() || summary.is_some(),
                provider: self.advisor.provider_name().to_string(),
                contract_type,
                summary,
            }
        } else {
            AiSection {
                provider: self.advisor.provider_name().to_string(),
                ..AiSection::default()
            }
        };

        self.kb.record(&score, &findings);
        let finding_breakdown = breakdown(&findings);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(
            score = score.composite,
            clauses = clauses.len(),
            findings = findings.len(),
            elapsed_ms,
            "analysis complete"
        );

        Ok(AnalysisResult {
            metadata: Metadata {
                language: doc.language,
                char_count: doc.char_count,
                word_count: doc.word_count,
                clause_count: clauses.len(),
                elapsed_ms,
                analyzed_at: chrono::Utc::now().to_rfc3339(),
            },
            clauses,
            entities,
            findings,
            score,
            breakdown: finding_breakdown,
            critical_clauses,
            unfavorable_terms,
            ambiguous_clauses,
            compliance,
            ai,
        })
    }

    /// Deep dive on a single clause fragment: rule findings, ambiguity, and
    /// (AI on) a plain-language explanation plus alternative wording for the
    /// most severe finding.
    pub async fn explain_clause(&self, text: &str, context: &str) -> ClauseExplanation {
        let clause = Clause::from_fragment(1, text);
        let table = self.rules.current();
        let risk = assess_clause(&clause, &table);
        let ambiguity = detect_ambiguity(text);

        let mut explanation = None;
        let mut alternatives = Vec::new();
        if self.ai_enabled {
            explanation = self.advisor.explain_clause(text, context).await;
            if let Some(worst) = risk
                .findings
                .iter()
                .max_by_key(|f| (f.severity, f.weight))
            {
                alternatives = self.advisor.suggest_alternatives(text, worst.category).await;
            }
        }

        ClauseExplanation {
            risk,
            ambiguity,
            explanation,
            alternatives,
        }
    }
}

/// Top clauses by weight among those that assess High.
fn critical_clauses(clauses: &[Clause], table: &risk::RuleTable) -> Vec<ClauseRisk> {
    let mut assessed: Vec<ClauseRisk> = clauses
        .iter()
        .map(|c| assess_clause(c, table))
        .filter(|cr| cr.level == risk::Severity::High)
        .collect();
    assessed.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.clause_id.cmp(&b.clause_id)));
    assessed.truncate(CRITICAL_CLAUSE_LIMIT);
    assessed
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= AMBIGUOUS_EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(AMBIGUOUS_EXCERPT_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn analyzer() -> ContractAnalyzer {
        ContractAnalyzer::new(&AppConfig::default(), Arc::new(KnowledgeBase::new()))
    }

    const CONTRACT: &str = "SERVICE AGREEMENT between Acme Pvt. Ltd. and Zen Works LLP.\n\
        1. FEES Client shall pay Rs. 50,000 per month within 30 days of invoice.\n\
        2. TERMINATION Client may terminate at will at its sole discretion without cause.\n\
        3. DISPUTES All disputes shall be referred to arbitration; courts in Pune shall have jurisdiction.\n\
        4. RENEWAL This Agreement shall automatically renew for successive one year terms.";

    #[tokio::test]
    async fn full_pass_produces_coherent_result() {
        let result = analyzer().analyze(CONTRACT, false).await.unwrap();

        assert_eq!(result.metadata.clause_count, result.clauses.len());
        assert!(result.score.composite > 0);
        assert!(result.score.composite <= 100);
        assert!(!result.findings.is_empty());
        assert!(result.findings.iter().all(|f| f.clause_id >= 1));
        assert!(!result.ai.used);
        assert_eq!(result.ai.provider, "disabled");

        // The sole-discretion termination clause must surface as critical.
        assert!(!result.critical_clauses.is_empty());
        assert!(result
            .unfavorable_terms
            .iter()
            .any(|u| u.label == "One-Sided Termination"));
    }

    #[tokio::test]
    async fn empty_document_fails_with_ingest_error() {
        let err = analyzer().analyze("   ", false).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Ingest(IngestError::Empty)));
    }

    #[tokio::test]
    async fn fragmentary_document_fails_with_empty_clause_set() {
        let err = analyzer().analyze("Hi. Ok. Yes.", false).await.unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::Risk(RiskError::EmptyClauseSet)
        ));
    }

    #[tokio::test]
    async fn analysis_is_idempotent() {
        let a = analyzer();
        let first = a.analyze(CONTRACT, false).await.unwrap();
        let second = a.analyze(CONTRACT, false).await.unwrap();
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.score, second.score);
    }

    #[tokio::test]
    async fn explain_clause_reports_findings_without_ai() {
        let e = analyzer()
            .explain_clause(
                "Client may terminate at its sole discretion with best efforts notice.",
                "",
            )
            .await;
        assert_eq!(e.risk.level, risk::Severity::High);
        assert!(e.ambiguity.is_ambiguous);
        assert!(e.explanation.is_none());
        assert!(e.alternatives.is_empty());
    }
}
