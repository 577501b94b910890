//! Risk scoring engine.
//!
//! Pure, testable logic mapping an ordered clause sequence to a set of
//! `RiskFinding`s and one `ContractScore`. No I/O and no side effects given a
//! rule table; deterministic and order-independent (findings are keyed by
//! (clause, category)).

pub mod rules;
pub mod scoring;
pub mod unfavorable;

pub use rules::{BandThresholds, CategoryRule, HotReloadRuleTable, RuleTable, SeverityWeights};
pub use scoring::{band_for, breakdown, composite_score, FindingBreakdown};
pub use unfavorable::{scan_unfavorable, UnfavorableTerm};

use crate::extract::Clause;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The eight fixed classes of contractual risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Penalty,
    Indemnity,
    UnilateralTermination,
    IpTransfer,
    NonCompete,
    LockIn,
    AutoRenewal,
    Arbitration,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 8] = [
        RiskCategory::Penalty,
        RiskCategory::Indemnity,
        RiskCategory::UnilateralTermination,
        RiskCategory::IpTransfer,
        RiskCategory::NonCompete,
        RiskCategory::LockIn,
        RiskCategory::AutoRenewal,
        RiskCategory::Arbitration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Penalty => "penalty",
            RiskCategory::Indemnity => "indemnity",
            RiskCategory::UnilateralTermination => "unilateral_termination",
            RiskCategory::IpTransfer => "ip_transfer",
            RiskCategory::NonCompete => "non_compete",
            RiskCategory::LockIn => "lock_in",
            RiskCategory::AutoRenewal => "auto_renewal",
            RiskCategory::Arbitration => "arbitration",
        }
    }

    /// Human-readable label for reports and the UI.
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Penalty => "Penalty",
            RiskCategory::Indemnity => "Indemnity",
            RiskCategory::UnilateralTermination => "Unilateral Termination",
            RiskCategory::IpTransfer => "IP Transfer",
            RiskCategory::NonCompete => "Non-Compete",
            RiskCategory::LockIn => "Lock-In",
            RiskCategory::AutoRenewal => "Auto-Renewal",
            RiskCategory::Arbitration => "Arbitration",
        }
    }

    pub fn parse(name: &str) -> Result<Self, RiskError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| RiskError::UnknownCategory(name.to_string()))
    }

    /// Stable position in [`Self::ALL`]; used to order findings.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).expect("category in ALL")
    }

    /// Negotiation pointer shown alongside findings of this category.
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskCategory::Penalty => {
                "Consider negotiating a cap on penalties or liquidated damages"
            }
            RiskCategory::Indemnity => "Request mutual indemnification or limit indemnity scope",
            RiskCategory::UnilateralTermination => {
                "Negotiate for mutual termination rights or require a notice period"
            }
            RiskCategory::IpTransfer => {
                "Clarify IP ownership and consider licensing instead of full transfer"
            }
            RiskCategory::NonCompete => "Limit non-compete scope, duration, and geographic area",
            RiskCategory::LockIn => "Negotiate a shorter lock-in period or early exit clauses",
            RiskCategory::AutoRenewal => "Request opt-in renewal instead of automatic renewal",
            RiskCategory::Arbitration => {
                "Ensure the arbitration venue is convenient and cost-effective"
            }
        }
    }
}

/// Per-finding severity. Ordering matters: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Document-level risk band derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiskError {
    /// No clauses supplied. Distinguishes "nothing to analyze" from
    /// "analyzed and found nothing".
    #[error("no clauses to evaluate")]
    EmptyClauseSet,
    /// A rule table named a category outside the fixed eight. Internal
    /// invariant violation, never user-recoverable.
    #[error("unknown risk category `{0}`")]
    UnknownCategory(String),
}

/// One (clause, category) match. Read-only to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub clause_id: u32,
    pub category: RiskCategory,
    pub severity: Severity,
    pub weight: u32,
    /// All trigger phrases of the category that matched in the clause.
    pub triggers: Vec<String>,
}

/// Aggregate over all findings for a document. Pure function of the finding
/// set; recomputed from scratch, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractScore {
    pub composite: u32,
    pub band: RiskBand,
}

/// Evaluate an ordered clause sequence against the rule table.
///
/// Findings come back sorted by (clause id, category), so permuting the input
/// yields an identical result. A clause with empty text is a no-op.
pub fn evaluate(
    clauses: &[Clause],
    table: &RuleTable,
) -> Result<(Vec<RiskFinding>, ContractScore), RiskError> {
    if clauses.is_empty() {
        return Err(RiskError::EmptyClauseSet);
    }

    let mut findings = Vec::new();
    for clause in clauses {
        findings.extend(clause_findings(clause, table));
    }
    findings.sort_by_key(|f| (f.clause_id, f.category.index()));

    let score = composite_score(&findings, &table.bands);
    Ok((findings, score))
}

/// Match a single clause against every category. Categories are independent:
/// one clause can produce up to eight findings.
pub fn clause_findings(clause: &Clause, table: &RuleTable) -> Vec<RiskFinding> {
    let text = normalize(&clause.text);
    if text.is_empty() {
        return Vec::new();
    }

    let escalated = table
        .escalation_terms
        .iter()
        .any(|t| contains_phrase(&text, t));

    let mut findings = Vec::new();
    for rule in table.rules() {
        let triggers: Vec<String> = rule
            .triggers
            .iter()
            .filter(|t| contains_phrase(&text, t))
            .cloned()
            .collect();
        if triggers.is_empty() {
            continue;
        }
        let severity = if escalated {
            Severity::High
        } else {
            rule.base_severity
        };
        findings.push(RiskFinding {
            clause_id: clause.id,
            category: rule.category,
            severity,
            weight: rule.weights.for_severity(severity),
            triggers,
        });
    }
    findings
}

/// Per-clause risk summary (for critical-clause listings and the explain
/// endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseRisk {
    pub clause_id: u32,
    pub level: Severity,
    pub weight: u32,
    pub findings: Vec<RiskFinding>,
    pub recommendations: Vec<String>,
}

/// Clause-level weight thresholds for the summary level: one High finding is
/// enough for High, one Medium finding for Medium.
const CLAUSE_HIGH_WEIGHT: u32 = 15;
const CLAUSE_MEDIUM_WEIGHT: u32 = 8;

pub fn assess_clause(clause: &Clause, table: &RuleTable) -> ClauseRisk {
    let findings = clause_findings(clause, table);
    let weight: u32 = findings.iter().map(|f| f.weight).sum();
    let level = if weight >= CLAUSE_HIGH_WEIGHT {
        Severity::High
    } else if weight >= CLAUSE_MEDIUM_WEIGHT {
        Severity::Medium
    } else {
        Severity::Low
    };
    let mut recommendations: Vec<String> = findings
        .iter()
        .map(|f| f.category.recommendation().to_string())
        .collect();
    recommendations.sort();
    recommendations.dedup();
    ClauseRisk {
        clause_id: clause.id,
        level,
        weight,
        findings,
        recommendations,
    }
}

/// Lowercase + collapsed whitespace, so trigger matching is insensitive to
/// case and spacing.
pub(crate) fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(lc);
            last_space = false;
        }
    }
    out.trim().to_string()
}

fn contains_phrase(normalized_text: &str, phrase: &str) -> bool {
    let p = normalize(phrase);
    if p.is_empty() {
        return true;
    }
    normalized_text.contains(p.as_str())
}
