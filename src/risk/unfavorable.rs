//! Unfavorable-term scan: regex patterns for one-sided wording that hurts the
//! smaller party, with plain-language explanations. Complements the category
//! scoring; every hit is treated as High severity.

use crate::extract::Clause;
use crate::risk::Severity;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const EXCERPT_CHARS: usize = 200;

struct Pattern {
    label: &'static str,
    re: Regex,
    explanation: &'static str,
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    let mk = |label, pattern: &str, explanation| Pattern {
        label,
        re: Regex::new(pattern).expect("unfavorable-term regex"),
        explanation,
    };
    vec![
        mk(
            "Unlimited Liability",
            r"(?is)unlimited liability|without limit",
            "This clause exposes you to potentially unlimited financial risk without a cap.",
        ),
        mk(
            "One-Sided Termination",
            r"(?is)(?:may|can)\s+terminate.*without.*(?:cause|notice|reason)",
            "The other party can end the contract without reason while you may not have the same right.",
        ),
        mk(
            "IP Assignment",
            r"(?is)assign.*all.*(?:intellectual property|IP|rights)",
            "You would transfer all intellectual property rights, losing ownership of your creations.",
        ),
        mk(
            "Exclusive Dealing",
            r"(?is)exclusive.*(?:right|dealing|arrangement)",
            "This restricts your ability to work with other clients or vendors.",
        ),
        mk(
            "Personal Guarantee",
            r"(?is)personal guarantee|personally liable",
            "You become personally liable, putting your personal assets at risk.",
        ),
        mk(
            "Waiver Of Rights",
            r"(?is)waive.*(?:all|any).*rights",
            "You give up important legal protections and rights.",
        ),
        mk(
            "Unilateral Changes",
            r"(?is)(?:may|can).*(?:modify|amend|change).*(?:unilaterally|at.*discretion)",
            "The other party can change terms without your agreement.",
        ),
    ]
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfavorableTerm {
    pub clause_id: u32,
    pub label: String,
    pub excerpt: String,
    pub explanation: String,
    pub severity: Severity,
}

/// Scan every clause against every pattern.
pub fn scan_unfavorable(clauses: &[Clause]) -> Vec<UnfavorableTerm> {
    let mut out = Vec::new();
    for clause in clauses {
        for p in PATTERNS.iter() {
            if p.re.is_match(&clause.text) {
                out.push(UnfavorableTerm {
                    clause_id: clause.id,
                    label: p.label.to_string(),
                    excerpt: excerpt(&clause.text),
                    explanation: p.explanation.to_string(),
                    severity: Severity::High,
                });
            }
        }
    }
    out
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Clause;

    #[test]
    fn flags_one_sided_termination() {
        let clauses = vec![Clause::from_fragment(
            1,
            "The Company may terminate this Agreement at any time without cause.",
        )];
        let hits = scan_unfavorable(&clauses);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "One-Sided Termination");
        assert_eq!(hits[0].severity, Severity::High);
    }

    #[test]
    fn flags_personal_guarantee_case_insensitively() {
        let clauses = vec![Clause::from_fragment(
            3,
            "The director shall be PERSONALLY LIABLE for all outstanding dues.",
        )];
        let hits = scan_unfavorable(&clauses);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].clause_id, 3);
    }

    #[test]
    fn balanced_wording_produces_no_hits() {
        let clauses = vec![Clause::from_fragment(
            1,
            "Either party may terminate with sixty days written notice, and liability is capped.",
        )];
        assert!(scan_unfavorable(&clauses).is_empty());
    }

    #[test]
    fn long_clause_text_is_excerpted() {
        let long = format!("unlimited liability {}", "x".repeat(400));
        let clauses = vec![Clause::from_fragment(1, long)];
        let hits = scan_unfavorable(&clauses);
        assert!(hits[0].excerpt.ends_with("..."));
        assert!(hits[0].excerpt.chars().count() <= EXCERPT_CHARS + 3);
    }
}
