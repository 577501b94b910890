//! Extraction pipeline: clause segmentation, entity extraction, ambiguity and
//! compliance scans. Pure text passes; the scoring engine consumes the output
//! as-is and never re-segments.

pub mod clause;
pub mod entities;

pub use clause::{extract_clauses, Clause, ClauseKind, SectionTag};
pub use entities::{extract_entities, Entities};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Vague wording that tends to cause disputes.
static AMBIGUOUS_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "reasonable",
        "appropriate",
        "sufficient",
        "adequate",
        "approximately",
        "as soon as possible",
        "in due course",
        "promptly",
        "best efforts",
        "commercially reasonable",
    ]
});

/// Statute and compliance cues checked against the whole document.
static STATUTE_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Indian Contract Act",
        "Companies Act",
        "Labour Laws",
        "GST",
        "jurisdiction",
        "governing law",
        "Indian courts",
    ]
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub is_ambiguous: bool,
    pub score: usize,
    pub terms: Vec<String>,
}

/// Count vague terms in a clause.
pub fn detect_ambiguity(text: &str) -> Ambiguity {
    let lower = text.to_ascii_lowercase();
    let terms: Vec<String> = AMBIGUOUS_TERMS
        .iter()
        .filter(|t| lower.contains(*t))
        .map(|t| t.to_string())
        .collect();
    Ambiguity {
        is_ambiguous: !terms.is_empty(),
        score: terms.len(),
        terms,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    pub has_compliance_indicators: bool,
    pub keywords_found: Vec<String>,
    pub has_jurisdiction_clause: bool,
    pub has_governing_law: bool,
    pub compliance_score: usize,
}

/// Scan the document for statute references and jurisdiction/governing-law
/// cues. Indicative only; not a legal-compliance verdict.
pub fn check_compliance(text: &str) -> Compliance {
    let lower = text.to_ascii_lowercase();
    let keywords_found: Vec<String> = STATUTE_KEYWORDS
        .iter()
        .filter(|k| lower.contains(&k.to_ascii_lowercase()))
        .map(|k| k.to_string())
        .collect();
    let has_jurisdiction_clause = lower.contains("jurisdiction");
    let has_governing_law = lower.contains("governing law") || lower.contains("governed by");
    Compliance {
        has_compliance_indicators: !keywords_found.is_empty(),
        compliance_score: keywords_found.len(),
        keywords_found,
        has_jurisdiction_clause,
        has_governing_law,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguity_counts_each_term_once() {
        let a = detect_ambiguity(
            "The provider shall use best efforts to respond promptly and within a reasonable time.",
        );
        assert!(a.is_ambiguous);
        assert_eq!(a.score, 3);
        assert!(a.terms.contains(&"best efforts".to_string()));
    }

    #[test]
    fn precise_wording_is_not_ambiguous() {
        let a = detect_ambiguity("Payment is due within 30 days of the invoice date.");
        assert!(!a.is_ambiguous);
        assert_eq!(a.score, 0);
    }

    #[test]
    fn compliance_picks_up_statutes_and_jurisdiction() {
        let c = check_compliance(
            "This Agreement is governed by the Indian Contract Act. \
             Courts in Pune shall have exclusive jurisdiction.",
        );
        assert!(c.has_compliance_indicators);
        assert!(c.has_jurisdiction_clause);
        assert!(c.has_governing_law);
        assert!(c.keywords_found.iter().any(|k| k == "Indian Contract Act"));
    }
}
