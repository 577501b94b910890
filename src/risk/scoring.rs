//! Composite scoring over a finding set.
//!
//! score = min(100, sum of finding weights); the band thresholds come from the
//! rule table. Pure helpers, no I/O.

use super::{BandThresholds, ContractScore, RiskBand, RiskFinding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCORE_CAP: u32 = 100;

/// Aggregate all findings into one clamped composite score and band.
pub fn composite_score(findings: &[RiskFinding], bands: &BandThresholds) -> ContractScore {
    let total: u32 = findings.iter().map(|f| f.weight).sum();
    let composite = total.min(SCORE_CAP);
    ContractScore {
        composite,
        band: band_for(composite, bands),
    }
}

pub fn band_for(score: u32, bands: &BandThresholds) -> RiskBand {
    if score < bands.medium {
        RiskBand::Low
    } else if score < bands.high {
        RiskBand::Medium
    } else {
        RiskBand::High
    }
}

/// Finding counts for the results view: by severity and by category label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_category: BTreeMap<String, usize>,
}

pub fn breakdown(findings: &[RiskFinding]) -> FindingBreakdown {
    let mut out = FindingBreakdown::default();
    for f in findings {
        match f.severity {
            Severity::High => out.high += 1,
            Severity::Medium => out.medium += 1,
            Severity::Low => out.low += 1,
        }
        *out.by_category.entry(f.category.as_str().to_string()).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskCategory;

    fn finding(clause_id: u32, category: RiskCategory, severity: Severity, weight: u32) -> RiskFinding {
        RiskFinding {
            clause_id,
            category,
            severity,
            weight,
            triggers: vec!["t".into()],
        }
    }

    fn bands() -> BandThresholds {
        BandThresholds {
            medium: 30,
            high: 60,
        }
    }

    #[test]
    fn empty_findings_score_zero_low() {
        let s = composite_score(&[], &bands());
        assert_eq!(s.composite, 0);
        assert_eq!(s.band, RiskBand::Low);
    }

    #[test]
    fn sum_is_clamped_at_one_hundred() {
        let findings: Vec<RiskFinding> = (0..9)
            .map(|i| finding(i, RiskCategory::Penalty, Severity::High, 15))
            .collect();
        let s = composite_score(&findings, &bands());
        assert_eq!(s.composite, 100);
        assert_eq!(s.band, RiskBand::High);
    }

    #[test]
    fn band_boundaries_are_half_open() {
        let b = bands();
        assert_eq!(band_for(0, &b), RiskBand::Low);
        assert_eq!(band_for(29, &b), RiskBand::Low);
        assert_eq!(band_for(30, &b), RiskBand::Medium);
        assert_eq!(band_for(59, &b), RiskBand::Medium);
        assert_eq!(band_for(60, &b), RiskBand::High);
        assert_eq!(band_for(100, &b), RiskBand::High);
    }

    #[test]
    fn score_is_monotone_in_added_findings() {
        let mut findings = vec![finding(1, RiskCategory::Arbitration, Severity::Low, 2)];
        let mut prev = composite_score(&findings, &bands()).composite;
        for i in 2..40 {
            findings.push(finding(i, RiskCategory::Penalty, Severity::Medium, 8));
            let next = composite_score(&findings, &bands()).composite;
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn breakdown_counts_by_severity_and_category() {
        let findings = vec![
            finding(1, RiskCategory::Penalty, Severity::High, 15),
            finding(2, RiskCategory::Penalty, Severity::Medium, 8),
            finding(2, RiskCategory::Arbitration, Severity::Low, 2),
        ];
        let b = breakdown(&findings);
        assert_eq!((b.high, b.medium, b.low), (1, 1, 1));
        assert_eq!(b.by_category["penalty"], 2);
        assert_eq!(b.by_category["arbitration"], 1);
    }
}
