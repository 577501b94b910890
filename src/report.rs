//! Report assembly and HTML export.
//!
//! JSON stays the primary representation; this module condenses an
//! `AnalysisResult` into an executive report and renders a standalone HTML
//! document for download. All user-supplied text is escaped.

use html_escape::encode_text;
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::risk::RiskBand;

const ACTION_ITEM_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub analysis_date: String,
    pub contract_type: String,
    pub risk_band: RiskBand,
    pub risk_score: u32,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFindings {
    pub critical_clauses: usize,
    pub high_severity_findings: usize,
    pub unfavorable_terms: usize,
    pub ambiguous_clauses: usize,
    pub categories_triggered: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub executive_summary: ExecutiveSummary,
    pub key_findings: KeyFindings,
    pub action_items: Vec<String>,
}

/// Condense an analysis into the executive report.
pub fn build(analysis: &AnalysisResult) -> Report {
    let contract_type = analysis
        .ai
        .contract_type
        .as_ref()
        .map(|c| c.contract_type.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut action_items: Vec<String> = analysis
        .critical_clauses
        .iter()
        .flat_map(|c| c.recommendations.iter().cloned())
        .collect();
    action_items.extend(
        analysis
            .unfavorable_terms
            .iter()
            .map(|u| format!("Review {}: {}", u.label, u.explanation)),
    );
    let mut seen = std::collections::HashSet::new();
    action_items.retain(|a| seen.insert(a.clone()));
    action_items.truncate(ACTION_ITEM_LIMIT);

    Report {
        executive_summary: ExecutiveSummary {
            analysis_date: analysis.metadata.analyzed_at.clone(),
            contract_type,
            risk_band: analysis.score.band,
            risk_score: analysis.score.composite,
            recommendation: recommendation_line(analysis.score.band).to_string(),
        },
        key_findings: KeyFindings {
            critical_clauses: analysis.critical_clauses.len(),
            high_severity_findings: analysis.breakdown.high,
            unfavorable_terms: analysis.unfavorable_terms.len(),
            ambiguous_clauses: analysis.ambiguous_clauses.len(),
            categories_triggered: analysis.breakdown.by_category.len(),
        },
        action_items,
    }
}

pub fn recommendation_line(band: RiskBand) -> &'static str {
    match band {
        RiskBand::High => {
            "HIGH RISK: legal review is strongly recommended before signing. \
             Several unfavorable terms identified."
        }
        RiskBand::Medium => {
            "MEDIUM RISK: review highlighted clauses carefully and consider \
             negotiating key terms."
        }
        RiskBand::Low => {
            "LOW RISK: the contract appears relatively balanced. Review standard \
             terms and proceed with care."
        }
    }
}

/// Standalone HTML document for download/printing.
pub fn render_html(analysis: &AnalysisResult) -> String {
    let report = build(analysis);
    let band_class = match analysis.score.band {
        RiskBand::High => "high",
        RiskBand::Medium => "medium",
        RiskBand::Low => "low",
    };

    let mut findings_rows = String::new();
    for f in &analysis.findings {
        findings_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td></tr>\n",
            f.clause_id,
            encode_text(f.category.label()),
            f.severity,
            f.weight,
            encode_text(&f.triggers.join(", ")),
        ));
    }

    let mut unfavorable_rows = String::new();
    for u in &analysis.unfavorable_terms {
        unfavorable_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            u.clause_id,
            encode_text(&u.label),
            encode_text(&u.excerpt),
            encode_text(&u.explanation),
        ));
    }

    let mut action_items = String::new();
    for item in &report.action_items {
        action_items.push_str(&format!("<li>{}</li>\n", encode_text(item)));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Contract Analysis Report</title>
<style>
  body {{ font-family: Georgia, serif; margin: 2rem auto; max-width: 56rem; color: #222; }}
  h1 {{ color: #1f3c88; }}
  table {{ border-collapse: collapse; width: 100%; margin: 1rem 0; }}
  th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
  th {{ background: #f0f2f8; }}
  .band {{ font-weight: bold; font-size: 1.2rem; }}
  .band.high {{ color: #dc3545; }}
  .band.medium {{ color: #b8860b; }}
  .band.low {{ color: #28a745; }}
</style>
</head>
<body>
<h1>Contract Analysis Report</h1>
<p>Analyzed at {analyzed_at} &middot; {clause_count} clauses &middot; contract type: {contract_type}</p>
<h2>Executive Summary</h2>
<p class="band {band_class}">Risk score: {score}/100 ({band:?})</p>
<p>{recommendation}</p>
<h2>Findings</h2>
<table>
<tr><th>Clause</th><th>Category</th><th>Severity</th><th>Weight</th><th>Triggers</th></tr>
{findings_rows}
</table>
<h2>Unfavorable Terms</h2>
<table>
<tr><th>Clause</th><th>Term</th><th>Excerpt</th><th>Why it matters</th></tr>
{unfavorable_rows}
</table>
<h2>Action Items</h2>
<ul>
{action_items}
</ul>
</body>
</html>
"#,
        analyzed_at = encode_text(&analysis.metadata.analyzed_at),
        clause_count = analysis.metadata.clause_count,
        contract_type = encode_text(&report.executive_summary.contract_type),
        band_class = band_class,
        score = analysis.score.composite,
        band = analysis.score.band,
        recommendation = encode_text(&report.executive_summary.recommendation),
        findings_rows = findings_rows,
        unfavorable_rows = unfavorable_rows,
        action_items = action_items,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_lines_follow_bands() {
        assert!(recommendation_line(RiskBand::High).starts_with("HIGH RISK"));
        assert!(recommendation_line(RiskBand::Medium).starts_with("MEDIUM RISK"));
        assert!(recommendation_line(RiskBand::Low).starts_with("LOW RISK"));
    }
}
