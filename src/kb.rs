//! Static SME knowledge base: common contract issues, best practices, statute
//! notes. Content is compiled in from `config/knowledge_base.json` and never
//! mutated; only the running statistics change, behind a `Mutex`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use strsim::normalized_levenshtein;

use crate::risk::{ContractScore, RiskFinding};

static KB_DATA: Lazy<KbData> = Lazy::new(|| {
    serde_json::from_str(include_str!("../config/knowledge_base.json"))
        .expect("valid knowledge base data")
});

/// Minimum fuzzy similarity for a search hit that has no substring match.
const MIN_SIMILARITY: f64 = 0.45;
const TOP_RISKS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbData {
    pub common_issues: BTreeMap<String, Vec<Issue>>,
    pub best_practices: BTreeMap<String, Vec<String>>,
    pub statute_notes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue: String,
    pub description: String,
    pub frequency: String,
    pub severity: String,
    pub impact: String,
    pub recommendation: String,
    pub sample_clause: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchHit {
    Issue {
        contract_type: String,
        similarity: f32,
        issue: Issue,
    },
    BestPractice {
        category: String,
        similarity: f32,
        text: String,
    },
}

impl SearchHit {
    fn similarity(&self) -> f32 {
        match self {
            SearchHit::Issue { similarity, .. } => *similarity,
            SearchHit::BestPractice { similarity, .. } => *similarity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KbStats {
    pub total_analyses: u64,
    pub category_hits: BTreeMap<String, u64>,
    pub average_score: f32,
    pub most_common_risks: Vec<String>,
}

pub struct KnowledgeBase {
    stats: Mutex<KbStats>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(KbStats::default()),
        }
    }

    pub fn data(&self) -> &'static KbData {
        &KB_DATA
    }

    /// Best practices for a category ("general", "red_flags",
    /// "negotiation_tips"); empty for unknown categories.
    pub fn best_practices(&self, category: &str) -> Vec<String> {
        KB_DATA
            .best_practices
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn statute_notes(&self) -> &'static BTreeMap<String, Vec<String>> {
        &KB_DATA.statute_notes
    }

    /// Case-insensitive substring search with fuzzy ranking over issue titles
    /// and best-practice entries. Results sorted by similarity, best first.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let q = query.trim().to_ascii_lowercase();
        if q.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (contract_type, issues) in &KB_DATA.common_issues {
            for issue in issues {
                let sim = similarity(&q, &issue.issue)
                    .max(similarity(&q, &issue.description) * 0.9);
                if sim >= MIN_SIMILARITY {
                    hits.push(SearchHit::Issue {
                        contract_type: contract_type.clone(),
                        similarity: sim as f32,
                        issue: issue.clone(),
                    });
                }
            }
        }
        for (category, practices) in &KB_DATA.best_practices {
            for practice in practices {
                let sim = similarity(&q, practice);
                if sim >= MIN_SIMILARITY {
                    hits.push(SearchHit::BestPractice {
                        category: category.clone(),
                        similarity: sim as f32,
                        text: practice.clone(),
                    });
                }
            }
        }

        hits.sort_by(|a, b| {
            b.similarity()
                .partial_cmp(&a.similarity())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }

    /// Fold one analysis into the running statistics.
    pub fn record(&self, score: &ContractScore, findings: &[RiskFinding]) {
        let mut stats = self.stats.lock().expect("kb stats mutex poisoned");
        stats.total_analyses += 1;

        for f in findings {
            *stats
                .category_hits
                .entry(f.category.as_str().to_string())
                .or_insert(0) += 1;
        }

        let n = stats.total_analyses as f32;
        stats.average_score =
            (stats.average_score * (n - 1.0) + score.composite as f32) / n;

        let mut ranked: Vec<(String, u64)> = stats
            .category_hits
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats.most_common_risks = ranked
            .into_iter()
            .take(TOP_RISKS)
            .map(|(k, _)| k)
            .collect();
    }

    pub fn stats(&self) -> KbStats {
        self.stats.lock().expect("kb stats mutex poisoned").clone()
    }
}

/// 1.0 on substring containment, otherwise normalized Levenshtein between the
/// query and the candidate (both lowercased).
fn similarity(query_lower: &str, candidate: &str) -> f64 {
    let cand = candidate.to_ascii_lowercase();
    if cand.contains(query_lower) {
        return 1.0;
    }
    normalized_levenshtein(query_lower, &cand)
}
