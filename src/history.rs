//! In-memory ring of recent analysis summaries for the debug endpoint.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::analyzer::AnalysisResult;
use crate::risk::RiskBand;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub risk_score: u32,
    pub risk_band: RiskBand,
    pub clause_count: usize,
    pub finding_count: usize,
    /// Category labels of the top findings, for quick diagnostics.
    pub top_categories: Vec<String>,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, result: &AnalysisResult) {
        let mut top_categories: Vec<String> = result
            .findings
            .iter()
            .map(|f| f.category.label().to_string())
            .collect();
        top_categories.dedup();
        top_categories.truncate(3);

        let entry = HistoryEntry {
            ts_unix: now_unix(),
            risk_score: result.score.composite,
            risk_band: result.score.band,
            clause_count: result.metadata.clause_count,
            finding_count: result.findings.len(),
            top_categories,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
