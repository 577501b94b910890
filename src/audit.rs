//! Audit trail of analyses: one JSONL file per day.
//!
//! Entries carry an anonymized document id (truncated SHA-256) and summary
//! numbers only. Raw contract text is never written.

use chrono::{Local, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::ingest::Language;
use crate::risk::RiskBand;

/// Short anonymized id for a document: first 6 bytes of SHA-256, hex.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub ts: String,
    pub event: &'static str,
    pub doc_id: String,
    pub language: Language,
    pub clause_count: usize,
    pub finding_count: usize,
    pub risk_score: u32,
    pub risk_band: RiskBand,
    pub elapsed_ms: u64,
}

impl AuditEntry {
    pub fn analysis(
        doc_text: &str,
        language: Language,
        clause_count: usize,
        finding_count: usize,
        risk_score: u32,
        risk_band: RiskBand,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            event: "contract_analysis",
            doc_id: anon_hash(doc_text),
            language,
            clause_count,
            finding_count,
            risk_score,
            risk_band,
            elapsed_ms,
        }
    }
}

#[derive(Debug)]
pub struct AuditLog {
    enabled: bool,
    dir: PathBuf,
}

impl AuditLog {
    pub fn new(enabled: bool, dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            dir: dir.into(),
        }
    }

    /// Append one entry to today's file. Silent no-op when disabled; callers
    /// log a warning on I/O errors rather than failing the request.
    pub fn record(&self, entry: &AuditEntry) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let file = self
            .dir
            .join(format!("audit_{}.jsonl", Local::now().format("%Y%m%d")));
        let mut f = OpenOptions::new().create(true).append(true).open(file)?;
        let line = serde_json::to_string(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_short_stable_and_text_free() {
        let h1 = anon_hash("confidential contract body");
        let h2 = anon_hash("confidential contract body");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 12);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn disabled_log_is_a_noop() {
        let log = AuditLog::new(false, "__nonexistent_audit_dir__");
        let entry = AuditEntry::analysis("text", Language::En, 3, 2, 23, RiskBand::Low, 5);
        assert!(log.record(&entry).is_ok());
        assert!(!std::path::Path::new("__nonexistent_audit_dir__").exists());
    }

    #[test]
    fn enabled_log_appends_jsonl() {
        let mut dir = std::env::temp_dir();
        dir.push(format!(
            "audit_test_{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let log = AuditLog::new(true, &dir);
        let entry = AuditEntry::analysis("text", Language::En, 3, 2, 23, RiskBand::Low, 5);
        log.record(&entry).unwrap();
        log.record(&entry).unwrap();

        let file = fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let content = fs::read_to_string(file).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("contract_analysis"));
        assert!(!content.contains("text\""));

        let _ = fs::remove_dir_all(&dir);
    }
}
