//! Risk rule tables (trigger phrases, severities, weights, band thresholds).
//!
//! The builtin table is compiled in from `config/risk_rules.json`. Deployments
//! can override it with a file of the same shape; the table is hot-reloaded on
//! mtime change at each `current()` call, so phrase lists and weights can be
//! tuned without recompiling. A file naming a category outside the fixed
//! eight, or not covering all eight, is rejected and the previous table stays
//! in effect.

use super::{RiskCategory, Severity};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};

pub const DEFAULT_RULES_PATH: &str = "config/risk_rules.json";
pub const ENV_RULES_PATH: &str = "ANALYZER_RULES_PATH";

const BUILTIN_RULES_JSON: &str = include_str!("../../config/risk_rules.json");

/// Weight contribution per severity for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeverityWeights {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl SeverityWeights {
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

/// Composite-score thresholds: `score < medium` is Low, `score < high` is
/// Medium, anything else High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BandThresholds {
    pub medium: u32,
    pub high: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub category: RiskCategory,
    pub base_severity: Severity,
    pub weights: SeverityWeights,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    /// Terms anywhere in a clause that escalate every match to High.
    pub escalation_terms: Vec<String>,
    pub bands: BandThresholds,
    /// One rule per category, ordered by [`RiskCategory::ALL`].
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// The compiled-in default table.
    pub fn builtin() -> Self {
        static BUILTIN: Lazy<RuleTable> = Lazy::new(|| {
            RuleTable::from_json_str(BUILTIN_RULES_JSON).expect("valid builtin risk rules")
        });
        BUILTIN.clone()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let raw: RawRuleTable = serde_json::from_str(json)?;

        let mut rules: Vec<Option<CategoryRule>> = vec![None; RiskCategory::ALL.len()];
        for entry in raw.categories {
            let category = RiskCategory::parse(&entry.category)?;
            let slot = &mut rules[category.index()];
            if slot.is_some() {
                anyhow::bail!("duplicate rule for category `{}`", entry.category);
            }
            *slot = Some(CategoryRule {
                category,
                base_severity: entry.base_severity,
                weights: entry.weights,
                triggers: entry.triggers,
            });
        }
        let rules: Vec<CategoryRule> = rules
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.ok_or_else(|| {
                    anyhow::anyhow!(
                        "rule table must cover all eight categories; `{}` is missing",
                        RiskCategory::ALL[i].as_str()
                    )
                })
            })
            .collect::<anyhow::Result<_>>()?;

        if raw.bands.medium >= raw.bands.high {
            anyhow::bail!(
                "band thresholds must increase: medium {} >= high {}",
                raw.bands.medium,
                raw.bands.high
            );
        }

        Ok(Self {
            escalation_terms: raw.escalation_terms,
            bands: raw.bands,
            rules,
        })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn rule(&self, category: RiskCategory) -> &CategoryRule {
        &self.rules[category.index()]
    }
}

#[derive(Debug, Deserialize)]
struct RawRuleTable {
    escalation_terms: Vec<String>,
    bands: BandThresholds,
    categories: Vec<RawCategoryRule>,
}

#[derive(Debug, Deserialize)]
struct RawCategoryRule {
    category: String,
    base_severity: Severity,
    weights: SeverityWeights,
    triggers: Vec<String>,
}

pub fn load_rules_file(path: &Path) -> io::Result<RuleTable> {
    let bytes = fs::read_to_string(path)?;
    RuleTable::from_json_str(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Hot-reload wrapper: reloads when the rule file's mtime changes. Falls back
/// to the builtin table while no valid file exists.
#[derive(Debug)]
pub struct HotReloadRuleTable {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    table: Arc<RuleTable>,
    last_modified: Option<SystemTime>,
}

impl HotReloadRuleTable {
    /// Create with a path; `None` resolves `ANALYZER_RULES_PATH` or the
    /// default location.
    pub fn new(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var(ENV_RULES_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RULES_PATH))
        });
        Self {
            path,
            inner: RwLock::new(State {
                table: Arc::new(RuleTable::builtin()),
                last_modified: None,
            }),
        }
    }

    /// Get the latest table, reloading if the file changed. Invalid files are
    /// ignored and the previous table stays in effect.
    pub fn current(&self) -> Arc<RuleTable> {
        let needs_reload = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().unwrap();
                guard.last_modified != Some(mtime)
            }
            Err(_) => false,
        };

        if !needs_reload {
            return self.inner.read().unwrap().table.clone();
        }

        let mut guard = self.inner.write().unwrap();
        if let Ok(meta) = fs::metadata(&self.path) {
            if let Ok(mtime) = meta.modified() {
                if guard.last_modified != Some(mtime) {
                    if let Ok(table) = load_rules_file(&self.path) {
                        guard.table = Arc::new(table);
                        guard.last_modified = Some(mtime);
                    }
                }
            }
        }
        guard.table.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskError;
    use std::io::Write;
    use std::{thread, time::Duration};

    fn unique_tmp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("risk_rules_test_{}", nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builtin_table_covers_all_categories() {
        let table = RuleTable::builtin();
        assert_eq!(table.rules().len(), 8);
        for cat in RiskCategory::ALL {
            assert!(!table.rule(cat).triggers.is_empty(), "{:?}", cat);
        }
        assert_eq!(table.bands.medium, 30);
        assert_eq!(table.bands.high, 60);
    }

    #[test]
    fn termination_high_weight_is_fifteen() {
        let table = RuleTable::builtin();
        let w = table
            .rule(RiskCategory::UnilateralTermination)
            .weights
            .for_severity(Severity::High);
        assert_eq!(w, 15);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let json = BUILTIN_RULES_JSON.replace("\"penalty\"", "\"exotic_risk\"");
        let err = RuleTable::from_json_str(&json).unwrap_err();
        let is_unknown = err
            .downcast_ref::<RiskError>()
            .map(|e| matches!(e, RiskError::UnknownCategory(_)))
            .unwrap_or(false);
        assert!(is_unknown, "expected UnknownCategory, got: {err}");
    }

    #[test]
    fn missing_category_is_rejected() {
        let mut v: serde_json::Value = serde_json::from_str(BUILTIN_RULES_JSON).unwrap();
        let cats = v["categories"].as_array_mut().unwrap();
        cats.pop();
        let err = RuleTable::from_json_str(&v.to_string()).unwrap_err();
        assert!(err.to_string().contains("missing"), "{err}");
    }

    #[test]
    fn hot_reload_picks_up_changes() {
        let tmpdir = unique_tmp_dir();
        let path = tmpdir.join("rules.json");

        {
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(BUILTIN_RULES_JSON.as_bytes()).unwrap();
            f.sync_all().unwrap();
        }

        let hot = HotReloadRuleTable::new(Some(&path));
        assert_eq!(hot.current().bands.medium, 30);

        // Ensure a different mtime (filesystem granularity can be coarse).
        thread::sleep(Duration::from_millis(1100));

        {
            let updated = BUILTIN_RULES_JSON.replace("\"medium\": 30", "\"medium\": 25");
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(updated.as_bytes()).unwrap();
            f.sync_all().unwrap();
        }

        assert_eq!(hot.current().bands.medium, 25);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir_all(&tmpdir);
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let hot = HotReloadRuleTable::new(Some(Path::new("__no_such_rules_file__.json")));
        assert_eq!(*hot.current(), RuleTable::builtin());
    }
}
