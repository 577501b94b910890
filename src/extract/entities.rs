//! Entity extraction over contract text: parties, dates, monetary amounts,
//! jurisdictions. Regex-based; built-in patterns can be extended with JSON
//! pattern files dropped into a config directory (`ANALYZER_ENTITY_DIR`, or
//! `config/entities` under the working directory).
//!
//! Extra pattern files have the shape:
//! `{ "patterns": [ { "regex": "...", "bucket": "amounts" } ] }`
//! Matched text is appended to the named bucket. Regexes must be compatible
//! with the `regex` crate (no lookarounds); `(?i)` for case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const PER_BUCKET_CAP: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub parties: Vec<String>,
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub jurisdictions: Vec<String>,
}

static ROLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\((?:hereinafter\s+)?referred to as\s+["“]?([A-Za-z][A-Za-z ]{1,40}?)["”]?\)"#)
        .expect("party role regex")
});

static ORG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z0-9&.\- ]{2,50}?\s(?:Private Limited|Pvt\.?\s?Ltd\.?|Limited|Ltd\.?|LLP|Inc\.?|Corporation|Corp\.?))\b",
    )
    .expect("org suffix regex")
});

static DATE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
        r"(?i)\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4}",
        r"(?i)(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{2,4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date regex"))
    .collect()
});

static AMOUNT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"₹\s*[\d,]+(?:\.\d{2})?",
        r"(?i)Rs\.?\s*[\d,]+(?:\.\d{2})?",
        r"\$\s*[\d,]+(?:\.\d{2})?",
        r"(?i)INR\s*[\d,]+(?:\.\d{2})?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("amount regex"))
    .collect()
});

static JURISDICTION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)courts?\s+(?:in|of|at)\s+([A-Z][A-Za-z ]{2,30}?)(?:\s+shall|\s+will|[.,;]|$)",
        r"(?i)jurisdiction[:\s]+([A-Z][A-Za-z ]{2,30}?)(?:[.,;]|$)",
        r"(?i)venue[:\s]+([A-Z][A-Za-z ]{2,30}?)(?:[.,;]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("jurisdiction regex"))
    .collect()
});

/// Run all extractors over the full document text.
pub fn extract_entities(text: &str) -> Entities {
    let mut out = Entities {
        parties: extract_parties(text),
        dates: collect_matches(&DATE_RES, text),
        amounts: collect_matches(&AMOUNT_RES, text),
        jurisdictions: collect_captures(&JURISDICTION_RES, text),
    };
    apply_extra_patterns(&mut out, text);
    for bucket in [
        &mut out.parties,
        &mut out.dates,
        &mut out.amounts,
        &mut out.jurisdictions,
    ] {
        dedup_cap(bucket);
    }
    out
}

fn extract_parties(text: &str) -> Vec<String> {
    let mut parties: Vec<String> = ROLE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();
    parties.extend(
        ORG_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string()),
    );
    // BETWEEN:/AND: block style: the party name sits on the following line.
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        let head = line.trim().to_ascii_uppercase();
        if head == "BETWEEN:" || head == "AND:" {
            if let Some(next) = lines.peek() {
                let name = next.split(',').next().unwrap_or("").trim();
                if !name.is_empty() {
                    parties.push(name.to_string());
                }
            }
        }
    }
    parties
}

fn collect_matches(res: &[Regex], text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in res {
        out.extend(re.find_iter(text).map(|m| m.as_str().trim().to_string()));
    }
    out
}

fn collect_captures(res: &[Regex], text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in res {
        out.extend(
            re.captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
        );
    }
    out
}

fn dedup_cap(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|v| seen.insert(v.to_ascii_lowercase()));
    values.truncate(PER_BUCKET_CAP);
}

/* ---- optional extra patterns from a config directory ---- */

#[derive(Debug, Deserialize)]
struct ExtraPattern {
    regex: String,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct ExtraPatternFile {
    #[serde(default)]
    patterns: Vec<ExtraPattern>,
}

fn entity_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ANALYZER_ENTITY_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config")
        .join("entities")
}

/// Scan `*.json` files in the entity config dir and append matches to the
/// named buckets. Missing dir is fine; malformed files are skipped.
fn apply_extra_patterns(out: &mut Entities, text: &str) {
    let dir = entity_config_dir();
    let Ok(read_dir) = fs::read_dir(&dir) else {
        return;
    };
    for entry in read_dir.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let Ok(cfg) = serde_json::from_str::<ExtraPatternFile>(&content) else {
            continue;
        };
        for pat in cfg.patterns {
            let Ok(re) = Regex::new(&pat.regex) else {
                continue;
            };
            let bucket = match pat.bucket.as_str() {
                "parties" => &mut out.parties,
                "dates" => &mut out.dates,
                "amounts" => &mut out.amounts,
                "jurisdictions" => &mut out.jurisdictions,
                _ => continue,
            };
            bucket.extend(re.find_iter(text).map(|m| m.as_str().trim().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "This Agreement is made on 15 March 2024 BETWEEN:\n\
        Acme Widgets Pvt. Ltd., having office at Pune (hereinafter referred to as \"Client\")\n\
        AND:\n\
        Bright Services LLP, having office at Mumbai (hereinafter referred to as \"Provider\").\n\
        The fee is Rs. 1,50,000 per month plus GST, payable by 01/04/2024. \
        Courts in Pune shall have exclusive jurisdiction.";

    #[test]
    fn extracts_roles_and_orgs_as_parties() {
        let e = extract_entities(SAMPLE);
        assert!(e.parties.iter().any(|p| p == "Client"), "{:?}", e.parties);
        assert!(e.parties.iter().any(|p| p == "Provider"));
        assert!(e.parties.iter().any(|p| p.contains("Acme Widgets")));
    }

    #[test]
    fn extracts_dates_in_both_forms() {
        let e = extract_entities(SAMPLE);
        assert!(e.dates.iter().any(|d| d == "01/04/2024"), "{:?}", e.dates);
        assert!(e.dates.iter().any(|d| d == "15 March 2024"));
    }

    #[test]
    fn extracts_rupee_amounts() {
        let e = extract_entities(SAMPLE);
        assert!(e.amounts.iter().any(|a| a.starts_with("Rs.")), "{:?}", e.amounts);
    }

    #[test]
    fn extracts_jurisdiction() {
        let e = extract_entities(SAMPLE);
        assert!(
            e.jurisdictions.iter().any(|j| j.contains("Pune")),
            "{:?}",
            e.jurisdictions
        );
    }

    #[test]
    fn buckets_are_deduplicated() {
        let text = "Pay Rs. 500 now and Rs. 500 later.";
        let e = extract_entities(text);
        assert_eq!(e.amounts.iter().filter(|a| a.contains("500")).count(), 1);
    }
}
