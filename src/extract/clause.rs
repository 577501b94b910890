//! Clause segmentation and classification.
//!
//! Contracts are split on numbered/lettered headings (`1.`, `1.1`, `(a)`,
//! `WHEREAS`, ...). Documents without visible structure fall back to sentence
//! segmentation. Fragments shorter than the configured minimum are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:\d+\.(?:\d+\.?)*|\([a-z]\)|\(\d+\)|[A-Z]\.\s|WHEREAS\b|THEREFORE\b)")
        .expect("heading regex")
});

static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.;](?:\s+|$)").expect("sentence-end regex"));

/// Topic of a clause, derived from its wording. Presentation metadata only:
/// risk categories are evaluated for every clause regardless of tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Termination,
    Payment,
    Confidentiality,
    IntellectualProperty,
    Liability,
    Dispute,
    General,
}

/// Deontic flavor of a clause (modal-verb cues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    Obligation,
    Right,
    Prohibition,
    General,
}

/// A bounded span of contract text; the unit of risk evaluation.
/// Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub id: u32,
    pub text: String,
    pub tag: SectionTag,
    pub kind: ClauseKind,
    /// Byte offsets of the span in the normalized document text.
    pub start: usize,
    pub end: usize,
    pub word_count: usize,
}

impl Clause {
    /// Build a standalone clause from a free fragment (e.g. the explain
    /// endpoint, tests). Offsets cover the whole fragment.
    pub fn from_fragment(id: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        let tag = classify_tag(&text);
        let kind = classify_kind(&text);
        let word_count = text.split_whitespace().count();
        Self {
            id,
            text,
            tag,
            kind,
            start: 0,
            end,
            word_count,
        }
    }
}

/// Split `text` into clauses. Heading-anchored spans first; sentence fallback
/// when the document has fewer than two headings.
pub fn extract_clauses(text: &str, min_chars: usize) -> Vec<Clause> {
    let mut spans: Vec<(usize, usize)> = Vec::new();

    let heads: Vec<usize> = HEADING_RE.find_iter(text).map(|m| m.start()).collect();
    if heads.len() >= 2 {
        // Preamble before the first heading counts as a span too.
        if heads[0] > 0 {
            spans.push((0, heads[0]));
        }
        for (i, &start) in heads.iter().enumerate() {
            let end = heads.get(i + 1).copied().unwrap_or(text.len());
            spans.push((start, end));
        }
    } else {
        spans = sentence_spans(text);
    }

    let mut clauses = Vec::new();
    for (start, end) in spans {
        let raw = &text[start..end];
        let trimmed = raw.trim();
        if trimmed.chars().count() <= min_chars {
            continue;
        }
        // Re-anchor offsets to the trimmed content.
        let lead = raw.len() - raw.trim_start().len();
        let clause_start = start + lead;
        let clause_end = clause_start + trimmed.len();

        let id = clauses.len() as u32 + 1;
        clauses.push(Clause {
            id,
            text: trimmed.to_string(),
            tag: classify_tag(trimmed),
            kind: classify_kind(trimmed),
            start: clause_start,
            end: clause_end,
            word_count: trimmed.split_whitespace().count(),
        });
    }
    clauses
}

fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    for m in SENTENCE_END_RE.find_iter(text) {
        // Keep the terminating punctuation inside the span.
        let end = cursor + (m.start() - cursor) + 1;
        if end > cursor {
            spans.push((cursor, end.min(text.len())));
        }
        cursor = m.end();
    }
    if cursor < text.len() {
        spans.push((cursor, text.len()));
    }
    spans
}

fn classify_tag(text: &str) -> SectionTag {
    let t = text.to_ascii_lowercase();
    if t.contains("terminat") {
        SectionTag::Termination
    } else if t.contains("payment")
        || t.contains("compensation")
        || t.contains("invoice")
        || t.contains("fee")
    {
        SectionTag::Payment
    } else if t.contains("confidential") {
        SectionTag::Confidentiality
    } else if t.contains("intellectual property") || t.contains("ip rights") {
        SectionTag::IntellectualProperty
    } else if t.contains("liab") || t.contains("indemn") {
        SectionTag::Liability
    } else if t.contains("dispute")
        || t.contains("arbitration")
        || t.contains("jurisdiction")
        || t.contains("governing law")
    {
        SectionTag::Dispute
    } else {
        SectionTag::General
    }
}

fn classify_kind(text: &str) -> ClauseKind {
    let t = text.to_ascii_lowercase();
    // Prohibitions first: "shall not" would otherwise read as an obligation.
    if t.contains("shall not") || t.contains("must not") || t.contains("cannot") || t.contains("will not") {
        ClauseKind::Prohibition
    } else if t.contains("shall ")
        || t.contains("must ")
        || t.contains("agrees")
        || t.contains("undertakes")
    {
        ClauseKind::Obligation
    } else if t.contains("may ") || t.contains("entitled") || t.contains("can ") {
        ClauseKind::Right
    } else {
        ClauseKind::General
    }
}
