//! Document intake: whitespace normalization, size guards, language detection.
//!
//! Binary formats (PDF/DOCX) are intentionally not handled here; callers submit
//! extracted text. An empty or oversized submission is an error surfaced to the
//! caller, never a silent zero-result analysis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("document is empty after normalization")]
    Empty,
    #[error("document too large: {got} chars (limit {limit})")]
    TooLarge { got: usize, limit: usize },
}

/// Detected script of the submitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub language: Language,
    pub char_count: usize,
    pub word_count: usize,
}

/// Normalize and wrap raw text for analysis.
pub fn prepare(raw: &str, max_chars: usize) -> Result<Document, IngestError> {
    let text = normalize(raw);
    if text.is_empty() {
        return Err(IngestError::Empty);
    }
    let char_count = text.chars().count();
    if char_count > max_chars {
        return Err(IngestError::TooLarge {
            got: char_count,
            limit: max_chars,
        });
    }
    let word_count = text.split_whitespace().count();
    let language = detect_language(&text);
    Ok(Document {
        text,
        language,
        char_count,
        word_count,
    })
}

/// Collapse runs of spaces/tabs, keep line structure (clause headings are
/// line-anchored), cap blank-line runs at one, and drop control characters.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    let mut newline_run = 0usize;

    for ch in raw.chars() {
        match ch {
            '\r' => {}
            '\n' => {
                // Trailing spaces before a newline are dropped.
                pending_space = false;
                newline_run += 1;
                if newline_run <= 2 && !out.is_empty() {
                    out.push('\n');
                }
            }
            c if c.is_whitespace() => {
                pending_space = true;
            }
            c if c.is_control() => {}
            c => {
                if pending_space && !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                pending_space = false;
                newline_run = 0;
                out.push(c);
            }
        }
    }

    out.trim_matches('\n').trim().to_string()
}

/// Devanagari codepoints mark Hindi; Latin letters mark English.
pub fn detect_language(text: &str) -> Language {
    let has_hindi = text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c));
    let has_english = text.chars().any(|c| c.is_ascii_alphabetic());
    match (has_hindi, has_english) {
        (true, true) => Language::Mixed,
        (true, false) => Language::Hi,
        _ => Language::En,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_spaces_but_keeps_lines() {
        let raw = "1. TERM\t\tThis   agreement\r\n\n\n\n2. FEES  apply.";
        let out = normalize(raw);
        assert_eq!(out, "1. TERM This agreement\n\n2. FEES apply.");
    }

    #[test]
    fn empty_submission_is_an_error() {
        assert!(matches!(prepare("  \n\t ", 1000), Err(IngestError::Empty)));
    }

    #[test]
    fn oversized_submission_is_an_error() {
        let raw = "a".repeat(64);
        match prepare(&raw, 10) {
            Err(IngestError::TooLarge { got, limit }) => {
                assert_eq!(got, 64);
                assert_eq!(limit, 10);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn detects_devanagari() {
        assert_eq!(detect_language("This contract is binding."), Language::En);
        assert_eq!(detect_language("अनुबंध"), Language::Hi);
        assert_eq!(detect_language("अनुबंध / Agreement"), Language::Mixed);
    }
}
