//! LLM advisory layer: provider abstraction + file cache + daily limit.
//!
//! The value lives in the remote model; this module is a narrow wrapper.
//! Providers (Anthropic, OpenAI) take a prompt and return plain text. A
//! caching client wraps any provider with a content-keyed file cache and a
//! persisted per-day call limit, so repeated analyses of the same contract do
//! not burn quota. Analysis never depends on the advisor: every call site
//! treats `None` as "no advice available".

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::extract::Entities;
use crate::risk::{RiskBand, RiskCategory};

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Trait object used by handlers and the orchestrator.
pub trait AiClient: Send + Sync {
    /// Send a prompt, get plain text back (or `None` on any failure).
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAiClient = Arc<dyn AiClient>;

/// Contract categories the classifier chooses from.
pub const CONTRACT_TYPES: [&str; 10] = [
    "Employment Agreement",
    "Vendor Contract",
    "Lease Agreement",
    "Partnership Deed",
    "Service Contract",
    "Non-Disclosure Agreement (NDA)",
    "Consultant Agreement",
    "Purchase Agreement",
    "Licensing Agreement",
    "Other",
];

const SYSTEM_PROMPT: &str =
    "You are a legal assistant helping SME business owners understand contracts.";

/// Factory: build a client according to config and environment.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock client.
/// * `enabled == false` returns a disabled client.
/// * Otherwise the configured provider wrapped with caching + daily limit.
pub fn build_client(config: &AiConfig) -> DynAiClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        let mock = MockProvider {
            fixed: "Mock advisory response.".to_string(),
        };
        let client = CachingClient::new(mock, cache_dir(config), config.daily_limit);
        return Arc::new(client);
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.to_ascii_lowercase().as_str() {
        "anthropic" => {
            let provider = AnthropicProvider::new(config);
            Arc::new(CachingClient::new(
                provider,
                cache_dir(config),
                config.daily_limit,
            ))
        }
        "openai" => {
            let provider = OpenAiProvider::new(config);
            Arc::new(CachingClient::new(
                provider,
                cache_dir(config),
                config.daily_limit,
            ))
        }
        _ => Arc::new(DisabledClient),
    }
}

fn cache_dir(config: &AiConfig) -> PathBuf {
    PathBuf::from(&config.cache_dir)
}

// ------------------------------------------------------------
// High-level advisory API (prompt templates + parsing)
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub contract_type: String,
    pub confidence: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone)]
pub struct Advisor {
    client: DynAiClient,
}

impl Advisor {
    pub fn new(client: DynAiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(build_client(config))
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Classify the contract into one of [`CONTRACT_TYPES`].
    pub async fn classify(&self, text: &str) -> Option<Classification> {
        let types = CONTRACT_TYPES
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Analyze the following contract text and classify it into one of these categories:\n\
             {types}\n\n\
             Contract text (excerpt):\n{}\n\n\
             Respond in JSON format:\n\
             {{\"contract_type\": \"the category\", \"confidence\": \"high/medium/low\", \"reasoning\": \"brief explanation\"}}",
            head(text, 2000)
        );
        let response = self.client.complete(&prompt).await?;
        let value = extract_json(&response)?;
        serde_json::from_value(value).ok()
    }

    /// Plain-language explanation of one clause.
    pub async fn explain_clause(&self, clause: &str, context: &str) -> Option<String> {
        let context_part = if context.is_empty() {
            String::new()
        } else {
            format!("Contract context: {}\n\n", head(context, 500))
        };
        let prompt = format!(
            "Explain the following contract clause in simple, plain business language that a \
             non-lawyer can understand.\n\nClause:\n{clause}\n\n{context_part}\
             Provide:\n\
             1. What it means in simple terms\n\
             2. Why it matters to a business owner\n\
             3. Any important implications\n\n\
             Keep the explanation concise and practical."
        );
        self.client.complete(&prompt).await
    }

    /// Alternative clause wording, more favorable to the smaller party.
    pub async fn suggest_alternatives(&self, clause: &str, category: RiskCategory) -> Vec<String> {
        let prompt = format!(
            "You are helping SME business owners negotiate better contract terms.\n\n\
             Original clause (identified as {}):\n{clause}\n\n\
             Suggest 2-3 alternative clauses that would be more favorable to the business owner \
             while still being reasonable for both parties. Format as numbered alternatives and \
             explain briefly why each is better.",
            category.label()
        );
        let Some(response) = self.client.complete(&prompt).await else {
            return Vec::new();
        };
        let alternatives: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|l| {
                !l.is_empty()
                    && (l.starts_with(|c: char| c.is_ascii_digit()) || l.starts_with('-'))
            })
            .map(str::to_string)
            .collect();
        if alternatives.is_empty() {
            vec![response]
        } else {
            alternatives
        }
    }

    /// Structured contract summary; falls back to the raw text when the model
    /// does not return parseable JSON.
    pub async fn summarize(
        &self,
        text: &str,
        entities: &Entities,
        band: RiskBand,
    ) -> Option<serde_json::Value> {
        let prompt = format!(
            "You are analyzing a contract for an SME business owner. Provide a comprehensive \
             summary.\n\nContract text (excerpt):\n{}\n\n\
             Key entities found:\n- Parties: {}\n- Dates: {}\n- Amounts: {}\n\n\
             Risk level: {:?}\n\n\
             Provide a summary in JSON format with keys: contract_purpose, key_parties, \
             main_obligations, key_dates_and_terms, payment_terms, termination_conditions, \
             notable_clauses, overall_assessment. Be specific and practical.",
            head(text, 3000),
            join_head(&entities.parties, 3),
            join_head(&entities.dates, 3),
            join_head(&entities.amounts, 3),
            band,
        );
        let response = self.client.complete(&prompt).await?;
        Some(extract_json(&response).unwrap_or(serde_json::Value::String(response)))
    }

    /// Translate Devanagari contract text for analysis.
    pub async fn translate_to_english(&self, text: &str) -> Option<String> {
        let prompt = format!(
            "Translate the following Hindi contract text to English. Maintain legal terminology \
             and formal structure.\n\nHindi text:\n{}\n\nProvide accurate English translation:",
            head(text, 2000)
        );
        self.client.complete(&prompt).await
    }
}

/// First `max` chars of `text` on a char boundary.
fn head(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn join_head(values: &[String], n: usize) -> String {
    values.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

/// Pull a JSON object out of a model response: direct parse first, then the
/// outermost brace span.
pub fn extract_json(response: &str) -> Option<serde_json::Value> {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(response) {
        if v.is_object() {
            return Some(v);
        }
    }
    static BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("braces regex"));
    let m = BRACES.find(response)?;
    serde_json::from_str(m.as_str()).ok()
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so the same
/// caching wrapper serves production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("contract-risk-analyzer/0.1 (+github.com/sme-tools/contract-risk-analyzer)")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client")
}

/// Anthropic provider (messages API). Requires `ANTHROPIC_API_KEY`.
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: http_client(),
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

impl Provider for AnthropicProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                max_tokens: u32,
                temperature: f32,
                system: &'a str,
                messages: Vec<Msg<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                content: Vec<Block>,
            }
            #[derive(Deserialize)]
            struct Block {
                #[serde(default)]
                text: String,
            }

            let req = Req {
                model: &self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                system: SYSTEM_PROMPT,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
            };

            let resp = self
                .http
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let text = body
                .content
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join("");
            let cleaned = sanitize_response(&text);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
    }
    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// OpenAI provider (chat completions). Requires `OPENAI_API_KEY`.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: http_client(),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let resp = self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .unwrap_or("");
            let cleaned = sanitize_response(content);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Simple mock provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// Counter state is guarded by a `Mutex` to keep it simple and safe.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        let _ = fs::create_dir_all(&cache_dir); // best-effort
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    async fn complete_impl(&self, prompt: &str) -> Option<String> {
        // 1) Daily limit: real API calls increment, cache hits do not.
        {
            let mut g = self.counter.lock().expect("poisoned counter");
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                return None;
            }
        }

        // 2) Cache lookup.
        let key = cache_key(prompt);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            return Some(hit.text);
        }

        // 3) Real call.
        if let Some(fresh) = self.inner.fetch(prompt).await {
            let cleaned = sanitize_response(&fresh);
            if !cleaned.is_empty() {
                let _ = write_cache_file(&self.cache_dir, &key, &CachedResponse { text: cleaned.clone() });
                let mut g = self.counter.lock().expect("poisoned counter");
                g.count = g.count.saturating_add(1);
                let _ = save_daily_counter(&self.cache_dir, &g);
                return Some(cleaned);
            }
        }
        None
    }
}

impl<P: Provider> AiClient for CachingClient<P> {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(self.complete_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    text: String,
}

fn cache_key(prompt: &str) -> String {
    // DefaultHasher is sufficient for cache keys; no cryptographic need here.
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<CachedResponse> {
    let path = cache_path(dir, key);
    let mut file = fs::File::open(path).ok()?;
    let mut buf = String::new();
    file.read_to_string(&mut buf).ok()?;
    serde_json::from_str(&buf).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &CachedResponse) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}
impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}
impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let p = counter_path(dir);
    let s = fs::read_to_string(p)?;
    let dc: DailyCounter =
        serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(dc)
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}

// ------------------------------------------------------------
// Sanitization
// ------------------------------------------------------------

const MAX_RESPONSE_CHARS: usize = 8000;

/// Strip control characters (newlines survive), collapse space runs, and cap
/// the length. Model output is rendered verbatim in the UI.
pub fn sanitize_response(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_RESPONSE_CHARS));
    let mut chars_out = 0usize;
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\n' => '\n',
            '\r' | '\t' => ' ',
            c if c.is_control() => ' ',
            c => c,
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
                chars_out += 1;
            }
            prev_space = true;
        } else {
            out.push(c);
            chars_out += 1;
            prev_space = false;
        }
        if chars_out >= MAX_RESPONSE_CHARS {
            break;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_direct_and_embedded() {
        let direct = r#"{"contract_type": "Service Contract", "confidence": "high"}"#;
        assert!(extract_json(direct).is_some());

        let embedded = "Sure, here you go:\n{\"contract_type\": \"NDA\", \"confidence\": \"low\"}\nHope it helps.";
        let v = extract_json(embedded).unwrap();
        assert_eq!(v["contract_type"], "NDA");

        assert!(extract_json("no json here").is_none());
    }

    #[test]
    fn sanitize_keeps_newlines_and_caps_length() {
        let messy = "Line one\t with\u{0007} noise\nLine  two";
        assert_eq!(sanitize_response(messy), "Line one with noise\nLine two");

        let long = "a ".repeat(10_000);
        assert!(sanitize_response(&long).chars().count() <= MAX_RESPONSE_CHARS);
    }

    #[test]
    fn cache_key_is_stable() {
        assert_eq!(cache_key("same input"), cache_key("same input"));
        assert_ne!(cache_key("same input"), cache_key("other input"));
    }

    #[tokio::test]
    async fn disabled_client_returns_none() {
        let client = DisabledClient;
        assert_eq!(client.complete("anything").await, None);
        assert_eq!(client.provider_name(), "disabled");
    }
}
