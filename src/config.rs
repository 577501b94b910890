//! Application configuration: TOML file with env overrides.
//!
//! Resolution order: `ANALYZER_CONFIG_PATH` env var, then
//! `config/analyzer.toml`, then compiled defaults when no file exists. A file
//! that exists but fails to parse is an error (silent fallback would hide
//! typos in deployments). Selected knobs can additionally be overridden via
//! env for quick experiments.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";

pub const ENV_MAX_CHARS: &str = "ANALYZER_MAX_CHARS";
pub const ENV_AI_ENABLED: &str = "ANALYZER_AI_ENABLED";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_min_clause_chars")]
    pub min_clause_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "anthropic" | "openai" (case-insensitive).
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_audit_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_max_chars() -> usize {
    200_000
}
fn default_min_clause_chars() -> usize {
    20
}
fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}
fn default_daily_limit() -> u32 {
    20
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f32 {
    0.2
}
fn default_cache_dir() -> String {
    "cache/ai".to_string()
}
fn default_true() -> bool {
    true
}
fn default_audit_dir() -> String {
    "audit_logs".to_string()
}
fn default_history_capacity() -> usize {
    2000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_clause_chars: default_min_clause_chars(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            daily_limit: default_daily_limit(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_audit_dir(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

impl AppConfig {
    /// Load from the resolved path, or defaults when no file exists, then
    /// apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("failed to read config at {}: {}", path.display(), e)
            })?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_env_usize(std::env::var(ENV_MAX_CHARS).ok()) {
            self.limits.max_chars = v;
        }
        if let Ok(v) = std::env::var(ENV_AI_ENABLED) {
            match v.trim() {
                "1" | "true" => self.ai.enabled = true,
                "0" | "false" => self.ai.enabled = false,
                _ => {}
            }
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.limits.max_chars == 0 {
            anyhow::bail!("limits.max_chars must be positive");
        }
        if !(0.0..=1.0).contains(&self.ai.temperature) {
            anyhow::bail!(
                "ai.temperature must be within 0.0..=1.0, got {}",
                self.ai.temperature
            );
        }
        Ok(())
    }
}

fn parse_env_usize(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}
