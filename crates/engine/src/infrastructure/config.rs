//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use super::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Optional JSON scenario bundle imported at startup
    pub scenario_bundle_path: Option<PathBuf>,

    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    /// Model used for NPC replies
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_temperature: Option<f32>,
    pub llm_max_tokens: Option<u32>,

    pub server_host: String,
    pub server_port: u16,

    /// CORS allowed origins (comma-separated, or "*" for any)
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/whodunit.db".to_string())
                .into(),
            scenario_bundle_path: optional("SCENARIO_BUNDLE_PATH").map(PathBuf::from),

            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            llm_timeout_secs: parsed_or("LLM_TIMEOUT_SECS", 120)
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            llm_max_retries: parsed_or("LLM_MAX_RETRIES", 2)
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            llm_temperature: optional("LLM_TEMPERATURE")
                .map(|raw| raw.parse::<f32>())
                .transpose()
                .context("LLM_TEMPERATURE must be a number")?,
            llm_max_tokens: optional("LLM_MAX_TOKENS")
                .map(|raw| raw.parse::<u32>())
                .transpose()
                .context("LLM_MAX_TOKENS must be a positive integer")?,

            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parsed_or("SERVER_PORT", 3000)
                .context("SERVER_PORT must be a valid port number")?,

            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T, T::Err>
where
    T: FromStr,
{
    match optional(key) {
        Some(raw) => raw.trim().parse(),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }
}
