use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Number of enhancement agents dispatched per run. Must be at least 1.
    pub agent_fan_out: usize,
    /// When true, capability calls are served by the offline backend and no
    /// API key is required.
    pub offline_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let offline_mode = std::env::var("OFFLINE_MODE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let anthropic_api_key = if offline_mode {
            std::env::var("ANTHROPIC_API_KEY").unwrap_or_default()
        } else {
            require_env("ANTHROPIC_API_KEY")?
        };

        let agent_fan_out = std::env::var("AGENT_FAN_OUT")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<usize>()
            .context("AGENT_FAN_OUT must be a positive integer")?;
        if agent_fan_out == 0 {
            anyhow::bail!("AGENT_FAN_OUT must be at least 1");
        }

        Ok(Config {
            anthropic_api_key,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            agent_fan_out,
            offline_mode,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
