use std::time::Duration;

use clap::ValueEnum;

pub const DEMO_KEY: &str = "DEMO_KEY";

/// Which capability answers `POST /api/generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendMode {
    /// Free-text captions from the hosted LLM, returned as `{ result }`.
    Text,
    /// Structured campaign from the planning agent.
    Agent,
}

/// What "force re-render" does once a result exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RerenderPolicy {
    /// Re-fetch only the visual asset; no new backend request.
    #[default]
    Asset,
    /// Re-submit the current inputs as a fresh cycle.
    Full,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_text_model: String,
    pub backend: BackendMode,
    pub agent_url: Option<String>,
    pub agent_failover: bool,
    pub user_id: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT").unwrap_or(8080),
            gemini_api_key: env_string("GEMINI_API_KEY").unwrap_or_else(|| DEMO_KEY.into()),
            gemini_api_base: env_string("GEMINI_API_BASE")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".into()),
            gemini_text_model: env_string("GEMINI_TEXT_MODEL").unwrap_or_else(|| "gemini-1.5-flash".into()),
            backend: env_string("PRACHAR_BACKEND")
                .and_then(|v| BackendMode::from_str(&v, true).ok())
                .unwrap_or(BackendMode::Agent),
            agent_url: env_string("PRACHAR_AGENT_URL"),
            agent_failover: env_flag("PRACHAR_AGENT_FAILOVER"),
            user_id: env_string("PRACHAR_USER_ID").unwrap_or_else(|| "demo_user".into()),
        }
    }

    /// Key safe to print: first few characters only.
    pub fn masked_key(&self) -> String {
        let shown: String = self.gemini_api_key.chars().take(6).collect();
        format!("{shown}...")
    }
}

/// Timing and endpoint settings for the studio controller.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub api_url: String,
    pub grace_period: Duration,
    pub narrator_interval: Duration,
    pub copy_reset: Duration,
    pub asset_timeout: Duration,
    pub rerender: RerenderPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api/generate".into(),
            grace_period: Duration::from_millis(20_000),
            narrator_interval: Duration::from_millis(800),
            copy_reset: Duration::from_millis(2_000),
            asset_timeout: Duration::from_secs(45),
            rerender: RerenderPolicy::Asset,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env_string("PRACHAR_API_URL").unwrap_or(defaults.api_url),
            grace_period: env_parse("PRACHAR_GRACE_MS").map(Duration::from_millis).unwrap_or(defaults.grace_period),
            narrator_interval: env_parse("PRACHAR_NARRATOR_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.narrator_interval),
            copy_reset: env_parse("PRACHAR_COPY_RESET_MS").map(Duration::from_millis).unwrap_or(defaults.copy_reset),
            asset_timeout: env_parse("PRACHAR_ASSET_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.asset_timeout),
            rerender: env_string("PRACHAR_RERENDER")
                .and_then(|v| RerenderPolicy::from_str(&v, true).ok())
                .unwrap_or(defaults.rerender),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(env_string(key).as_deref().map(str::to_ascii_lowercase).as_deref(), Some("1" | "true" | "yes" | "on"))
}
