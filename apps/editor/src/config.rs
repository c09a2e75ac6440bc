use anyhow::{Context, Result};
use uuid::Uuid;

/// Editor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: String,
    pub user_id: Uuid,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("RESUME_API_URL")?,
            api_token: require_env("RESUME_API_TOKEN")?,
            user_id: require_env("RESUME_USER_ID")?
                .parse::<Uuid>()
                .context("RESUME_USER_ID must be a valid UUID")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            user_id: self.user_id,
            token: self.api_token.clone(),
        }
    }
}

/// Explicit per-session identity, passed into the engine at construction —
/// components never read user or token from ambient state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub token: String,
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
