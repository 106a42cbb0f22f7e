//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

/// Production endpoint of the task service.
pub const DEFAULT_API_BASE_URL: &str = "https://hh2myi12y8.execute-api.us-east-1.amazonaws.com/prod";

/// Page location assumed when none is configured.
pub const DEFAULT_APP_URL: &str = "https://localhost/";

/// Where the client-local key/value storage lives by default.
pub const DEFAULT_STORAGE_PATH: &str = ".taskbot/local_storage.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote task service (no trailing slash)
    pub api_base_url: String,
    /// Location the mini-app page was opened at (query string included)
    pub app_url: String,
    /// Path of the client-local storage file
    pub storage_path: PathBuf,
    /// Signed host payload, when launched from inside the chat host
    pub init_data: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("TASKBOT_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = normalize_base_url(&api_base_url)?;

        let app_url = env::var("TASKBOT_APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());
        reqwest::Url::parse(&app_url)
            .map_err(|e| ConfigError::Invalid("TASKBOT_APP_URL", e.to_string()))?;

        Ok(Self {
            api_base_url,
            app_url,
            storage_path: env::var("TASKBOT_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH)),
            init_data: env::var("TELEGRAM_INIT_DATA")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Config for tests, pointing at a local fake service.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".to_string(),
            app_url: "https://app.example.com/".to_string(),
            storage_path: env::temp_dir().join("taskbot-test-storage.json"),
            init_data: None,
        }
    }
}

/// Validate a base URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| ConfigError::Invalid("TASKBOT_API_BASE_URL", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(ConfigError::Invalid(
            "TASKBOT_API_BASE_URL",
            format!("unsupported scheme: {}", other),
        )),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
