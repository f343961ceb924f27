//! Runtime configuration.

use std::path::PathBuf;

use tracing::warn;
use url::Url;

use crate::error::{DiagnoseError, DiagnoseResult};

/// Settings for the completion API client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// API credential. `None` means diagnosis is unavailable.
    pub api_key: Option<String>,

    /// Base URL, without the `/chat/completions` suffix.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Unparseable or zero values fall back to the default; zero would fail every request.
fn parse_timeout(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return default_timeout();
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!("NEURODX_OPENAI_TIMEOUT must be greater than zero; using default");
            default_timeout()
        }
        Ok(secs) => secs,
        Err(e) => {
            warn!(value = %raw, error = %e, "invalid NEURODX_OPENAI_TIMEOUT; using default");
            default_timeout()
        }
    }
}

fn default_reference_data() -> PathBuf {
    PathBuf::from("trainingset.csv")
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl CompletionConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `OPENAI_API_KEY` | API credential |
    /// | `NEURODX_OPENAI_BASE_URL` | API base URL |
    /// | `NEURODX_OPENAI_TIMEOUT` | Request timeout in seconds |
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("NEURODX_OPENAI_BASE_URL")
                .unwrap_or_else(|_| default_base_url()),
            timeout_secs: parse_timeout(std::env::var("NEURODX_OPENAI_TIMEOUT").ok()),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The chat completions endpoint derived from `base_url`.
    pub fn endpoint(&self) -> DiagnoseResult<Url> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|u| u.join("chat/completions"))
            .map_err(|e| DiagnoseError::Configuration {
                message: format!("invalid completion base URL {:?}: {}", self.base_url, e),
            })
    }
}

/// Settings for the diagnosis pipeline.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path of the reference CSV, relative to the working directory unless absolute.
    pub reference_data: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            reference_data: default_reference_data(),
        }
    }
}

impl ServiceConfig {
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `NEURODX_REFERENCE_DATA` | Reference CSV path (default `trainingset.csv`) |
    pub fn from_env() -> Self {
        Self {
            reference_data: std::env::var_os("NEURODX_REFERENCE_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(default_reference_data),
        }
    }

    pub fn with_reference_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_data = path.into();
        self
    }
}
