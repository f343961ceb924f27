use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{ChatCompletionRequest, ChatCompletionResponse, CompletionClient};
use crate::config::CompletionConfig;
use crate::error::{DiagnoseError, DiagnoseResult};

const USER_AGENT_VALUE: &str = concat!("neurodx/", env!("CARGO_PKG_VERSION"));

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: CompletionConfig) -> DiagnoseResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(DiagnoseError::missing_credential)?;
        let endpoint = config.endpoint()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| DiagnoseError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn from_env() -> DiagnoseResult<Self> {
        Self::new(CompletionConfig::from_env())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn create(
        &self,
        request: &ChatCompletionRequest,
    ) -> DiagnoseResult<ChatCompletionResponse> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), "completion API returned an error");
            return Err(DiagnoseError::upstream_status(
                status.as_u16(),
                format!("completion API error (status {}): {}", status.as_u16(), message),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str::<ChatCompletionResponse>(&body).map_err(|e| {
            DiagnoseError::upstream(format!("Invalid response from completion API: {}", e))
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
