//! The diagnosis pipeline.
//!
//! Each call runs `Validating → Loading → Prompting → Calling →
//! CheckingResponse` once, in order, with no retries and no state carried
//! between calls.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::completion::{first_choice_text, ChatCompletionRequest, CompletionClient};
use crate::config::ServiceConfig;
use crate::diagnosis::Diagnosis;
use crate::error::{DiagnoseError, DiagnoseResult};
use crate::input::BiomarkerInput;
use crate::prompt::build_prompt;
use crate::reference::load_reference_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Loading,
    Prompting,
    Calling,
    CheckingResponse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Loading => "loading",
            Self::Prompting => "prompting",
            Self::Calling => "calling",
            Self::CheckingResponse => "checking_response",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct DiagnosisService {
    config: ServiceConfig,
    client: Option<Arc<dyn CompletionClient>>,
}

impl fmt::Debug for DiagnosisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosisService")
            .field("config", &self.config)
            .field("client", &self.client.as_ref().map(|c| c.provider_name()))
            .finish()
    }
}

impl DiagnosisService {
    /// `client` is `None` when no credential is configured; every diagnosis
    /// then fails with a configuration error.
    pub fn new(config: ServiceConfig, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Run the full pipeline for one submitted field map.
    pub async fn diagnose(&self, fields: &Map<String, Value>) -> DiagnoseResult<Diagnosis> {
        debug!(stage = %Stage::Validating, "diagnosis stage");
        let input = BiomarkerInput::from_fields(fields)?;

        let client = self
            .client
            .as_ref()
            .ok_or_else(DiagnoseError::missing_credential)?;

        self.diagnose_input(client.as_ref(), &input).await
    }

    async fn diagnose_input(
        &self,
        client: &dyn CompletionClient,
        input: &BiomarkerInput,
    ) -> DiagnoseResult<Diagnosis> {
        debug!(stage = %Stage::Loading, path = %self.config.reference_data.display(), "diagnosis stage");
        let records = load_reference_data(&self.config.reference_data).await?;

        debug!(stage = %Stage::Prompting, records = records.len(), "diagnosis stage");
        let prompt = build_prompt(&records, input);

        debug!(
            stage = %Stage::Calling,
            provider = client.provider_name(),
            prompt_bytes = prompt.len(),
            "diagnosis stage"
        );
        let request = ChatCompletionRequest::diagnosis(prompt);
        let response = client.create(&request).await?;

        debug!(stage = %Stage::CheckingResponse, "diagnosis stage");
        let text = first_choice_text(&response)?;
        match Diagnosis::from_completion(text) {
            Ok(diagnosis) => {
                info!(diagnosis = %diagnosis, "diagnosis succeeded");
                Ok(diagnosis)
            }
            Err(err) => {
                warn!(received = %text.trim(), "completion text is not a known label");
                Err(err)
            }
        }
    }
}
