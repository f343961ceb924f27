//! Biomarker diagnosis pipeline.
//!
//! Validates eight biomarker values, renders them together with a static
//! reference table into a prompt, asks an external chat completion API for a
//! label and accepts the answer only if it is exactly one of
//! `Alzheimer's`, `Parkinson's` or `Healthy`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use neurodx_core::{CompletionClient, DiagnosisService, OpenAiClient, ServiceConfig};
//!
//! # async fn example(body: serde_json::Map<String, serde_json::Value>) -> anyhow::Result<()> {
//! let client: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::from_env()?);
//! let service = DiagnosisService::new(ServiceConfig::from_env(), Some(client));
//!
//! let diagnosis = service.diagnose(&body).await?;
//! println!("{}", diagnosis);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `OPENAI_API_KEY` | Completion API credential (required) |
//! | `NEURODX_OPENAI_BASE_URL` | API base URL (default: `https://api.openai.com/v1`) |
//! | `NEURODX_OPENAI_TIMEOUT` | Request timeout in seconds (default: 60) |
//! | `NEURODX_REFERENCE_DATA` | Reference CSV path (default: `trainingset.csv`) |

pub mod completion;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod input;
pub mod prompt;
pub mod reference;
pub mod service;

pub use completion::{
    first_choice_text, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice,
    ChoiceMessage, CompletionClient, OpenAiClient, Role, MODEL, TEMPERATURE,
};
pub use config::{CompletionConfig, ServiceConfig};
pub use diagnosis::Diagnosis;
pub use error::{DiagnoseError, DiagnoseResult, ErrorKind};
pub use input::{BiomarkerInput, FieldValue, REQUIRED_FIELDS};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use reference::{load_reference_data, parse_reference_data, ReferenceRecord};
pub use service::{DiagnosisService, Stage};
