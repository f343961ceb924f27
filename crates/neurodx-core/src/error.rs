//! Error types for the diagnosis pipeline.

use std::fmt;

/// Classification of a [`DiagnoseError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingField,
    InvalidFieldType,
    MalformedRequest,
    Configuration,
    DataUnavailable,
    Upstream,
    InvalidDiagnosis,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "MissingFieldError",
            Self::InvalidFieldType => "InvalidFieldTypeError",
            Self::MalformedRequest => "MalformedRequestError",
            Self::Configuration => "ConfigurationError",
            Self::DataUnavailable => "DataUnavailableError",
            Self::Upstream => "UpstreamError",
            Self::InvalidDiagnosis => "InvalidDiagnosisError",
        }
    }

    /// Whether the caller caused the failure (bad request) rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField | Self::InvalidFieldType | Self::MalformedRequest
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnosis pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum DiagnoseError {
    /// A required biomarker field is absent.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A biomarker field is present but has the wrong type.
    #[error("Invalid value for field: {field}, expected {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// Request body is not a JSON object.
    #[error("Invalid request body: {message}")]
    MalformedRequest { message: String },

    /// Completion credential is not configured.
    #[error("{message}")]
    Configuration { message: String },

    /// Reference table could not be read or holds no records.
    #[error("Training data is not available: {reason}")]
    DataUnavailable { path: String, reason: String },

    /// Completion call failed or returned an unusable structure.
    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    /// Completion text is not one of the allowed labels.
    #[error("Invalid diagnosis response: {received:?}")]
    InvalidDiagnosis { received: String },
}

impl DiagnoseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::InvalidFieldType { .. } => ErrorKind::InvalidFieldType,
            Self::MalformedRequest { .. } => ErrorKind::MalformedRequest,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::InvalidDiagnosis { .. } => ErrorKind::InvalidDiagnosis,
        }
    }

    pub fn missing_credential() -> Self {
        Self::Configuration {
            message: "OpenAI API key is not configured".to_string(),
        }
    }

    pub fn data_unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status: None,
        }
    }

    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl From<reqwest::Error> for DiagnoseError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("completion request timed out: {}", err)
        } else if err.is_decode() {
            format!("invalid response from completion API: {}", err)
        } else {
            format!("completion request failed: {}", err)
        };
        Self::Upstream {
            message,
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Result type for diagnosis operations.
pub type DiagnoseResult<T> = Result<T, DiagnoseError>;
