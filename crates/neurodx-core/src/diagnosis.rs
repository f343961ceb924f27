//! The closed set of diagnosis labels and the completion-text gate.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DiagnoseError, DiagnoseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnosis {
    Alzheimers,
    Parkinsons,
    Healthy,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 3] = [Self::Alzheimers, Self::Parkinsons, Self::Healthy];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Alzheimers => "Alzheimer's",
            Self::Parkinsons => "Parkinson's",
            Self::Healthy => "Healthy",
        }
    }

    /// Accept completion text only if, once trimmed, it is exactly one label.
    pub fn from_completion(text: &str) -> DiagnoseResult<Self> {
        let trimmed = text.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == trimmed)
            .ok_or_else(|| DiagnoseError::InvalidDiagnosis {
                received: trimmed.to_string(),
            })
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Diagnosis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
