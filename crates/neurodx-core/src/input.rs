//! Biomarker input validation.
//!
//! Numeric markers accept a JSON number or a numeric string (HTML forms
//! submit strings). Genotype flags accept only literal JSON booleans.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DiagnoseError, DiagnoseResult};

/// Required fields, in prompt order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "amyloid_beta",
    "tau_p",
    "neurofilament",
    "apoe_genotype",
    "fdg_pet",
    "alpha_synuclein",
    "dat_ratio",
    "vps35_genotype",
];

const EXPECT_NUMBER: &str = "a number";
const EXPECT_BOOLEAN: &str = "true or false";

/// One patient's biomarker values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiomarkerInput {
    pub amyloid_beta: f64,
    pub tau_p: f64,
    pub neurofilament: f64,
    pub apoe_genotype: bool,
    pub fdg_pet: f64,
    pub alpha_synuclein: f64,
    pub dat_ratio: f64,
    pub vps35_genotype: bool,
}

/// A validated field value, rendered the same way in every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl BiomarkerInput {
    /// Validate submitted fields in [`REQUIRED_FIELDS`] order; the first bad field wins.
    pub fn from_fields(fields: &Map<String, Value>) -> DiagnoseResult<Self> {
        let amyloid_beta = number(fields, "amyloid_beta")?;
        let tau_p = number(fields, "tau_p")?;
        let neurofilament = number(fields, "neurofilament")?;
        let apoe_genotype = flag(fields, "apoe_genotype")?;
        let fdg_pet = number(fields, "fdg_pet")?;
        let alpha_synuclein = number(fields, "alpha_synuclein")?;
        let dat_ratio = number(fields, "dat_ratio")?;
        let vps35_genotype = flag(fields, "vps35_genotype")?;

        Ok(Self {
            amyloid_beta,
            tau_p,
            neurofilament,
            apoe_genotype,
            fdg_pet,
            alpha_synuclein,
            dat_ratio,
            vps35_genotype,
        })
    }

    /// Values paired with their field names, in [`REQUIRED_FIELDS`] order.
    pub fn ordered_values(&self) -> [(&'static str, FieldValue); 8] {
        [
            ("amyloid_beta", FieldValue::Number(self.amyloid_beta)),
            ("tau_p", FieldValue::Number(self.tau_p)),
            ("neurofilament", FieldValue::Number(self.neurofilament)),
            ("apoe_genotype", FieldValue::Flag(self.apoe_genotype)),
            ("fdg_pet", FieldValue::Number(self.fdg_pet)),
            ("alpha_synuclein", FieldValue::Number(self.alpha_synuclein)),
            ("dat_ratio", FieldValue::Number(self.dat_ratio)),
            ("vps35_genotype", FieldValue::Flag(self.vps35_genotype)),
        ]
    }
}

/// Absent, `null` and blank strings all count as not submitted.
fn present<'a>(fields: &'a Map<String, Value>, field: &'static str) -> DiagnoseResult<&'a Value> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(DiagnoseError::MissingField { field }),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(DiagnoseError::MissingField { field })
        }
        Some(value) => Ok(value),
    }
}

fn number(fields: &Map<String, Value>, field: &'static str) -> DiagnoseResult<f64> {
    let invalid = || DiagnoseError::InvalidFieldType {
        field,
        expected: EXPECT_NUMBER,
    };

    let parsed = match present(fields, field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).ok_or_else(invalid)
}

fn flag(fields: &Map<String, Value>, field: &'static str) -> DiagnoseResult<bool> {
    match present(fields, field)? {
        Value::Bool(b) => Ok(*b),
        _ => Err(DiagnoseError::InvalidFieldType {
            field,
            expected: EXPECT_BOOLEAN,
        }),
    }
}
