//! Prompt construction.

use crate::input::BiomarkerInput;
use crate::reference::ReferenceRecord;

/// System instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a medical diagnosis assistant trained on neurological biomarker data. Analyze the provided biomarkers and training data to determine if the patient likely has Alzheimer's, Parkinson's, or is Healthy. Base your analysis on patterns in the training data.";

const VALUE_SEPARATOR: &str = ", ";

const INSTRUCTION: &str = "Analyze the following patient biomarkers and provide a diagnosis (Alzheimer's, Parkinson's, or Healthy) based on the patterns in the training data:";

const ANSWER_FORMAT: &str = "Provide only the diagnosis without any additional explanation.";

/// Build the user prompt from the reference table and one patient's values.
///
/// Output is a pure function of its inputs: records appear in slice order and
/// patient values in [`crate::input::REQUIRED_FIELDS`] order.
pub fn build_prompt(records: &[ReferenceRecord], input: &BiomarkerInput) -> String {
    let training = records
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n");

    let patient = input
        .ordered_values()
        .iter()
        .map(|(_, value)| value.to_string())
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR);

    format!(
        "Training Data:\n{}\n\n{}\n{}\n\n{}",
        training, INSTRUCTION, patient, ANSWER_FORMAT
    )
}

fn render_record(record: &ReferenceRecord) -> String {
    record.values().collect::<Vec<_>>().join(VALUE_SEPARATOR)
}
