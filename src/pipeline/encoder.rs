//! Category encoder: human-readable labels → integer codes the classifier expects.
//!
//! The tables are declared in `models::enums`; this module
//! is the string-keyed entry point used by the form and JSON surfaces.

use crate::models::enums::CategoricalField;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("Unknown {field} category: {label:?}")]
    UnknownCategory { field: &'static str, label: String },
}

/// Encode one label of a categorical field.
pub fn encode(field: CategoricalField, label: &str) -> Result<u8, EncodeError> {
    field
        .table()
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, code)| *code)
        .ok_or_else(|| EncodeError::UnknownCategory {
            field: field.name(),
            label: label.to_string(),
        })
}
