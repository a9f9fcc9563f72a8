//! Error types for bundle intake.
//!
//! Only malformed top-level input is rejected. Per-signal problems never
//! surface here; they are recorded as a status on the signal instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("signal bundle must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("signal `{name}` must be an object or a number, got {kind}")]
    MalformedEntry { name: String, kind: &'static str },

    #[error("signal `{name}` has an invalid weight override: {reason}")]
    InvalidWeight { name: String, reason: String },

    #[error("signal `{name}` has an unknown polarity `{value}`")]
    InvalidPolarity { name: String, value: String },

    #[error("signal `{name}` has an unknown modality `{value}`")]
    InvalidModality { name: String, value: String },

    #[error("signal `{0}` appears more than once in the bundle")]
    DuplicateSignal(String),

    #[error("signal name must not be empty")]
    EmptyName,

    #[error("unsupported modality `{0}` (expected image, text or email)")]
    UnknownModality(String),
}

/// Short JSON type name for error messages.
pub(crate) fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
