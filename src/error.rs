//! Error types for the prediction pipeline.
//!
//! Per-request failures are split by the stage that raised them so the
//! request boundary can tell a bad input (4xx) from a broken artifact (5xx).

use thiserror::Error;

/// A raw label had no entry in a taxonomy table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("Unknown {field} label: {label}")]
    UnknownLabel { field: &'static str, label: String },
}

/// Lookups against the reference dataset statistics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Unknown vehicle class: {0}")]
    UnknownVehicleClass(String),
}

/// One-hot encoding against the fitted encoder state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The category was never observed for this field when the encoder was fitted.
    #[error("Invalid {field} category '{category}'. Expected one of: {}", .valid.join(", "))]
    InvalidCategory {
        field: String,
        category: String,
        valid: Vec<String>,
    },

    /// A decoded row had more than one hot column for a single field.
    #[error("Ambiguous encoding for {field}: {hot} columns set")]
    AmbiguousRow { field: String, hot: usize },

    #[error("Encoded row has {found} columns, expected {expected}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("No categories observed for {0}")]
    EmptyField(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Feature schema construction and row alignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{0}' is not part of the feature schema")]
    UnknownColumn(String),
}

/// Request validation failures. Always recoverable at the request boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Model year must be between {min} and {max}")]
    OutOfRange { year: i32, min: i32, max: i32 },

    #[error("Invalid {field}. Expected one of: {}", .valid.join(", "))]
    InvalidInput {
        field: String,
        value: String,
        valid: Vec<String>,
    },
}

/// A model could not produce a prediction for a feature vector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Model '{model}' expects {expected} features, got {found}")]
    FeatureWidth {
        model: String,
        expected: usize,
        found: usize,
    },

    #[error("Model '{model}' tree {tree} is malformed: {reason}")]
    MalformedTree {
        model: String,
        tree: usize,
        reason: String,
    },

    #[error("Model '{model}' produced a non-finite prediction")]
    NonFinite { model: String },
}

/// Model artifact problems detected while loading. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model '{model}' feature names do not match the fitted schema (expected {expected:?}, found {found:?})")]
    SchemaMismatch {
        model: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Model '{model}' has no trees")]
    Empty { model: String },

    #[error("Model '{model}' tree {tree} node {node}: {reason}")]
    InvalidNode {
        model: String,
        tree: usize,
        node: usize,
        reason: String,
    },
}

/// Anything that can stop a single prediction request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Metric calculation failed: {0}")]
    Metrics(#[from] StatsError),

    #[error("Feature alignment failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Feature encoding failed: {0}")]
    Encoding(EncodeError),
}

impl PredictError {
    /// True when the caller sent a bad request rather than the service failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_cites_bounds() {
        let err = ValidationError::OutOfRange {
            year: 2016,
            min: 2017,
            max: 2025,
        };
        assert_eq!(err.to_string(), "Model year must be between 2017 and 2025");
    }

    #[test]
    fn test_invalid_input_lists_choices() {
        let err = ValidationError::InvalidInput {
            field: "fuel type".to_string(),
            value: "Q".to_string(),
            valid: vec!["D".into(), "E".into(), "X".into(), "Z".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid fuel type. Expected one of: D, E, X, Z"
        );
    }

    #[test]
    fn test_client_error_classification() {
        let validation: PredictError = ValidationError::OutOfRange {
            year: 2030,
            min: 2017,
            max: 2025,
        }
        .into();
        let inference: PredictError = InferenceError::NonFinite {
            model: "co2".into(),
        }
        .into();

        assert!(validation.is_client_error());
        assert!(!inference.is_client_error());
    }
}
