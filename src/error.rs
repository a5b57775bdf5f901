//! Error handling for capsule mesh generation
//!
//! Every stage of the pipeline returns [`MeshResult`]. Errors are fatal: the
//! pipeline is deterministic, so the caller fixes the input and reruns.

use thiserror::Error;

/// Result type alias for capsule mesh operations
pub type MeshResult<T> = Result<T, MeshError>;

/// Error types for capsule mesh operations
#[derive(Error, Debug)]
pub enum MeshError {
    /// Invalid input parameter (diameter, lengths, resolution, ...)
    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Two points resolve to the same key or the same rendered name
    #[error("Topology inconsistency: {message}")]
    TopologyInconsistency { message: String },

    /// A block, edge or patch refers to something that was never declared
    #[error("Dangling reference in {context}: `{reference}` is not declared")]
    DanglingReference { context: String, reference: String },

    /// Circumferential cell count driven to zero or below by calibration offsets
    #[error("Invalid resolution for block {block}: {cells} cells along the ring")]
    InvalidBlockResolution { block: usize, cells: i64 },

    /// Export format errors
    #[error("Export error: {message}")]
    ExportError { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing errors
    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl MeshError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Create a topology inconsistency error
    pub fn topology_inconsistency(message: impl Into<String>) -> Self {
        Self::TopologyInconsistency {
            message: message.into(),
        }
    }

    /// Create a dangling reference error
    pub fn dangling_reference(context: impl Into<String>, reference: impl ToString) -> Self {
        Self::DanglingReference {
            context: context.into(),
            reference: reference.to_string(),
        }
    }

    /// Create an export error
    pub fn export_error(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }
}

/// Reject non-finite and non-positive lengths.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> MeshResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MeshError::invalid_parameter(
            name,
            format!("expected a finite positive value, got {value}"),
        ))
    }
}
