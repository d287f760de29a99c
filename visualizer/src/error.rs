//! Error types for the medviz pipeline.
//!
//! - [`CsvError`] - CSV loading errors (re-exported from [`crate::parser`])
//! - [`TransformError`] - Normalization, reshaping and aggregation errors
//! - [`RenderError`] - Chart drawing errors
//! - [`ConfigError`] - Configuration file errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

pub use crate::parser::CsvError;

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while normalizing or reshaping the loaded table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column name does not exist in the schema.
    #[error("Unknown column: {0}")]
    MissingColumn(String),

    /// The split column must hold 0/1 values.
    #[error("Split column '{0}' is not binary")]
    NotBinary(String),

    /// Height is the BMI divisor.
    #[error("Division by zero: height is 0 on line {line} (id {id})")]
    ZeroHeight { line: usize, id: i64 },

    /// Nothing left to aggregate or correlate.
    #[error("No records to transform")]
    EmptyInput,
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while drawing a figure to disk.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The plotting backend refused an operation.
    #[error("Drawing failed: {0}")]
    Drawing(String),

    /// Output file could not be written.
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn drawing(err: impl std::fmt::Display) -> Self {
        Self::Drawing(err.to_string())
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while reading pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CsvResult<T> = Result<T, CsvError>;

pub type TransformResult<T> = Result<T, TransformError>;

pub type RenderResult<T> = Result<T, RenderError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::new(1, "Empty CSV file");
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("Empty"));

        let transform_err = TransformError::MissingColumn("smoke".into());
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("smoke"));
    }

    #[test]
    fn test_zero_height_format() {
        let err = TransformError::ZeroHeight { line: 4, id: 17 };
        let msg = err.to_string();
        assert!(msg.contains("Division by zero"));
        assert!(msg.contains("line 4"));
        assert!(msg.contains("id 17"));
    }
}
