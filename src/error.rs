//! Error types for the segmentation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Missing required field '{field}' in {stage}")]
    MissingField { field: String, stage: &'static str },

    #[error("Duplicate column '{field}' after trimming column names")]
    DuplicateColumn { field: String },

    #[error("Degenerate input: {context}")]
    DegenerateInput { context: String },

    #[error("Invalid value for '{field}' at row {row}: {reason}")]
    InvalidValue {
        field: String,
        row: usize,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Clustering failed: {0}")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn missing_field(field: &str, stage: &'static str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            stage,
        }
    }

    pub(crate) fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateInput {
            context: context.into(),
        }
    }
}
