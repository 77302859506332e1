//! socialsegment: social-media addiction scoring and student segmentation
//!
//! This library cleans self-reported usage records, derives a composite
//! addiction score and risk level, summarises them per academic level and
//! platform, and groups students into behavioural clusters with K-Means.

pub mod aggregate;
pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod features;
pub mod model;
pub mod pipeline;

// Re-export public items for easier access
pub use aggregate::{aggregate_by, AggregateRow, AggregateTable};
pub use clean::clean;
pub use cli::Args;
pub use config::SegmenterConfig;
pub use data::{load_dataset, Dataset, Value};
pub use error::PipelineError;
pub use export::{write_outputs, write_table};
pub use features::{derive, AddictionLevel, DerivedDataset};
pub use model::{segment, ClusterId, Segmentation};
pub use pipeline::{run_from_path, run_pipeline, PipelineOutput};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, PipelineError>;
