//! Pipeline orchestration
//!
//! Runs the stages in order: clean → derive → aggregate (academic level,
//! platform) → segment, and collects the four output tables. Any stage
//! error aborts the run.

use crate::aggregate::{aggregate_by_academic_level, aggregate_by_platform, AggregateTable};
use crate::clean::clean;
use crate::config::{fields, SegmenterConfig};
use crate::data::{load_dataset, Dataset};
use crate::features::derive;
use crate::model::{segment, Segmentation};
use log::info;
use std::path::Path;

/// Everything a pipeline run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Cleaned rows with derived features and cluster labels
    pub records: Dataset,
    pub by_academic_level: AggregateTable,
    pub by_platform: AggregateTable,
    /// Student_ID, cluster, computed_addiction_score
    pub clusters: Dataset,
    pub segmentation: Segmentation,
}

/// Run every stage over an in-memory dataset
///
/// # Arguments
/// * `raw` - Dataset as read from the input source
/// * `config` - K-Means parameters
pub fn run_pipeline(raw: Dataset, config: &SegmenterConfig) -> crate::Result<PipelineOutput> {
    info!("Pipeline started with {} rows", raw.len());

    let cleaned = clean(raw)?;
    let mut derived = derive(cleaned)?;

    let by_academic_level = aggregate_by_academic_level(&derived)?;
    let by_platform = aggregate_by_platform(&derived)?;
    info!(
        "Aggregated {} academic levels and {} platforms",
        by_academic_level.rows.len(),
        by_platform.rows.len()
    );

    let segmentation = segment(&derived, config)?;
    derived.attach_clusters(&segmentation)?;

    let records = derived.into_table();
    let clusters = records.select(
        &[
            fields::STUDENT_ID,
            fields::CLUSTER,
            fields::COMPUTED_ADDICTION_SCORE,
        ],
        "cluster projection",
    )?;

    Ok(PipelineOutput {
        records,
        by_academic_level,
        by_platform,
        clusters,
        segmentation,
    })
}

/// Load a CSV file and run the pipeline over it
pub fn run_from_path(input: &Path, config: &SegmenterConfig) -> crate::Result<PipelineOutput> {
    let raw = load_dataset(input)?;
    run_pipeline(raw, config)
}
