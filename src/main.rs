//! socialsegment: clean student social-media usage data, score addiction risk
//! and segment students with K-Means
//!
//! This is the main entrypoint that runs the pipeline and writes the four
//! output tables.

use anyhow::{Context, Result};
use clap::Parser;
use socialsegment::{run_from_path, write_outputs, Args, SegmenterConfig};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let start_time = Instant::now();
    let config = SegmenterConfig::default();

    log::info!("Reading {}", args.input.display());
    let output = run_from_path(&args.input, &config)
        .with_context(|| format!("pipeline failed for {}", args.input.display()))?;

    let paths = write_outputs(&output, &args.output_dir)
        .with_context(|| format!("could not write outputs to {}", args.output_dir.display()))?;

    log::info!(
        "Pipeline complete in {:.2}s: {} students, {} clusters",
        start_time.elapsed().as_secs_f64(),
        output.records.len(),
        output.segmentation.n_clusters
    );
    for path in [
        &paths.cleaned,
        &paths.by_academic_level,
        &paths.by_platform,
        &paths.clusters,
    ] {
        log::info!("  {}", path.display());
    }

    Ok(())
}
