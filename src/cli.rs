//! Command-line interface definitions and argument parsing

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

/// Score social-media addiction risk and segment students with K-Means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data/students_social_media_addiction.csv")]
    pub input: PathBuf,

    /// Directory receiving the output tables
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Log level used unless `RUST_LOG` overrides it
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
