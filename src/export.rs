//! CSV output of the pipeline artifacts

use crate::config::artifacts;
use crate::data::{dataset_to_frame, Dataset};
use crate::pipeline::PipelineOutput;
use log::{info, warn};
use polars::prelude::{CsvWriter, SerWriter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".partial";

/// Write a table as UTF-8 CSV with a header row, in column order
pub fn write_table(dataset: &Dataset, output_path: &Path) -> crate::Result<()> {
    let mut df = dataset_to_frame(dataset)?;
    let mut file = File::create(output_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Paths of the four written artifacts
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub cleaned: PathBuf,
    pub by_academic_level: PathBuf,
    pub by_platform: PathBuf,
    pub clusters: PathBuf,
}

/// Write all pipeline artifacts into `output_dir`
///
/// Tables are first written under temporary names and only renamed into
/// place once all four succeeded. If a write or a rename fails, every
/// temporary file and every artifact already moved into place is removed.
///
/// # Arguments
/// * `output` - Result of a pipeline run
/// * `output_dir` - Directory to write into (created if needed)
pub fn write_outputs(output: &PipelineOutput, output_dir: &Path) -> crate::Result<OutputPaths> {
    fs::create_dir_all(output_dir)?;

    let paths = OutputPaths {
        cleaned: output_dir.join(artifacts::CLEANED),
        by_academic_level: output_dir.join(artifacts::BY_ACADEMIC_LEVEL),
        by_platform: output_dir.join(artifacts::BY_PLATFORM),
        clusters: output_dir.join(artifacts::CLUSTERS),
    };

    let tables = [
        (output.records.clone(), &paths.cleaned),
        (output.by_academic_level.to_dataset()?, &paths.by_academic_level),
        (output.by_platform.to_dataset()?, &paths.by_platform),
        (output.clusters.clone(), &paths.clusters),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (table, path) in &tables {
        let temp = temp_path(path);
        if let Err(e) = write_table(table, &temp) {
            warn!("Failed to write {}: {}", path.display(), e);
            let _ = fs::remove_file(&temp);
            discard(&written);
            return Err(e);
        }
        written.push(temp);
    }

    let mut renamed: Vec<PathBuf> = Vec::with_capacity(tables.len());
    for (index, ((_, path), temp)) in tables.iter().zip(&written).enumerate() {
        if let Err(e) = fs::rename(temp, path) {
            warn!("Failed to move {} into place: {}", path.display(), e);
            discard(&written[index..]);
            discard(&renamed);
            return Err(e.into());
        }
        renamed.push(path.to_path_buf());
    }
    for path in &renamed {
        info!("Wrote {}", path.display());
    }

    Ok(paths)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn discard(files: &[PathBuf]) {
    for file in files {
        if let Err(e) = fs::remove_file(file) {
            warn!("Could not remove {}: {}", file.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_dataset, Value};
    use tempfile::TempDir;

    #[test]
    fn test_write_table_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");
        let dataset = Dataset::new(
            vec!["Student_ID".to_string(), "score".to_string(), "note".to_string()],
            vec![
                vec![Value::from("7"), Value::Float(12.5), Value::Null],
                vec![Value::from("8"), Value::Int(3), Value::from("a, b")],
            ],
        )
        .unwrap();

        write_table(&dataset, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Student_ID,score,note"));

        let reloaded = load_dataset(&path).unwrap();
        assert_eq!(reloaded.columns(), dataset.columns());
        assert_eq!(reloaded.get(0, "score"), Some(&Value::from("12.5")));
        assert_eq!(reloaded.get(0, "note"), Some(&Value::Null));
        assert_eq!(reloaded.get(1, "note"), Some(&Value::from("a, b")));
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("out/a.csv")),
            PathBuf::from("out/a.csv.partial")
        );
    }
}
