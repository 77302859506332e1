//! K-Means segmentation of students into behavioural clusters

use crate::config::{fields, SegmenterConfig};
use crate::error::PipelineError;
use crate::features::DerivedDataset;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use log::info;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::collections::{HashMap, HashSet};
use std::fmt;

const STAGE: &str = "segmentation";

/// Number of features per student: score, sleep hours, mental-health score
pub const N_FEATURES: usize = 3;

/// Cluster identifier; only stable for a fixed seed and input, carries no ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of segmenting a dataset
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Student IDs in dataset order
    pub student_ids: Vec<String>,
    /// Cluster for each row, aligned with `student_ids`
    labels: Vec<ClusterId>,
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster centroids in feature space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares (inertia)
    pub inertia: f64,
}

impl Segmentation {
    pub fn labels(&self) -> &[ClusterId] {
        &self.labels
    }

    /// Student ID to cluster mapping
    pub fn assignments(&self) -> HashMap<&str, ClusterId> {
        self.student_ids
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
            .collect()
    }

    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for label in &self.labels {
            if label.0 < self.n_clusters {
                sizes[label.0] += 1;
            }
        }
        sizes
    }
}

/// Build the feature matrix: (computed score, sleep hours, mental-health score)
///
/// Missing sleep or mental-health values count as 0 here only; the
/// dataset itself is not modified.
pub fn feature_matrix(ds: &DerivedDataset) -> crate::Result<Array2<f64>> {
    let table = ds.table();
    let sleep = table.column_index(fields::SLEEP_HOURS_PER_NIGHT);
    let mental = table.column_index(fields::MENTAL_HEALTH_SCORE);

    let mut data = Vec::with_capacity(ds.len() * N_FEATURES);
    for (cells, features) in table.rows().iter().zip(ds.features()) {
        let local = |index: Option<usize>| {
            index
                .and_then(|i| cells[i].as_f64())
                .unwrap_or(0.0)
        };
        data.extend_from_slice(&[
            features.computed_addiction_score,
            local(sleep),
            local(mental),
        ]);
    }

    Array2::from_shape_vec((ds.len(), N_FEATURES), data)
        .map_err(|e| PipelineError::degenerate(format!("feature matrix: {}", e)))
}

/// Partition students into `config.clusters` groups with K-Means
///
/// Centroids are initialised from a generator seeded with `config.seed`, so
/// the same input rows in the same order always get the same labels.
///
/// # Returns
/// * `Segmentation` with one label per row, or `DegenerateInput` when there
///   are fewer distinct feature vectors than clusters
pub fn segment(ds: &DerivedDataset, config: &SegmenterConfig) -> crate::Result<Segmentation> {
    let id_index = ds.table().require_column(fields::STUDENT_ID, STAGE)?;
    let features = feature_matrix(ds)?;

    if config.clusters == 0 {
        return Err(PipelineError::degenerate("number of clusters must be positive"));
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::degenerate("feature matrix contains non-finite values"));
    }
    let distinct = count_distinct_points(&features);
    if distinct < config.clusters {
        return Err(PipelineError::degenerate(format!(
            "{} distinct feature vectors cannot form {} clusters",
            distinct, config.clusters
        )));
    }

    let rng = Xoshiro256Plus::seed_from_u64(config.seed);
    let dataset = DatasetBase::from(features.clone());
    let model = KMeans::params_with(config.clusters, rng, L2Dist)
        .n_runs(config.n_runs)
        .max_n_iterations(config.max_iterations)
        .tolerance(config.tolerance)
        .fit(&dataset)?;

    let labels: Array1<usize> = model.predict(&features);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(&features, &labels, &centroids);

    let student_ids = ds
        .table()
        .column(id_index)
        .map(|v| v.render().unwrap_or_default())
        .collect();

    let segmentation = Segmentation {
        student_ids,
        labels: labels.iter().map(|&l| ClusterId(l)).collect(),
        n_clusters: config.clusters,
        centroids,
        inertia,
    };
    info!(
        "Segmented {} students into {} clusters (sizes {:?}, inertia {:.2})",
        ds.len(),
        config.clusters,
        segmentation.cluster_sizes(),
        inertia
    );
    Ok(segmentation)
}

/// Distinct rows, with -0.0 and 0.0 treated as equal
fn count_distinct_points(features: &Array2<f64>) -> usize {
    features
        .outer_iter()
        .map(|row| row.iter().map(|v| (v + 0.0).to_bits()).collect::<Vec<_>>())
        .collect::<HashSet<_>>()
        .len()
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            inertia += features
                .row(i)
                .iter()
                .zip(centroids.row(cluster).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }

    inertia
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Value};
    use crate::features::derive;

    /// Three well separated groups of students
    fn create_test_dataset() -> DerivedDataset {
        let columns = [
            fields::STUDENT_ID,
            fields::AVG_DAILY_USAGE_HOURS,
            fields::SLEEP_HOURS_PER_NIGHT,
            fields::ADDICTED_SCORE,
            fields::MENTAL_HEALTH_SCORE,
        ];
        let points = [
            (1.0, 8.5, 2.0, 9.0),
            (1.5, 8.2, 2.0, 8.0),
            (1.2, 8.8, 3.0, 9.0),
            (5.0, 6.5, 5.0, 6.0),
            (5.5, 7.0, 6.0, 6.0),
            (4.8, 6.8, 5.0, 5.0),
            (9.0, 4.0, 9.0, 3.0),
            (8.5, 4.5, 9.0, 2.0),
            (9.5, 4.2, 8.0, 3.0),
        ];
        let rows = points
            .iter()
            .enumerate()
            .map(|(i, &(usage, sleep, addicted, mental))| {
                vec![
                    Value::Text(format!("S{}", i)),
                    Value::Float(usage),
                    Value::Float(sleep),
                    Value::Float(addicted),
                    Value::Float(mental),
                ]
            })
            .collect();
        let ds = Dataset::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap();
        derive(ds).unwrap()
    }

    #[test]
    fn test_segment() {
        let ds = create_test_dataset();
        let segmentation = segment(&ds, &SegmenterConfig::default()).unwrap();

        assert_eq!(segmentation.n_clusters, 3);
        assert_eq!(segmentation.labels().len(), 9);
        assert_eq!(segmentation.centroids.shape(), &[3, 3]);
        assert!(segmentation.labels().iter().all(|l| l.0 < 3));
        assert!(segmentation.inertia >= 0.0 && segmentation.inertia.is_finite());

        // each well separated triple lands in one cluster
        let labels = segmentation.labels();
        for group in labels.chunks(3) {
            assert!(group.iter().all(|l| *l == group[0]));
        }
        let distinct: HashSet<_> = labels.iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn test_segment_is_deterministic() {
        let ds = create_test_dataset();
        let config = SegmenterConfig::default();

        let first = segment(&ds, &config).unwrap();
        let second = segment(&ds, &config).unwrap();
        assert_eq!(first.assignments(), second.assignments());
    }

    #[test]
    fn test_cluster_sizes() {
        let ds = create_test_dataset();
        let segmentation = segment(&ds, &SegmenterConfig::default()).unwrap();

        let sizes = segmentation.cluster_sizes();
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes.iter().sum::<usize>(), 9);
    }

    #[test]
    fn test_signed_zero_is_not_distinct() {
        let features = Array2::from_shape_vec(
            (3, 3),
            vec![10.0, 7.0, 0.0, 10.0, 7.0, -0.0, 12.0, 7.0, 0.0],
        )
        .unwrap();
        assert_eq!(count_distinct_points(&features), 2);
    }

    #[test]
    fn test_too_few_distinct_points() {
        let ds = create_test_dataset();
        let config = SegmenterConfig {
            clusters: 10,
            ..SegmenterConfig::default()
        };
        assert!(matches!(
            segment(&ds, &config),
            Err(PipelineError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_missing_features_are_zero_locally() {
        let ds = Dataset::new(
            vec![
                fields::STUDENT_ID.to_string(),
                fields::AVG_DAILY_USAGE_HOURS.to_string(),
                fields::SLEEP_HOURS_PER_NIGHT.to_string(),
                fields::ADDICTED_SCORE.to_string(),
            ],
            vec![vec![
                Value::from("S1"),
                Value::Float(2.0),
                Value::Float(7.0),
                Value::Float(4.0),
            ]],
        )
        .unwrap();
        let derived = derive(ds).unwrap();

        let matrix = feature_matrix(&derived).unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![10.0, 7.0, 0.0]);
        assert!(derived.table().column_index(fields::MENTAL_HEALTH_SCORE).is_none());
    }
}
