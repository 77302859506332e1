//! Fixed scoring policy, field names and clustering parameters

/// Field names the pipeline reads from the input table
pub mod fields {
    pub const STUDENT_ID: &str = "Student_ID";
    pub const AVG_DAILY_USAGE_HOURS: &str = "Avg_Daily_Usage_Hours";
    pub const SLEEP_HOURS_PER_NIGHT: &str = "Sleep_Hours_Per_Night";
    pub const MENTAL_HEALTH_SCORE: &str = "Mental_Health_Score";
    pub const ADDICTED_SCORE: &str = "Addicted_Score";
    pub const GENDER: &str = "Gender";
    pub const MOST_USED_PLATFORM: &str = "Most_Used_Platform";
    pub const ACADEMIC_LEVEL: &str = "Academic_Level";
    pub const COUNTRY: &str = "Country";

    /// Numeric fields repaired by the cleaner
    pub const NUMERIC: [&str; 4] = [
        AVG_DAILY_USAGE_HOURS,
        SLEEP_HOURS_PER_NIGHT,
        MENTAL_HEALTH_SCORE,
        ADDICTED_SCORE,
    ];

    /// Categorical fields trimmed and title-cased by the cleaner
    pub const TEXT: [&str; 4] = [GENDER, MOST_USED_PLATFORM, ACADEMIC_LEVEL, COUNTRY];

    pub const SLEEP_ADJUSTMENT: &str = "Sleep_Adjustment";
    pub const COMPUTED_ADDICTION_SCORE: &str = "computed_addiction_score";
    pub const ADDICTION_LEVEL: &str = "addiction_level";
    pub const CLUSTER: &str = "cluster";
}

/// Sleep below this many hours is penalised
pub const SLEEP_SHORT_HOURS: f64 = 6.0;
/// Sleep above this many hours earns a bonus
pub const SLEEP_LONG_HOURS: f64 = 8.0;
pub const SHORT_SLEEP_ADJUSTMENT: i64 = -5;
pub const LONG_SLEEP_ADJUSTMENT: i64 = 5;
pub const NEUTRAL_SLEEP_ADJUSTMENT: i64 = 0;

pub const USAGE_WEIGHT: f64 = 2.0;
pub const ADDICTED_SCORE_WEIGHT: f64 = 1.5;

/// Scores strictly above this are "High"
pub const HIGH_ADDICTION_THRESHOLD: f64 = 25.0;
/// Scores strictly above this (and not High) are "Medium"
pub const MEDIUM_ADDICTION_THRESHOLD: f64 = 15.0;

/// Label given to categorical cells that were empty in the input
pub const MISSING_CATEGORY: &str = "Unknown";

pub const DEFAULT_CLUSTERS: usize = 3;
pub const DEFAULT_SEED: u64 = 42;
pub const MAX_ITERATIONS: u64 = 300;
pub const TOLERANCE: f64 = 1e-4;
/// Independent K-Means restarts; the lowest-inertia run wins
pub const N_RUNS: usize = 10;

/// Output artifact file names
pub mod artifacts {
    pub const CLEANED: &str = "students_cleaned.csv";
    pub const BY_ACADEMIC_LEVEL: &str = "agg_by_academic_level.csv";
    pub const BY_PLATFORM: &str = "agg_by_platform.csv";
    pub const CLUSTERS: &str = "student_clusters.csv";
}

/// Parameters for the K-Means segmentation step
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Number of clusters
    pub clusters: usize,
    /// Seed for centroid initialisation
    pub seed: u64,
    pub max_iterations: u64,
    pub tolerance: f64,
    pub n_runs: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            seed: DEFAULT_SEED,
            max_iterations: MAX_ITERATIONS,
            tolerance: TOLERANCE,
            n_runs: N_RUNS,
        }
    }
}
