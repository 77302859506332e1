//! Derived features: sleep adjustment, composite addiction score and risk level

use crate::config::{self, fields};
use crate::data::{Dataset, Value};
use crate::error::PipelineError;
use crate::model::Segmentation;
use log::info;
use std::fmt;

const STAGE: &str = "feature derivation";

/// Categorical addiction risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddictionLevel {
    Low,
    Medium,
    High,
}

impl AddictionLevel {
    /// Thresholds are strict: exactly 25 is Medium, exactly 15 is Low
    pub fn from_score(score: f64) -> Self {
        if score > config::HIGH_ADDICTION_THRESHOLD {
            AddictionLevel::High
        } else if score > config::MEDIUM_ADDICTION_THRESHOLD {
            AddictionLevel::Medium
        } else {
            AddictionLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddictionLevel::Low => "Low",
            AddictionLevel::Medium => "Medium",
            AddictionLevel::High => "High",
        }
    }
}

impl fmt::Display for AddictionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// -5 below 6 hours of sleep, +5 above 8 hours, 0 otherwise (6 and 8 included)
pub fn sleep_adjustment(sleep_hours: f64) -> i64 {
    if sleep_hours < config::SLEEP_SHORT_HOURS {
        config::SHORT_SLEEP_ADJUSTMENT
    } else if sleep_hours > config::SLEEP_LONG_HOURS {
        config::LONG_SLEEP_ADJUSTMENT
    } else {
        config::NEUTRAL_SLEEP_ADJUSTMENT
    }
}

/// Weighted usage plus weighted self-reported score plus sleep adjustment; unclamped
pub fn computed_addiction_score(usage_hours: f64, addicted_score: f64, adjustment: i64) -> f64 {
    usage_hours * config::USAGE_WEIGHT
        + addicted_score * config::ADDICTED_SCORE_WEIGHT
        + adjustment as f64
}

/// Features derived for a single row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub sleep_adjustment: i64,
    pub computed_addiction_score: f64,
    pub addiction_level: AddictionLevel,
}

impl DerivedFeatures {
    pub fn compute(usage_hours: f64, sleep_hours: f64, addicted_score: f64) -> Self {
        let sleep_adjustment = sleep_adjustment(sleep_hours);
        let computed_addiction_score =
            computed_addiction_score(usage_hours, addicted_score, sleep_adjustment);
        Self {
            sleep_adjustment,
            computed_addiction_score,
            addiction_level: AddictionLevel::from_score(computed_addiction_score),
        }
    }
}

/// A cleaned dataset extended with derived columns
///
/// `table` carries `Sleep_Adjustment`, `computed_addiction_score` and
/// `addiction_level` as regular columns (and `cluster` once clusters are
/// attached); `features` holds the same values typed, one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedDataset {
    table: Dataset,
    features: Vec<DerivedFeatures>,
}

impl DerivedDataset {
    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn features(&self) -> &[DerivedFeatures] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Merge cluster assignments in as a text `cluster` column
    pub fn attach_clusters(&mut self, segmentation: &Segmentation) -> crate::Result<()> {
        let labels = segmentation
            .labels()
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();
        self.table.push_column(fields::CLUSTER, labels)
    }

    pub fn into_table(self) -> Dataset {
        self.table
    }
}

/// Compute derived features for every row of a cleaned dataset
///
/// Usage hours, sleep hours and the self-reported addiction score are
/// mandatory: a missing column is a `MissingField` error and a missing
/// cell an `InvalidValue` error.
pub fn derive(ds: Dataset) -> crate::Result<DerivedDataset> {
    let usage = ds.require_column(fields::AVG_DAILY_USAGE_HOURS, STAGE)?;
    let sleep = ds.require_column(fields::SLEEP_HOURS_PER_NIGHT, STAGE)?;
    let addicted = ds.require_column(fields::ADDICTED_SCORE, STAGE)?;

    let features = ds
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            Ok(DerivedFeatures::compute(
                number(&cells[usage], fields::AVG_DAILY_USAGE_HOURS, row)?,
                number(&cells[sleep], fields::SLEEP_HOURS_PER_NIGHT, row)?,
                number(&cells[addicted], fields::ADDICTED_SCORE, row)?,
            ))
        })
        .collect::<crate::Result<Vec<_>>>()?;

    let mut table = ds;
    table.push_column(
        fields::SLEEP_ADJUSTMENT,
        features.iter().map(|f| Value::Int(f.sleep_adjustment)).collect(),
    )?;
    table.push_column(
        fields::COMPUTED_ADDICTION_SCORE,
        features
            .iter()
            .map(|f| Value::Float(f.computed_addiction_score))
            .collect(),
    )?;
    table.push_column(
        fields::ADDICTION_LEVEL,
        features
            .iter()
            .map(|f| Value::from(f.addiction_level.as_str()))
            .collect(),
    )?;

    let high = features
        .iter()
        .filter(|f| f.addiction_level == AddictionLevel::High)
        .count();
    info!("Derived features for {} rows ({} high risk)", features.len(), high);

    Ok(DerivedDataset { table, features })
}

fn number(value: &Value, field: &str, row: usize) -> crate::Result<f64> {
    value.as_f64().ok_or_else(|| PipelineError::InvalidValue {
        field: field.to_string(),
        row,
        reason: format!("expected a number, found {:?}", value),
    })
}
