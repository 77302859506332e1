//! Grouped summary statistics over categorical dimensions

use crate::config::{fields, MISSING_CATEGORY};
use crate::data::{Dataset, Value};
use crate::features::{AddictionLevel, DerivedDataset};
use log::debug;
use std::collections::HashMap;

const STAGE: &str = "aggregation";

/// An extra per-group mean: source field and output column name
#[derive(Debug, Clone, Copy)]
pub struct MeanColumn {
    pub field: &'static str,
    pub alias: &'static str,
}

/// Summary statistics for one group
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// Group key value
    pub group: String,
    /// Mean computed addiction score
    pub avg_addiction: f64,
    /// Share of High rows, in percent
    pub pct_high_addiction: f64,
    /// One entry per extra mean column; `None` when the group had no numeric values
    pub extra_means: Vec<Option<f64>>,
    /// Number of rows in the group, including rows with a null `Student_ID`,
    /// so that counts over all groups add up to the dataset size
    pub count: usize,
}

/// Aggregate rows for one grouping key
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub key: String,
    /// Names of the extra mean columns, aligned with [`AggregateRow::extra_means`]
    pub extra_columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Total number of rows across all groups
    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn find(&self, group: &str) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.group == group)
    }

    /// Flatten into a writable table:
    /// key, avg_addiction, pct_high_addiction, extra means..., count
    pub fn to_dataset(&self) -> crate::Result<Dataset> {
        let mut columns = vec![
            self.key.clone(),
            "avg_addiction".to_string(),
            "pct_high_addiction".to_string(),
        ];
        columns.extend(self.extra_columns.iter().cloned());
        columns.push("count".to_string());

        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    Value::from(r.group.as_str()),
                    Value::Float(r.avg_addiction),
                    Value::Float(r.pct_high_addiction),
                ];
                cells.extend(r.extra_means.iter().map(|m| Value::from(*m)));
                cells.push(Value::Int(r.count as i64));
                cells
            })
            .collect();

        Dataset::new(columns, rows)
    }
}

#[derive(Default)]
struct GroupAccumulator {
    score_sum: f64,
    high: usize,
    count: usize,
    extra_sums: Vec<(f64, usize)>,
}

/// Group rows by the value of `key` and summarise each group
///
/// Groups appear in the order their key is first seen. Null keys form
/// their own group. `extra_means` whose field is absent are skipped.
/// `Student_ID` must be present since counts are per student row.
pub fn aggregate_by(
    ds: &DerivedDataset,
    key: &str,
    extra_means: &[MeanColumn],
) -> crate::Result<AggregateTable> {
    let table = ds.table();
    let key_index = table.require_column(key, STAGE)?;
    table.require_column(fields::STUDENT_ID, STAGE)?;

    let extras: Vec<(MeanColumn, usize)> = extra_means
        .iter()
        .filter_map(|m| match table.column_index(m.field) {
            Some(index) => Some((*m, index)),
            None => {
                debug!("Skipping {} for {}: field absent", m.alias, key);
                None
            }
        })
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for (cells, features) in table.rows().iter().zip(ds.features()) {
        let group = cells[key_index]
            .render()
            .unwrap_or_else(|| MISSING_CATEGORY.to_string());
        let acc = groups.entry(group.clone()).or_insert_with(|| {
            order.push(group);
            GroupAccumulator {
                extra_sums: vec![(0.0, 0); extras.len()],
                ..Default::default()
            }
        });

        acc.count += 1;
        acc.score_sum += features.computed_addiction_score;
        if features.addiction_level == AddictionLevel::High {
            acc.high += 1;
        }
        for ((_, index), (sum, n)) in extras.iter().zip(acc.extra_sums.iter_mut()) {
            if let Some(v) = cells[*index].as_f64() {
                *sum += v;
                *n += 1;
            }
        }
    }

    let rows = order
        .into_iter()
        .filter_map(|group| {
            let acc = groups.remove(&group)?;
            let size = acc.count as f64;
            Some(AggregateRow {
                avg_addiction: acc.score_sum / size,
                pct_high_addiction: acc.high as f64 / size * 100.0,
                extra_means: acc
                    .extra_sums
                    .iter()
                    .map(|&(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect(),
                count: acc.count,
                group,
            })
        })
        .collect();

    Ok(AggregateTable {
        key: key.to_string(),
        extra_columns: extras.iter().map(|(m, _)| m.alias.to_string()).collect(),
        rows,
    })
}

/// Summary per academic level, with mean sleep and mental-health score
pub fn aggregate_by_academic_level(ds: &DerivedDataset) -> crate::Result<AggregateTable> {
    aggregate_by(
        ds,
        fields::ACADEMIC_LEVEL,
        &[
            MeanColumn {
                field: fields::SLEEP_HOURS_PER_NIGHT,
                alias: "avg_sleep",
            },
            MeanColumn {
                field: fields::MENTAL_HEALTH_SCORE,
                alias: "avg_mental_health",
            },
        ],
    )
}

/// Summary per most-used platform, largest groups first
///
/// Groups of equal size keep their first-appearance order.
pub fn aggregate_by_platform(ds: &DerivedDataset) -> crate::Result<AggregateTable> {
    let mut table = aggregate_by(ds, fields::MOST_USED_PLATFORM, &[])?;
    table.rows.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(table)
}
