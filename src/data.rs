//! Tabular data model and CSV loading using Polars

use crate::error::PipelineError;
use polars::prelude::*;
use std::fmt;
use std::path::Path;

/// A single cell of the dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell; `None` for nulls, NaN and unparseable text
    pub fn as_f64(&self) -> Option<f64> {
        let number = match self {
            Value::Null => return None,
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (!number.is_nan()).then_some(number)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text written to CSV; `None` is an empty cell
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{:?}", f)),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render().as_deref().unwrap_or(""))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Ordered rows sharing one set of named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset; every row must have one cell per column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> crate::Result<Self> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(PipelineError::InvalidValue {
                field: "<row>".to_string(),
                row,
                reason: format!("expected {} cells, found {}", columns.len(), cells.len()),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Dataset::column_index`] but absence is a `MissingField` error for `stage`
    pub fn require_column(&self, name: &str, stage: &'static str) -> crate::Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::missing_field(name, stage))
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Cell lookup by row number and column name
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    /// Append a column; `values` must hold one cell per row
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> crate::Result<()> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::InvalidValue {
                field: name.to_string(),
                row: values.len().min(self.rows.len()),
                reason: format!(
                    "column has {} cells but dataset has {} rows",
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[&str], stage: &'static str) -> crate::Result<Dataset> {
        let indices = names
            .iter()
            .map(|name| self.require_column(name, stage))
            .collect::<crate::Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Dataset {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows,
        })
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [String] {
        &mut self.columns
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }
}

/// Load a CSV file into a [`Dataset`]
///
/// Every column is read as text so the raw cells pass through untouched;
/// numeric interpretation happens in the cleaner. Empty cells become
/// [`Value::Null`].
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * The loaded dataset, or `NotFound` when the file does not exist
pub fn load_dataset(file_path: &Path) -> crate::Result<Dataset> {
    if !file_path.exists() {
        return Err(PipelineError::NotFound {
            path: file_path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()?;

    frame_to_dataset(&df)
}

/// Convert a Polars frame into row-major cells
fn frame_to_dataset(df: &DataFrame) -> crate::Result<Dataset> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows: Vec<Vec<Value>> = (0..df.height())
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();

    for series in df.get_columns() {
        let text = series.cast(&DataType::String)?;
        for (row, cell) in rows.iter_mut().zip(text.str()?.into_iter()) {
            row.push(match cell {
                Some(s) if !s.is_empty() => Value::Text(s.to_string()),
                _ => Value::Null,
            });
        }
    }

    Dataset::new(columns, rows)
}

/// Convert a [`Dataset`] into a Polars frame of text columns
pub(crate) fn dataset_to_frame(dataset: &Dataset) -> crate::Result<DataFrame> {
    let series = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<Option<String>> =
                dataset.column(index).map(Value::render).collect();
            Series::new(name.as_str(), cells)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(series)?)
}
