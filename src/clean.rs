//! Deduplication, column/text normalisation and numeric repair

use crate::config::{fields, MISSING_CATEGORY};
use crate::data::{Dataset, Value};
use crate::error::PipelineError;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Clean a raw dataset
///
/// Steps, in order:
/// 1. Drop exact duplicate rows, keeping the first occurrence
/// 2. Trim whitespace around column names; two columns trimming to the
///    same name is a `DuplicateColumn` error
/// 3. Turn negative or unparseable numeric cells into missing values, then
///    fill missing cells with the median of the field's valid values
/// 4. Trim and title-case categorical text fields
/// 5. Drop rows that only became duplicates through steps 2-4
///
/// Fields absent from the dataset are skipped.
pub fn clean(raw: Dataset) -> crate::Result<Dataset> {
    let input_rows = raw.len();
    let mut dataset = drop_duplicates(raw);

    let mut names = HashSet::new();
    for name in dataset.columns_mut() {
        let trimmed = name.trim();
        if trimmed.len() != name.len() {
            *name = trimmed.to_string();
        }
        if !names.insert(name.clone()) {
            return Err(PipelineError::DuplicateColumn {
                field: name.clone(),
            });
        }
    }

    for field in fields::NUMERIC {
        if let Some(index) = dataset.column_index(field) {
            repair_numeric(&mut dataset, index, field)?;
        }
    }

    for field in fields::TEXT {
        if let Some(index) = dataset.column_index(field) {
            for row in dataset.rows_mut() {
                row[index] = Value::Text(normalize_text(&row[index]));
            }
        }
    }

    let dataset = drop_duplicates(dataset);
    info!(
        "Cleaned dataset: {} rows in, {} rows out",
        input_rows,
        dataset.len()
    );
    Ok(dataset)
}

/// Remove rows equal in every cell to an earlier row
fn drop_duplicates(mut dataset: Dataset) -> Dataset {
    let mut seen = HashSet::with_capacity(dataset.len());
    dataset.rows_mut().retain(|row| {
        let key: Vec<Option<String>> = row.iter().map(Value::render).collect();
        seen.insert(key)
    });
    dataset
}

/// Invalidate negatives and fill gaps with the field median
fn repair_numeric(dataset: &mut Dataset, index: usize, field: &str) -> crate::Result<()> {
    let mut invalid = 0usize;
    let parsed: Vec<Option<f64>> = dataset
        .column(index)
        .enumerate()
        .map(|(row, value)| {
            let number = value.as_f64();
            if number.is_none() && !value.is_null() {
                warn!("{}: unparseable value {:?} at row {}", field, value, row);
            }
            match number {
                Some(n) if n < 0.0 => {
                    invalid += 1;
                    None
                }
                other => other,
            }
        })
        .collect();

    let valid: Vec<f64> = parsed.iter().flatten().copied().collect();
    let missing = parsed.len() - valid.len();
    if missing == 0 {
        for (row, number) in dataset.rows_mut().iter_mut().zip(&parsed) {
            row[index] = Value::Float(number.unwrap_or_default());
        }
        return Ok(());
    }

    let fill = median(&valid).ok_or_else(|| {
        PipelineError::degenerate(format!(
            "field '{}' has no valid values to compute a median from",
            field
        ))
    })?;
    debug!(
        "{}: {} negative, {} missing in total, filled with median {}",
        field, invalid, missing, fill
    );

    for (row, number) in dataset.rows_mut().iter_mut().zip(parsed) {
        row[index] = Value::Float(number.unwrap_or(fill));
    }
    Ok(())
}

/// Median of a set of values; `None` when empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Stringify, trim and title-case a categorical cell
fn normalize_text(value: &Value) -> String {
    match value.render() {
        Some(text) => title_case(text.trim()),
        None => MISSING_CATEGORY.to_string(),
    }
}

/// Uppercase every letter that follows a non-letter, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn sample() -> Dataset {
        dataset(
            &[" Student_ID", "Sleep_Hours_Per_Night ", "Gender", "Most_Used_Platform"],
            vec![
                vec!["1".into(), "7".into(), " male".into(), "INSTAGRAM".into()],
                vec!["2".into(), "-2".into(), "FEMALE ".into(), "tiktok".into()],
                vec!["1".into(), "7".into(), " male".into(), "INSTAGRAM".into()],
                vec!["3".into(), Value::Null, Value::Null, "youtube".into()],
            ],
        )
    }

    #[test]
    fn test_clean_normalises_dataset() {
        let cleaned = clean(sample()).unwrap();

        assert_eq!(
            cleaned.columns(),
            &["Student_ID", "Sleep_Hours_Per_Night", "Gender", "Most_Used_Platform"]
        );
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned.get(0, "Gender"), Some(&Value::from("Male")));
        assert_eq!(cleaned.get(1, "Most_Used_Platform"), Some(&Value::from("Tiktok")));
        assert_eq!(cleaned.get(2, "Gender"), Some(&Value::from(MISSING_CATEGORY)));
        // 7 is the only valid sleep value left
        assert_eq!(cleaned.get(1, "Sleep_Hours_Per_Night"), Some(&Value::Float(7.0)));
        assert_eq!(cleaned.get(2, "Sleep_Hours_Per_Night"), Some(&Value::Float(7.0)));
    }

    #[test]
    fn test_median_imputation() {
        let raw = dataset(
            &["Student_ID", "Mental_Health_Score"],
            vec![
                vec!["a".into(), Value::Float(1.0)],
                vec!["b".into(), Value::Float(-1.0)],
                vec!["c".into(), Value::Float(3.0)],
                vec!["d".into(), Value::Null],
            ],
        );
        let cleaned = clean(raw).unwrap();

        let values: Vec<_> = cleaned.column(1).map(|v| v.as_f64().unwrap()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_no_negative_values_after_clean() {
        let raw = dataset(
            &["Avg_Daily_Usage_Hours", "Addicted_Score"],
            vec![
                vec!["-4.5".into(), "7".into()],
                vec!["3".into(), "-1".into()],
                vec!["abc".into(), "9".into()],
                vec!["5".into(), "5".into()],
            ],
        );
        let cleaned = clean(raw).unwrap();

        for value in cleaned.rows().iter().flatten() {
            assert!(value.as_f64().unwrap() >= 0.0);
        }
        assert_eq!(cleaned.get(0, "Avg_Daily_Usage_Hours"), Some(&Value::Float(4.0)));
        assert_eq!(cleaned.get(2, "Avg_Daily_Usage_Hours"), Some(&Value::Float(4.0)));
    }

    #[test]
    fn test_entirely_invalid_field_is_degenerate() {
        let raw = dataset(
            &["Addicted_Score"],
            vec![vec!["-1".into()], vec![Value::Null]],
        );
        assert!(matches!(
            clean(raw),
            Err(PipelineError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = clean(sample()).unwrap();
        let twice = clean(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rows_equal_after_normalisation_are_merged() {
        let raw = dataset(
            &["Student_ID", "Country"],
            vec![
                vec!["7".into(), "india".into()],
                vec!["7".into(), " INDIA ".into()],
            ],
        );
        assert_eq!(clean(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_trimmed_column_names_must_be_unique() {
        let raw = dataset(
            &["Country", " Country", "Student_ID"],
            vec![vec!["india".into(), "usa".into(), "1".into()]],
        );
        assert!(matches!(
            clean(raw),
            Err(PipelineError::DuplicateColumn { ref field }) if field == "Country"
        ));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("uNDERGRADUATE"), "Undergraduate");
        assert_eq!(title_case("high school"), "High School");
        assert_eq!(title_case("tik-tok"), "Tik-Tok");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case(""), "");
    }
}
