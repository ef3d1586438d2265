//! Aggregate summary computation.

use crate::model::CellValue;
use crate::model::Column;
use crate::model::Row;
use crate::model::SummaryType;

/// Computes the summary row for a set of rows.
///
/// Each column contributes one cell according to its `summary_type`:
/// - `sum`: sum of numeric cells (strings are parsed; failures skipped),
/// - `avg`: mean of numeric cells, rounded to 2 decimals,
/// - `count`: the row count (ignores cell contents),
/// - `min`/`max`: over numeric cells; an empty set yields 0.
///
/// Returns `None` when no column declares an aggregate.
pub fn summarize(rows: &[Row], columns: &[Column]) -> Option<Row> {
    let mut summary = Row::new();
    let mut any = false;

    for col in columns {
        let value = match col.summary_type {
            SummaryType::None => continue,
            SummaryType::Count => CellValue::Int(rows.len() as i64),
            SummaryType::Sum => CellValue::Float(numeric_cells(rows, &col.key).sum()),
            SummaryType::Avg => {
                let values: Vec<f64> = numeric_cells(rows, &col.key).collect();
                if values.is_empty() {
                    CellValue::Float(0.0)
                } else {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    CellValue::Float(round2(mean))
                }
            }
            SummaryType::Min => CellValue::Float(
                numeric_cells(rows, &col.key).fold(None, |acc: Option<f64>, x| {
                    Some(acc.map_or(x, |a| a.min(x)))
                }).unwrap_or(0.0),
            ),
            SummaryType::Max => CellValue::Float(
                numeric_cells(rows, &col.key).fold(None, |acc: Option<f64>, x| {
                    Some(acc.map_or(x, |a| a.max(x)))
                }).unwrap_or(0.0),
            ),
        };
        summary.insert(col.key.clone(), value);
        any = true;
    }

    any.then_some(summary)
}

fn numeric_cells<'a>(rows: &'a [Row], key: &'a str) -> impl Iterator<Item = f64> + 'a {
    rows.iter().filter_map(move |row| row.get_number(key))
}

/// Rounds to 2 decimal places.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
