//! Batch min-max scaling. Missing numeric values impute to zero before scaling;
//! a constant column scales to zero.

use super::FeatureMatrix;
use crate::records::RecordBatch;
use ndarray::{Array2, ArrayViewMut1};
use tracing::{debug, warn};

pub fn normalize(batch: &RecordBatch) -> FeatureMatrix {
    let columns = batch.numeric_columns();
    let mut values = Array2::<f64>::zeros((batch.len(), columns.len()));

    for (j, name) in columns.iter().enumerate() {
        let mut column = values.column_mut(j);
        for (cell, record) in column.iter_mut().zip(batch.records()) {
            *cell = record.get(name).as_number().unwrap_or(0.0);
        }
        if !min_max_scale(column) && !batch.is_empty() {
            debug!(column = %name, "constant column scaled to zero");
        }
    }

    if columns.is_empty() && !batch.is_empty() {
        warn!(records = batch.len(), "no numeric columns; models run trivially");
    }
    debug!(records = batch.len(), features = columns.len(), "normalized batch");
    FeatureMatrix::new(columns, values)
}

/// Rescale in place to [0, 1]. Returns false (column zeroed) when the range is degenerate.
pub fn min_max_scale(mut column: ArrayViewMut1<'_, f64>) -> bool {
    let min = column.iter().copied().fold(f64::INFINITY, f64::min);
    let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        column.fill(0.0);
        return false;
    }
    column.mapv_inplace(|x| (x - min) / range);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{FieldValue, Record};
    use ndarray::array;

    fn batch(rows: &[(Option<f64>, &str, f64)]) -> RecordBatch {
        rows.iter()
            .map(|(a, s, c)| {
                Record::new()
                    .with("a", a.map(FieldValue::Number).unwrap_or(FieldValue::Null))
                    .with("kind", FieldValue::Text(s.to_string()))
                    .with("c", FieldValue::Number(*c))
            })
            .collect()
    }

    #[test]
    fn scales_into_unit_range() {
        let m = normalize(&batch(&[(Some(2.0), "x", 5.0), (Some(4.0), "y", 5.0), (Some(10.0), "z", 5.0)]));
        assert_eq!(m.columns(), ["a", "c"]);
        assert_eq!(m.values().column(0), array![0.0, 0.25, 1.0]);
        // constant column
        assert_eq!(m.values().column(1), array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_values_impute_zero_before_scaling() {
        let m = normalize(&batch(&[(Some(5.0), "x", 1.0), (None, "y", 2.0), (Some(10.0), "z", 3.0)]));
        assert_eq!(m.values().column(0), array![0.5, 0.0, 1.0]);
    }

    #[test]
    fn min_maps_to_zero_max_to_one() {
        let mut col = array![-3.0, 7.0, 1.5, 2.0];
        assert!(min_max_scale(col.view_mut()));
        assert!(col.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(col[0], 0.0);
        assert_eq!(col[1], 1.0);
    }

    #[test]
    fn no_numeric_columns_yields_empty_features() {
        let b: RecordBatch = vec![Record::new().with("kind", FieldValue::Text("x".into()))]
            .into_iter()
            .collect();
        let m = normalize(&b);
        assert!(!m.has_features());
        assert_eq!(m.n_records(), 1);
    }

    #[test]
    fn empty_batch() {
        let m = normalize(&RecordBatch::default());
        assert_eq!(m.n_records(), 0);
        assert_eq!(m.n_features(), 0);
    }
}
