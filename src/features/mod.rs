//! Feature normalization: numeric columns → min-max scaled matrix.

mod scaling;

pub use scaling::{min_max_scale, normalize};

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Scaled numeric features, one row per record, column order fixed per batch
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.ncols());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn n_records(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// True when the batch carried no numeric column; downstream models go trivial
    pub fn has_features(&self) -> bool {
        self.n_features() > 0
    }
}
