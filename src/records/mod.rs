//! Activity records: loosely typed rows with an open field set.
//! Loaded wholesale per analysis; annotations live alongside, never inside.

mod load;

pub use load::{load, parse_csv, parse_json, parse_ndjson};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

static NULL: FieldValue = FieldValue::Null;

/// One cell of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Display form used by the views; null renders as the empty string
    pub fn to_display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Single input row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Value of `name`, or `Null` when the record lacks the field
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// One analysis run's worth of records, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBatch {
    records: Vec<Record>,
}

impl RecordBatch {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of field names in first-seen order
    pub fn columns(&self) -> Vec<String> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for r in &self.records {
            seen.extend(r.field_names());
        }
        seen.into_iter().map(str::to_string).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.field_names().any(|f| f == name))
    }

    /// A column is numeric when every non-null value is a number.
    /// An all-null column counts as numeric and imputes to zero.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        self.has_column(name)
            && self
                .records
                .iter()
                .map(|r| r.get(name))
                .all(|v| matches!(v, FieldValue::Null | FieldValue::Number(_)))
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|c| self.is_numeric_column(c))
            .collect()
    }
}

impl FromIterator<Record> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// First alias, in priority order, that names a column of the batch
pub fn resolve_alias<'a>(columns: &[String], aliases: &'a [String]) -> Option<&'a str> {
    aliases
        .iter()
        .find(|a| columns.iter().any(|c| c == *a))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn aliases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alias_priority_follows_alias_order_not_column_order() {
        let columns = aliases(&["username", "activity", "user"]);
        let order = aliases(&["User", "user", "username", "actor", "employee"]);
        assert_eq!(resolve_alias(&columns, &order), Some("user"));
    }

    #[test]
    fn alias_missing() {
        let columns = aliases(&["activity"]);
        assert_eq!(resolve_alias(&columns, &aliases(&["user"])), None);
    }

    #[test]
    fn numeric_detection() {
        let batch = RecordBatch::new(vec![
            Record::new()
                .with("a", FieldValue::Number(1.0))
                .with("b", text("x"))
                .with("c", FieldValue::Null),
            Record::new()
                .with("a", FieldValue::Null)
                .with("b", FieldValue::Number(2.0))
                .with("c", FieldValue::Null),
        ]);
        assert_eq!(batch.columns(), vec!["a", "b", "c"]);
        assert_eq!(batch.numeric_columns(), vec!["a", "c"]);
        assert!(!batch.is_numeric_column("missing"));
    }

    #[test]
    fn missing_field_reads_null() {
        let r = Record::new().with("a", FieldValue::Number(1.0));
        assert!(r.get("b").is_null());
        assert_eq!(r.get("a").to_display(), "1");
    }
}
