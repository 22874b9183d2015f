//! Record loaders: CSV with header row, JSON array of objects, NDJSON.

use super::{FieldValue, Record, RecordBatch};
use crate::error::{Error, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Cell spellings read as missing
const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// Load a whole batch from `path`, format chosen by extension
pub fn load(path: &Path) -> Result<RecordBatch> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let batch = match ext.as_str() {
        "csv" => parse_csv(std::fs::File::open(path).map_err(io_err)?)?,
        "json" => parse_json(&std::fs::read_to_string(path).map_err(io_err)?)?,
        "ndjson" | "jsonl" => parse_ndjson(&std::fs::read_to_string(path).map_err(io_err)?)?,
        other => return Err(Error::UnsupportedFormat(other.to_string())),
    };
    tracing::debug!(path = %path.display(), records = batch.len(), "loaded records");
    Ok(batch)
}

fn csv_cell(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if NA_VALUES.contains(&trimmed) {
        return FieldValue::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => FieldValue::Number(n),
        Ok(_) => FieldValue::Null,
        Err(_) => FieldValue::Text(raw.to_string()),
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<RecordBatch> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = Record::new();
        for (i, name) in headers.iter().enumerate() {
            let value = row.get(i).map(csv_cell).unwrap_or(FieldValue::Null);
            record.insert(name, value);
        }
        records.push(record);
    }
    Ok(RecordBatch::new(records))
}

fn json_value(v: Value) -> FieldValue {
    match v {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
        Value::String(s) => FieldValue::Text(s),
        nested => FieldValue::Text(nested.to_string()),
    }
}

fn json_record(v: Value) -> Result<Record> {
    let Value::Object(map) = v else {
        return Err(Error::UnsupportedFormat("expected a json object per record".into()));
    };
    let mut record = Record::new();
    for (k, v) in map {
        record.insert(k, json_value(v));
    }
    Ok(record)
}

pub fn parse_json(data: &str) -> Result<RecordBatch> {
    let Value::Array(items) = serde_json::from_str::<Value>(data)? else {
        return Err(Error::UnsupportedFormat("expected a json array of records".into()));
    };
    items.into_iter().map(json_record).collect()
}

pub fn parse_ndjson(data: &str) -> Result<RecordBatch> {
    data.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| json_record(serde_json::from_str(l)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_types_cells() {
        let data = "user,activity,riskScore,bytes\nalice,login,2.5,\nbob,upload,NaN,10\n";
        let batch = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        let first = &batch.records()[0];
        assert_eq!(first.get("user"), &FieldValue::Text("alice".into()));
        assert_eq!(first.get("riskScore"), &FieldValue::Number(2.5));
        assert!(first.get("bytes").is_null());
        assert!(batch.records()[1].get("riskScore").is_null());
        assert_eq!(batch.numeric_columns(), vec!["riskScore", "bytes"]);
    }

    #[test]
    fn csv_short_rows_fill_null() {
        let data = "a,b,c\n1,2\n";
        let batch = parse_csv(data.as_bytes()).unwrap();
        assert!(batch.records()[0].get("c").is_null());
    }

    #[test]
    fn json_array() {
        let batch = parse_json(r#"[{"user":"a","n":1,"ok":true,"tags":[1,2]},{"user":null,"n":2.5}]"#)
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[0].get("ok"), &FieldValue::Bool(true));
        assert_eq!(batch.records()[0].get("tags"), &FieldValue::Text("[1,2]".into()));
        assert!(batch.records()[1].get("user").is_null());
        assert_eq!(batch.columns(), vec!["user", "n", "ok", "tags"]);
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(matches!(parse_json(r#"{"a":1}"#), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn ndjson_skips_blank_lines() {
        let batch = parse_ndjson("{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, "a\n1\n2\n").unwrap();
        assert_eq!(load(&path).unwrap().len(), 2);

        let other = dir.path().join("records.xml");
        std::fs::write(&other, "<a/>").unwrap();
        assert!(matches!(load(&other), Err(Error::UnsupportedFormat(_))));

        let missing = dir.path().join("missing.csv");
        assert!(matches!(load(&missing), Err(Error::Io { .. })));
    }
}
