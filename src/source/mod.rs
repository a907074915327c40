//! Dataset source interfaces and row decoding.
//!
//! Ownership model:
//! - `DatasetSource` produces raw rows; it owns fetching and decoding only.
//! - `RawJobRow` is the source-agnostic row contract, independent of shard
//!   format and column naming.
//! - Turning rows into records and sequences belongs to `ingest`.

use serde_json::Value;

use crate::config::DatasetColumns;
use crate::data::JobRecord;
use crate::errors::CareerError;
use crate::types::SourceId;

/// Hugging Face Hub backed source (shard download + snapshot read).
#[cfg(feature = "huggingface")]
pub mod huggingface;
/// Local shard-directory source.
pub mod snapshot;

#[cfg(feature = "huggingface")]
pub use huggingface::{HuggingFaceConfig, HuggingFaceSource};
pub use snapshot::SnapshotSource;

/// One dataset row mapped onto the JobHop columns.
///
/// Fields are `None` when the column is missing, null, or blank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawJobRow {
    /// Person identifier, stringified.
    pub person_id: Option<String>,
    /// Normalized job label.
    pub job_title: Option<String>,
    /// Classification code.
    pub job_code: Option<String>,
    /// Raw period label.
    pub start_period: Option<String>,
}

impl RawJobRow {
    /// Map a JSON object row through `columns`.
    ///
    /// Rows wrapped as `{"row": {...}}` (the datasets-server layout) are
    /// unwrapped first. Returns `None` when the payload is not an object.
    pub fn from_json(value: &Value, columns: &DatasetColumns) -> Option<Self> {
        let payload = value.get("row").unwrap_or(value);
        let object = payload.as_object()?;
        let field = |name: &str| object.get(name).and_then(value_to_text);
        Some(Self {
            person_id: field(&columns.person_id),
            job_title: field(&columns.job_title),
            job_code: field(&columns.job_code),
            start_period: field(&columns.start_period),
        })
    }

    /// Build a record, or `None` when the person id or title is missing.
    ///
    /// A missing code becomes empty; a missing period leaves the record
    /// unorderable.
    pub fn into_record(self) -> Option<JobRecord> {
        let person_id = self.person_id?;
        let job_title = self.job_title?;
        Some(JobRecord::new(
            person_id,
            job_title,
            self.job_code.unwrap_or_default(),
            self.start_period.unwrap_or_default(),
        ))
    }
}

impl From<JobRecord> for RawJobRow {
    fn from(record: JobRecord) -> Self {
        Self {
            person_id: Some(record.person_id),
            job_title: Some(record.job_title),
            job_code: Some(record.job_code),
            start_period: Some(record.start_period),
        }
    }
}

/// `Some(text)` unless `text` is empty or whitespace.
pub(crate) fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Convert a JSON scalar into non-empty text when possible.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => non_blank(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Supplier of the raw dataset table.
///
/// A load either returns every row or fails as a whole; there is no partial
/// result. Retry policy, if any, belongs to the implementation.
pub trait DatasetSource: Send + Sync {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Fetch and decode all rows.
    fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError>;
}

impl<S: DatasetSource + ?Sized> DatasetSource for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError> {
        (**self).load_rows()
    }
}

/// In-memory dataset source for tests and small datasets.
pub struct InMemorySource {
    id: SourceId,
    rows: Vec<RawJobRow>,
}

impl InMemorySource {
    /// Create a source from prebuilt rows.
    pub fn new(id: impl Into<SourceId>, rows: Vec<RawJobRow>) -> Self {
        Self {
            id: id.into(),
            rows,
        }
    }

    /// Create a source from complete records.
    pub fn from_records(id: impl Into<SourceId>, records: Vec<JobRecord>) -> Self {
        Self::new(id, records.into_iter().map(RawJobRow::from).collect())
    }
}

impl DatasetSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError> {
        Ok(self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_default_columns_and_stringifies_numbers() {
        let value = json!({
            "person_id": 42,
            "matched_label": "cook",
            "matched_code": "5120.1",
            "start_date": "Q2 2017",
            "end_date": "Q4 2018"
        });
        let row = RawJobRow::from_json(&value, &DatasetColumns::default()).unwrap();
        assert_eq!(row.person_id.as_deref(), Some("42"));
        assert_eq!(row.job_title.as_deref(), Some("cook"));
        assert_eq!(row.job_code.as_deref(), Some("5120.1"));
        assert_eq!(row.start_period.as_deref(), Some("Q2 2017"));
    }

    #[test]
    fn from_json_unwraps_row_envelope_and_blanks() {
        let value = json!({"row": {"person_id": "p1", "matched_label": "  ", "start_date": null}});
        let row = RawJobRow::from_json(&value, &DatasetColumns::default()).unwrap();
        assert_eq!(row.person_id.as_deref(), Some("p1"));
        assert_eq!(row.job_title, None);
        assert_eq!(row.start_period, None);
        assert!(row.into_record().is_none());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(RawJobRow::from_json(&json!([1, 2]), &DatasetColumns::default()).is_none());
    }

    #[test]
    fn from_json_honors_custom_columns() {
        let columns = DatasetColumns {
            person_id: "pid".into(),
            job_title: "title".into(),
            job_code: "code".into(),
            start_period: "start".into(),
        };
        let value = json!({"pid": 7, "title": "Nurse", "start": "Q1 2020"});
        let record = RawJobRow::from_json(&value, &columns)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.person_id, "7");
        assert_eq!(record.job_code, "");
        assert_eq!(record.start_value, Some(2020.0));
    }

    #[test]
    fn in_memory_source_round_trips_records() {
        let source = InMemorySource::from_records(
            "mem",
            vec![JobRecord::new("1", "Cook", "5120", "Q1 2019")],
        );
        assert_eq!(source.id(), "mem");
        let rows = source.load_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_code.as_deref(), Some("5120"));
    }
}
