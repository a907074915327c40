use std::path::PathBuf;

use crate::constants::{columns, ranking, source};
use crate::errors::CareerError;
use crate::types::{ColumnName, SourceId};

/// Column names used to read a JobHop-shaped table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetColumns {
    /// Column holding the opaque person identifier.
    pub person_id: ColumnName,
    /// Column holding the normalized job label.
    pub job_title: ColumnName,
    /// Column holding the occupation classification code.
    pub job_code: ColumnName,
    /// Column holding the raw `Q<d> <yyyy>` start period.
    pub start_period: ColumnName,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            person_id: columns::PERSON_ID.to_string(),
            job_title: columns::MATCHED_LABEL.to_string(),
            job_code: columns::MATCHED_CODE.to_string(),
            start_period: columns::START_DATE.to_string(),
        }
    }
}

/// Controls the size of ranked query results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankingConfig {
    /// Max number of ranked entries returned per query.
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: ranking::DEFAULT_TOP_K,
        }
    }
}

impl RankingConfig {
    /// Reject configurations that can never produce a ranked entry.
    pub fn validate(&self) -> Result<(), CareerError> {
        if self.top_k == 0 {
            return Err(CareerError::Configuration(
                "ranking top_k must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a dataset read from local shard files.
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Stable source id used in errors and logs.
    pub source_id: SourceId,
    /// Directory scanned (recursively) for shard files.
    pub snapshot_dir: PathBuf,
    /// File extensions accepted as shard files.
    pub shard_extensions: Vec<String>,
    /// Optional cap on the number of rows read across all shards.
    pub max_rows: Option<usize>,
    /// Column mapping applied to every row.
    pub columns: DatasetColumns,
}

impl SnapshotConfig {
    /// Create a config reading every supported shard under `snapshot_dir`.
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        let mut shard_extensions: Vec<String> = source::JSONL_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect();
        shard_extensions.push(source::CSV_EXTENSION.to_string());
        if cfg!(feature = "huggingface") {
            shard_extensions.push(source::PARQUET_EXTENSION.to_string());
        }
        Self {
            source_id: source::DEFAULT_SNAPSHOT_SOURCE_ID.to_string(),
            snapshot_dir: snapshot_dir.into(),
            shard_extensions,
            max_rows: None,
            columns: DatasetColumns::default(),
        }
    }

    /// Override the source id.
    pub fn with_source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Lowercased extensions with any leading dot removed.
    pub(crate) fn normalized_extensions(&self) -> Vec<String> {
        self.shard_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_config_rejects_zero_top_k() {
        assert!(RankingConfig::default().validate().is_ok());
        let err = RankingConfig { top_k: 0 }.validate().unwrap_err();
        assert!(matches!(err, CareerError::Configuration(_)));
    }

    #[test]
    fn normalized_extensions_trims_dots_and_lowercases() {
        let mut config = SnapshotConfig::new("/tmp/none");
        config.shard_extensions = vec![".JSONL".into(), " ndjson ".into(), ".".into()];
        assert_eq!(config.normalized_extensions(), vec!["jsonl", "ndjson"]);
    }
}
