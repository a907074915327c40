use rayon::prelude::*;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{DatasetSource, RawJobRow, non_blank};
use crate::config::SnapshotConfig;
use crate::constants::source::{CSV_EXTENSION, PARQUET_EXTENSION};
use crate::errors::CareerError;

/// Dataset source reading every accepted shard file under a local directory.
///
/// Shards are decoded in parallel and concatenated in sorted path order, so
/// row order is stable across runs.
pub struct SnapshotSource {
    config: SnapshotConfig,
}

impl SnapshotSource {
    /// Create a source; nothing is read until `load_rows`.
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Accepted shard paths under the snapshot dir, sorted.
    pub fn shard_paths(&self) -> Result<Vec<PathBuf>, CareerError> {
        let root = &self.config.snapshot_dir;
        if !root.is_dir() {
            return Err(self.unavailable(format!(
                "snapshot_dir {} does not exist or is not a directory",
                root.display()
            )));
        }

        let accepted = self.config.normalized_extensions();
        let mut saw_parquet = false;
        let mut paths = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(ext) = entry.path().extension().and_then(|v| v.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext == PARQUET_EXTENSION {
                saw_parquet = true;
            }
            if accepted.contains(&ext) {
                paths.push(entry.path().to_path_buf());
            }
        }
        paths.sort();

        if paths.is_empty() {
            if saw_parquet {
                return Err(self.unavailable(format!(
                    "found parquet files under {}, but parquet shards need the `huggingface` feature and a `parquet` entry in shard_extensions",
                    root.display()
                )));
            }
            return Err(self.unavailable(format!(
                "no shard files found under {} with extensions {:?}",
                root.display(),
                self.config.shard_extensions
            )));
        }
        Ok(paths)
    }

    pub(crate) fn read_shard(&self, path: &Path) -> Result<Vec<RawJobRow>, CareerError> {
        let ext = path
            .extension()
            .and_then(|v| v.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            PARQUET_EXTENSION => self.read_parquet_shard(path),
            CSV_EXTENSION => self.read_csv_shard(path),
            _ => self.read_jsonl_shard(path),
        }
    }

    fn read_csv_shard(&self, path: &Path) -> Result<Vec<RawJobRow>, CareerError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|err| {
                self.unavailable(format!("failed opening csv shard {}: {err}", path.display()))
            })?;
        let headers = reader
            .headers()
            .map_err(|err| {
                self.inconsistent(format!(
                    "failed reading csv header of {}: {err}",
                    path.display()
                ))
            })?
            .clone();
        let columns = &self.config.columns;
        let index_of = |name: &str| headers.iter().position(|header| header.trim() == name);
        let (Some(person_idx), Some(title_idx)) =
            (index_of(&columns.person_id), index_of(&columns.job_title))
        else {
            return Err(self.inconsistent(format!(
                "csv shard {} lacks a '{}' or '{}' column",
                path.display(),
                columns.person_id,
                columns.job_title
            )));
        };
        let code_idx = index_of(&columns.job_code);
        let period_idx = index_of(&columns.start_period);

        let mut rows = Vec::new();
        for (position, record) in reader.records().enumerate() {
            let record = record.map_err(|err| {
                self.inconsistent(format!(
                    "failed decoding csv row {} in shard {}: {err}",
                    position + 1,
                    path.display()
                ))
            })?;
            let field = |idx: Option<usize>| idx.and_then(|idx| record.get(idx)).and_then(non_blank);
            rows.push(RawJobRow {
                person_id: field(Some(person_idx)),
                job_title: field(Some(title_idx)),
                job_code: field(code_idx),
                start_period: field(period_idx),
            });
        }
        debug!(
            "[career:snapshot] decoded {} csv rows from {}",
            rows.len(),
            path.display()
        );
        Ok(rows)
    }

    fn read_jsonl_shard(&self, path: &Path) -> Result<Vec<RawJobRow>, CareerError> {
        let file = File::open(path).map_err(|err| {
            self.unavailable(format!("failed opening shard {}: {err}", path.display()))
        })?;
        let mut rows = Vec::new();
        for (line_idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| {
                self.unavailable(format!(
                    "failed reading shard {} at line {}: {err}",
                    path.display(),
                    line_idx + 1
                ))
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = serde_json::from_str::<Value>(trimmed).map_err(|err| {
                self.inconsistent(format!(
                    "failed decoding JSON row from shard {} at line {}: {err}",
                    path.display(),
                    line_idx + 1
                ))
            })?;
            rows.push(self.decode_row(&value, path, line_idx + 1)?);
        }
        debug!(
            "[career:snapshot] decoded {} rows from {}",
            rows.len(),
            path.display()
        );
        Ok(rows)
    }

    #[cfg(feature = "huggingface")]
    fn read_parquet_shard(&self, path: &Path) -> Result<Vec<RawJobRow>, CareerError> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path).map_err(|err| {
            self.unavailable(format!(
                "failed opening parquet shard {}: {err}",
                path.display()
            ))
        })?;
        let reader = SerializedFileReader::new(file).map_err(|err| {
            self.unavailable(format!(
                "failed reading parquet shard {}: {err}",
                path.display()
            ))
        })?;
        let iter = reader.get_row_iter(None).map_err(|err| {
            self.unavailable(format!(
                "failed iterating parquet shard {}: {err}",
                path.display()
            ))
        })?;
        let mut rows = Vec::new();
        for (position, row_result) in iter.enumerate() {
            let row = row_result.map_err(|err| {
                self.unavailable(format!(
                    "failed reading parquet row {} in shard {}: {err}",
                    position,
                    path.display()
                ))
            })?;
            rows.push(self.decode_row(&row.to_json_value(), path, position + 1)?);
        }
        debug!(
            "[career:snapshot] decoded {} rows from {}",
            rows.len(),
            path.display()
        );
        Ok(rows)
    }

    #[cfg(not(feature = "huggingface"))]
    fn read_parquet_shard(&self, path: &Path) -> Result<Vec<RawJobRow>, CareerError> {
        Err(self.unavailable(format!(
            "cannot read parquet shard {} without the `huggingface` feature",
            path.display()
        )))
    }

    fn decode_row(
        &self,
        value: &Value,
        path: &Path,
        position: usize,
    ) -> Result<RawJobRow, CareerError> {
        RawJobRow::from_json(value, &self.config.columns).ok_or_else(|| {
            self.inconsistent(format!(
                "row {} in shard {} is not an object",
                position,
                path.display()
            ))
        })
    }

    fn unavailable(&self, reason: String) -> CareerError {
        CareerError::SourceUnavailable {
            source_id: self.config.source_id.clone(),
            reason,
        }
    }

    fn inconsistent(&self, details: String) -> CareerError {
        CareerError::SourceInconsistent {
            source_id: self.config.source_id.clone(),
            details,
        }
    }
}

impl DatasetSource for SnapshotSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError> {
        let started = Instant::now();
        let paths = self.shard_paths()?;
        info!(
            "[career:snapshot] reading {} shard(s) under {}",
            paths.len(),
            self.config.snapshot_dir.display()
        );

        let shards = paths
            .par_iter()
            .map(|path| self.read_shard(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows: Vec<RawJobRow> = shards.into_iter().flatten().collect();
        if let Some(max_rows) = self.config.max_rows {
            rows.truncate(max_rows);
        }
        info!(
            "[career:snapshot] read {} rows in {:.2}s",
            rows.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(rows)
    }
}
