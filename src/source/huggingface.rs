use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::snapshot::SnapshotSource;
use super::{DatasetSource, RawJobRow};
use crate::config::{DatasetColumns, SnapshotConfig};
use crate::constants::source::{
    JOBHOP_DATASET, JOBHOP_PARQUET_REVISION, JOBHOP_TRAIN_FILE, REMOTE_URL_PREFIX,
};
use crate::errors::CareerError;
use crate::types::SourceId;

/// Configuration for a dataset file fetched from the Hugging Face Hub.
#[derive(Clone, Debug)]
pub struct HuggingFaceConfig {
    /// Stable source id used in errors and logs.
    pub source_id: SourceId,
    /// Hugging Face dataset id, e.g. `aida-ugent/JobHop`.
    pub dataset: String,
    /// File path inside the dataset repo, or `url::<direct url>`.
    pub file: String,
    /// Optional repo revision (branch, tag, or ref).
    pub revision: Option<String>,
    /// Local directory the fetched file is materialized into.
    pub snapshot_dir: PathBuf,
    /// Reuse an already materialized file instead of fetching again.
    pub reuse_materialized: bool,
    /// Optional cap on the number of rows read.
    pub max_rows: Option<usize>,
    /// Column mapping applied to every row.
    pub columns: DatasetColumns,
}

impl HuggingFaceConfig {
    /// Create a config for `file` of `dataset`, materialized under `snapshot_dir`.
    pub fn new(
        source_id: impl Into<SourceId>,
        dataset: impl Into<String>,
        file: impl Into<String>,
        snapshot_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            dataset: dataset.into(),
            file: file.into(),
            revision: None,
            snapshot_dir: snapshot_dir.into(),
            reuse_materialized: true,
            max_rows: None,
            columns: DatasetColumns::default(),
        }
    }

    /// Train split of the JobHop dataset (hub parquet conversion).
    pub fn jobhop_train(snapshot_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::new("jobhop_train", JOBHOP_DATASET, JOBHOP_TRAIN_FILE, snapshot_dir);
        config.revision = Some(JOBHOP_PARQUET_REVISION.to_string());
        config
    }
}

/// Dataset source that materializes one hub file locally, then decodes it.
pub struct HuggingFaceSource {
    config: HuggingFaceConfig,
    reader: SnapshotSource,
}

impl HuggingFaceSource {
    /// Validate `config`; nothing is fetched until `load_rows` or `materialize`.
    pub fn new(config: HuggingFaceConfig) -> Result<Self, CareerError> {
        if config.file.trim().is_empty() {
            return Err(CareerError::Configuration(
                "huggingface source file must not be empty".to_string(),
            ));
        }
        if config.dataset.trim().is_empty() && !config.file.starts_with(REMOTE_URL_PREFIX) {
            return Err(CareerError::Configuration(
                "huggingface source dataset must be set for hub files".to_string(),
            ));
        }
        let mut snapshot = SnapshotConfig::new(&config.snapshot_dir)
            .with_source_id(config.source_id.clone());
        snapshot.columns = config.columns.clone();
        snapshot.max_rows = config.max_rows;
        Ok(Self {
            config,
            reader: SnapshotSource::new(snapshot),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &HuggingFaceConfig {
        &self.config
    }

    /// Local path the configured file is materialized to.
    pub fn target_path(&self) -> PathBuf {
        if let Some(url) = self.config.file.strip_prefix(REMOTE_URL_PREFIX) {
            let suffix = url
                .split("/resolve/")
                .nth(1)
                .or_else(|| url.rsplit('/').next())
                .map(|value| value.trim_start_matches('/'))
                .filter(|value| !value.is_empty())
                .unwrap_or("remote_shard.parquet");
            return self.config.snapshot_dir.join(suffix);
        }
        self.config.snapshot_dir.join(&self.config.file)
    }

    /// Fetch the configured file unless a materialized copy can be reused.
    pub fn materialize(&self) -> Result<PathBuf, CareerError> {
        let target = self.target_path();
        if self.config.reuse_materialized && target.is_file() {
            info!(
                "[career:hf] reusing materialized file {}",
                target.display()
            );
            return Ok(target);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                self.unavailable(format!(
                    "failed creating snapshot subdir {}: {err}",
                    parent.display()
                ))
            })?;
        }
        match self.config.file.strip_prefix(REMOTE_URL_PREFIX) {
            Some(url) => self.download_url(url, &target)?,
            None => self.download_from_hub(&target)?,
        }
        Ok(target)
    }

    fn download_url(&self, url: &str, target: &Path) -> Result<(), CareerError> {
        let temp_target = target.with_extension("part");
        if temp_target.exists() {
            let _ = fs::remove_file(&temp_target);
        }

        let response = ureq::get(url)
            .call()
            .map_err(|err| self.unavailable(format!("failed downloading URL '{url}': {err}")))?;
        let mut reader = response.into_body().into_reader();
        let mut file = File::create(&temp_target).map_err(|err| {
            self.unavailable(format!(
                "failed creating target file {}: {err}",
                temp_target.display()
            ))
        })?;
        info!("[career:hf] downloading {} -> {}", url, target.display());

        let started = Instant::now();
        let mut last_report = Instant::now();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 1024 * 1024];
        loop {
            let read = reader
                .read(&mut buffer)
                .map_err(|err| self.unavailable(format!("failed reading stream '{url}': {err}")))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read]).map_err(|err| {
                self.unavailable(format!(
                    "failed writing target file {}: {err}",
                    temp_target.display()
                ))
            })?;
            total_bytes = total_bytes.saturating_add(read as u64);
            if last_report.elapsed() >= Duration::from_secs(2) {
                info!(
                    "[career:hf] download progress {}: {:.1} MiB ({:.1}s)",
                    target.display(),
                    total_bytes as f64 / (1024.0 * 1024.0),
                    started.elapsed().as_secs_f64()
                );
                last_report = Instant::now();
            }
        }
        info!(
            "[career:hf] download complete {}: {:.1} MiB in {:.1}s",
            target.display(),
            total_bytes as f64 / (1024.0 * 1024.0),
            started.elapsed().as_secs_f64()
        );

        fs::rename(&temp_target, target).map_err(|err| {
            self.unavailable(format!(
                "failed moving downloaded file {} -> {}: {err}",
                temp_target.display(),
                target.display()
            ))
        })
    }

    fn download_from_hub(&self, target: &Path) -> Result<(), CareerError> {
        let api = ApiBuilder::new()
            .with_progress(true)
            .with_retries(5)
            .build()
            .map_err(|err| self.unavailable(format!("failed building hf-hub client: {err}")))?;
        let repo = match &self.config.revision {
            Some(revision) => Repo::with_revision(
                self.config.dataset.clone(),
                RepoType::Dataset,
                revision.clone(),
            ),
            None => Repo::new(self.config.dataset.clone(), RepoType::Dataset),
        };
        let cached = api.repo(repo).get(&self.config.file).map_err(|err| {
            self.unavailable(format!(
                "failed downloading '{}' from hf-hub dataset '{}': {err}",
                self.config.file, self.config.dataset
            ))
        })?;
        if !cached.exists() {
            return Err(self.unavailable(format!(
                "hf-hub returned non-existent cache file for '{}' at {}",
                self.config.file,
                cached.display()
            )));
        }

        let resolved = fs::canonicalize(&cached).unwrap_or(cached);
        if target.exists() {
            warn!(
                "[career:hf] replacing materialized file {}",
                target.display()
            );
            fs::remove_file(target).map_err(|err| {
                self.unavailable(format!(
                    "failed replacing target file {}: {err}",
                    target.display()
                ))
            })?;
        }
        fs::copy(&resolved, target).map_err(|err| {
            self.unavailable(format!(
                "failed copying cached file {} -> {}: {err}",
                resolved.display(),
                target.display()
            ))
        })?;
        Ok(())
    }

    fn unavailable(&self, reason: String) -> CareerError {
        CareerError::SourceUnavailable {
            source_id: self.config.source_id.clone(),
            reason,
        }
    }
}

impl DatasetSource for HuggingFaceSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError> {
        let target = self.materialize()?;
        let mut rows = self.reader.read_shard(&target)?;
        if let Some(max_rows) = self.config.max_rows {
            rows.truncate(max_rows);
        }
        info!(
            "[career:hf] loaded {} rows from {}",
            rows.len(),
            target.display()
        );
        Ok(rows)
    }
}
