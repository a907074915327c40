use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for dataset loading, configuration, and IO failures.
///
/// Data-quality problems in individual rows are not errors: unparseable
/// periods are counted in the load report and the affected rows are left out
/// of sequence construction.
#[derive(Debug, Error)]
pub enum CareerError {
    /// The dataset could not be fetched or opened. Fatal for that load.
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Source that failed.
        source_id: SourceId,
        /// What went wrong.
        reason: String,
    },
    /// The dataset was reachable but its content could not be decoded.
    #[error("data source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        /// Source that failed.
        source_id: SourceId,
        /// What could not be decoded.
        details: String,
    },
    /// Filesystem failure outside a specific source.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
}
