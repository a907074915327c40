#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Reusable command-line runners shared by the demo binaries.
pub mod apps;
/// Load-once catalog cache with explicit refresh.
pub mod cache;
/// Queryable catalog built from one dataset load.
pub mod catalog;
/// Column mapping, ranking, and snapshot configuration.
pub mod config;
/// Centralized constants used across parsing, ranking, and sources.
pub mod constants;
/// Job records, sequenced records, and ranking result types.
pub mod data;
/// Row decoding and catalog loading.
pub mod ingest;
/// Two-step career path ranking.
pub mod paths;
/// Per-person ordering and neighbor labeling.
pub mod sequence;
/// Dataset source trait and built-in sources.
pub mod source;
/// Quarter/year period parsing.
pub mod timeline;
/// Direct transition ranking.
pub mod transitions;
/// Shared type aliases.
pub mod types;

mod errors;

pub use cache::CatalogCache;
pub use catalog::CareerCatalog;
pub use config::{DatasetColumns, RankingConfig, SnapshotConfig};
pub use data::{
    Direction, JobRecord, PathTable, Ranking, SequencedRecord, Transition, TransitionShare,
    TransitionTable, TwoStepPath,
};
pub use errors::CareerError;
pub use ingest::{DecodedRows, LoadReport, load_catalog};
pub use paths::rank_two_step_paths;
pub use sequence::{CareerTable, SequenceBuild, build_sequences};
pub use source::{DatasetSource, InMemorySource, RawJobRow, SnapshotSource};
#[cfg(feature = "huggingface")]
pub use source::{HuggingFaceConfig, HuggingFaceSource};
pub use timeline::{QuarterPeriod, parse_period, parse_start_value};
pub use transitions::rank_transitions;
pub use types::{ColumnName, JobCode, JobTitle, PeriodLabel, PersonId, SourceId};
