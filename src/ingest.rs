//! Dataset loading: raw rows to an immutable, queryable catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::CareerCatalog;
use crate::config::RankingConfig;
use crate::constants::ingest::UNORDERABLE_WARN_RATIO;
use crate::data::JobRecord;
use crate::errors::CareerError;
use crate::source::{DatasetSource, RawJobRow};
use crate::types::JobTitle;

/// Counters describing one dataset load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Rows returned by the source.
    pub rows_read: usize,
    /// Records that made it into sequences.
    pub records_kept: usize,
    /// Records whose start period could not be parsed.
    pub unorderable: usize,
    /// Rows skipped for lacking a person id or title.
    pub incomplete: usize,
    /// Persons with at least one sequenced record.
    pub persons: usize,
    /// Distinct non-blank titles across all rows.
    pub distinct_titles: usize,
    /// When the catalog was built.
    pub loaded_at: DateTime<Utc>,
}

/// Rows decoded into records, plus what was left out.
#[derive(Clone, Debug, Default)]
pub struct DecodedRows {
    /// Rows with both a person id and a title.
    pub records: Vec<JobRecord>,
    /// Rows skipped for lacking a person id or title.
    pub incomplete: usize,
    /// Titles of skipped rows that had a title but no person id.
    pub orphan_titles: Vec<JobTitle>,
}

/// Convert raw rows into records, dropping rows without a person or title.
pub fn records_from_rows(rows: Vec<RawJobRow>) -> DecodedRows {
    let mut decoded = DecodedRows {
        records: Vec::with_capacity(rows.len()),
        ..DecodedRows::default()
    };
    for (idx, row) in rows.into_iter().enumerate() {
        let orphan_title = row
            .person_id
            .is_none()
            .then(|| row.job_title.clone())
            .flatten()
            .filter(|title| !title.trim().is_empty());
        match row.into_record() {
            Some(record) => {
                if record.start_value.is_none() {
                    debug!(
                        "[career:load] row {} has unparseable start period '{}'",
                        idx, record.start_period
                    );
                }
                decoded.records.push(record);
            }
            None => {
                debug!("[career:load] row {} lacks a person id or title", idx);
                decoded.incomplete += 1;
                decoded.orphan_titles.extend(orphan_title);
            }
        }
    }
    decoded
}

/// Load every row from `source` and build a catalog.
///
/// Source failures propagate; per-row data problems are only counted.
pub fn load_catalog(
    source: &dyn DatasetSource,
    ranking: RankingConfig,
) -> Result<CareerCatalog, CareerError> {
    let started = Instant::now();
    ranking.validate()?;
    let rows = source.load_rows()?;
    let rows_read = rows.len();
    let decoded = records_from_rows(rows);
    let catalog = CareerCatalog::build(decoded.records, ranking)?.with_ingest(
        rows_read,
        decoded.incomplete,
        decoded.orphan_titles,
    );

    let report = catalog.report();
    info!(
        "[career:load] source='{}' rows={} kept={} unorderable={} incomplete={} persons={} titles={} in {:.2}s",
        source.id(),
        report.rows_read,
        report.records_kept,
        report.unorderable,
        report.incomplete,
        report.persons,
        report.distinct_titles,
        started.elapsed().as_secs_f64()
    );
    if rows_read == 0 {
        warn!("[career:load] source='{}' returned no rows", source.id());
    } else if report.unorderable as f64 / rows_read as f64 > UNORDERABLE_WARN_RATIO {
        warn!(
            "[career:load] source='{}' has {} of {} rows without a parseable start period",
            source.id(),
            report.unorderable,
            rows_read
        );
    }
    Ok(catalog)
}
