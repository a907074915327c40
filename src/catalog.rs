//! Query interface over one immutable, sequenced dataset load.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::config::RankingConfig;
use crate::data::{Direction, JobRecord, PathTable, Ranking, TransitionTable};
use crate::errors::CareerError;
use crate::ingest::LoadReport;
use crate::paths::rank_two_step_paths;
use crate::sequence::{CareerTable, build_sequences};
use crate::transitions::rank_transitions;
use crate::types::JobTitle;

/// Sequenced dataset plus the title list, shared read-only by all queries.
///
/// Every query is a pure function of the catalog and its arguments, so a
/// catalog can be wrapped in an `Arc` and queried from many threads.
#[derive(Clone, Debug)]
pub struct CareerCatalog {
    table: CareerTable,
    titles: Vec<JobTitle>,
    ranking: RankingConfig,
    report: LoadReport,
}

impl CareerCatalog {
    /// Sequence `records` and index their titles.
    ///
    /// Titles of unorderable records are still listed: they appear in the
    /// dataset even though they take part in no transition.
    pub fn build(records: Vec<JobRecord>, ranking: RankingConfig) -> Result<Self, CareerError> {
        ranking.validate()?;
        let rows_read = records.len();
        let titles: Vec<JobTitle> = records
            .iter()
            .map(|record| record.job_title.as_str())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let build = build_sequences(records);
        let report = LoadReport {
            rows_read,
            records_kept: build.table.len(),
            unorderable: build.unorderable,
            incomplete: 0,
            persons: build.table.person_count(),
            distinct_titles: titles.len(),
            loaded_at: Utc::now(),
        };
        Ok(Self {
            table: build.table,
            titles,
            ranking,
            report,
        })
    }

    /// Attach row counts observed before records were built, and list the
    /// titles of rows that never became records.
    pub(crate) fn with_ingest(
        mut self,
        rows_read: usize,
        incomplete: usize,
        orphan_titles: Vec<JobTitle>,
    ) -> Self {
        self.report.rows_read = rows_read;
        self.report.incomplete = incomplete;
        if !orphan_titles.is_empty() {
            self.titles.extend(orphan_titles);
            self.titles.sort_unstable();
            self.titles.dedup();
            self.report.distinct_titles = self.titles.len();
        }
        self
    }

    /// Every distinct title, sorted by byte-wise string order
    /// (so `"Cook" < "Waiter" < "cook"`).
    pub fn list_job_titles(&self) -> &[JobTitle] {
        &self.titles
    }

    /// Whether `job_title` occurs in the dataset (case-sensitive).
    pub fn contains_title(&self, job_title: &str) -> bool {
        self.titles
            .binary_search_by(|title| title.as_str().cmp(job_title))
            .is_ok()
    }

    /// Rank next (forward) or previous (reverse) titles of `job_title`.
    pub fn rank_transitions(
        &self,
        job_title: &str,
        direction: Direction,
        top_k: usize,
    ) -> Ranking<TransitionTable> {
        rank_transitions(&self.table, job_title, direction, top_k)
    }

    /// [`Self::rank_transitions`] with the configured `top_k`.
    pub fn rank_transitions_default(
        &self,
        job_title: &str,
        direction: Direction,
    ) -> Ranking<TransitionTable> {
        self.rank_transitions(job_title, direction, self.ranking.top_k)
    }

    /// Rank the most common two-step paths into `job_title`.
    pub fn rank_two_step_paths(&self, job_title: &str, top_k: usize) -> Ranking<PathTable> {
        rank_two_step_paths(&self.table, job_title, top_k)
    }

    /// [`Self::rank_two_step_paths`] with the configured `top_k`.
    pub fn rank_two_step_paths_default(&self, job_title: &str) -> Ranking<PathTable> {
        self.rank_two_step_paths(job_title, self.ranking.top_k)
    }

    /// Sequenced records backing every query.
    pub fn table(&self) -> &CareerTable {
        &self.table
    }

    /// Ranking defaults used by the `*_default` queries.
    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    /// Counters describing how the dataset was loaded.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
