//! Two-step career paths (`step_1 -> step_2 -> destination`).
//!
//! For each transition into the destination, the person's own history is
//! searched for episodes titled like the captured predecessor that have a
//! predecessor themselves. When a person holds the predecessor title more
//! than once, every such episode matches, so chains can be counted more than
//! once for that person. The ranking keeps those multiplicities.

use indexmap::IndexMap;

use crate::data::{PathTable, Ranking, TwoStepPath};
use crate::sequence::CareerTable;

/// Rank the most frequent two-step paths ending at `destination_job`.
///
/// Entries are ordered by count (highest first), then by `(step_1, step_2)`.
/// A `top_k` of zero is treated as one.
pub fn rank_two_step_paths(
    table: &CareerTable,
    destination_job: &str,
    top_k: usize,
) -> Ranking<PathTable> {
    let mut counts: IndexMap<(&str, &str), usize> = IndexMap::new();
    let mut total_paths = 0usize;

    let arrivals = table.records().iter().filter_map(|entry| {
        if entry.job_title() != destination_job {
            return None;
        }
        let previous = entry.previous_job_label.as_deref()?;
        Some((entry.person_id(), previous))
    });

    for (person_id, previous) in arrivals {
        for earlier in table.person_records(person_id) {
            if earlier.job_title() != previous {
                continue;
            }
            let Some(step_1) = earlier.previous_job_label.as_deref() else {
                continue;
            };
            *counts.entry((step_1, earlier.job_title())).or_default() += 1;
            total_paths += 1;
        }
    }

    if total_paths == 0 {
        return Ranking::InsufficientData;
    }

    let mut ranked: Vec<((&str, &str), usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_k.max(1));

    let entries = ranked
        .into_iter()
        .map(|((step_1, step_2), count)| TwoStepPath {
            step_1: step_1.to_string(),
            step_2: step_2.to_string(),
            destination: destination_job.to_string(),
            count,
        })
        .collect();

    Ranking::Ranked(PathTable {
        destination_job: destination_job.to_string(),
        total_paths,
        entries,
    })
}
