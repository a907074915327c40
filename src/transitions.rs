//! Transition ranking for one job title.

use indexmap::IndexMap;

use crate::constants::ranking::PERCENT_DECIMALS;
use crate::data::{Direction, Ranking, TransitionShare, TransitionTable};
use crate::sequence::CareerTable;

/// Rank the neighbors of `source_job` in `direction`.
///
/// Only records titled exactly `source_job` (case-sensitive) with a neighbor
/// in `direction` are counted. Percentages use that filtered count as the
/// denominator, so truncated tables may sum to less than 100. Entries are
/// ordered by raw count (highest first), then by target title. Counts that
/// round to the same percentage still keep their count order; only equal
/// counts fall back to the title. A `top_k` of zero is treated as one.
pub fn rank_transitions(
    table: &CareerTable,
    source_job: &str,
    direction: Direction,
    top_k: usize,
) -> Ranking<TransitionTable> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    let mut total = 0usize;
    for entry in table.records() {
        if entry.job_title() != source_job {
            continue;
        }
        let Some(target) = entry.neighbor(direction) else {
            continue;
        };
        *counts.entry(target).or_default() += 1;
        total += 1;
    }

    if total == 0 {
        return Ranking::InsufficientData;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_k.max(1));

    let entries = ranked
        .into_iter()
        .map(|(target, count)| TransitionShare {
            target_job: target.to_string(),
            count,
            percentage: share_percentage(count, total),
        })
        .collect();

    Ranking::Ranked(TransitionTable {
        source_job: source_job.to_string(),
        direction,
        total,
        entries,
    })
}

/// `count / total * 100` rounded to one decimal place.
pub(crate) fn share_percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let scale = 10f64.powi(PERCENT_DECIMALS);
    let raw = count as f64 / total as f64 * 100.0;
    (raw * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::JobRecord;
    use crate::sequence::build_sequences;

    fn table(rows: &[(&str, &str, &str)]) -> CareerTable {
        build_sequences(
            rows.iter()
                .map(|(person, title, period)| JobRecord::new(*person, *title, "", *period))
                .collect(),
        )
        .table
    }

    #[test]
    fn cook_waiter_cook_counts_each_direction_once() {
        let table = table(&[
            ("1", "Cook", "Q1 2019"),
            ("1", "Waiter", "Q3 2019"),
            ("1", "Cook", "Q1 2020"),
        ]);

        let forward = rank_transitions(&table, "Cook", Direction::Forward, 5)
            .into_ranked()
            .expect("forward ranking");
        assert_eq!(forward.total, 1);
        assert_eq!(forward.entries.len(), 1);
        assert_eq!(forward.entries[0].target_job, "Waiter");
        assert_eq!(forward.entries[0].percentage, 100.0);

        let reverse = rank_transitions(&table, "Cook", Direction::Reverse, 5)
            .into_ranked()
            .expect("reverse ranking");
        assert_eq!(reverse.total, 1);
        assert_eq!(reverse.entries[0].target_job, "Waiter");
        assert_eq!(reverse.entries[0].percentage, 100.0);
    }

    #[test]
    fn no_matching_transitions_is_insufficient_data() {
        let table = table(&[("1", "Cook", "Q1 2019"), ("2", "Waiter", "Q1 2019")]);
        assert!(rank_transitions(&table, "Cook", Direction::Forward, 5).is_insufficient());
        assert!(rank_transitions(&table, "Pilot", Direction::Reverse, 5).is_insufficient());
    }

    #[test]
    fn title_match_is_case_sensitive() {
        let table = table(&[("1", "Cook", "Q1 2019"), ("1", "Waiter", "Q2 2019")]);
        assert!(rank_transitions(&table, "cook", Direction::Forward, 5).is_insufficient());
    }

    #[test]
    fn ranks_by_count_then_title_and_truncates() {
        let table = table(&[
            ("1", "Cook", "Q1 2019"),
            ("1", "Chef", "Q2 2019"),
            ("2", "Cook", "Q1 2019"),
            ("2", "Chef", "Q2 2019"),
            ("3", "Cook", "Q1 2019"),
            ("3", "Waiter", "Q2 2019"),
            ("4", "Cook", "Q1 2019"),
            ("4", "Baker", "Q2 2019"),
        ]);
        let ranked = rank_transitions(&table, "Cook", Direction::Forward, 2)
            .into_ranked()
            .unwrap();
        assert_eq!(ranked.total, 4);
        let targets: Vec<&str> = ranked
            .entries
            .iter()
            .map(|entry| entry.target_job.as_str())
            .collect();
        assert_eq!(targets, vec!["Chef", "Baker"]);
        assert_eq!(ranked.entries[0].percentage, 50.0);
        assert_eq!(ranked.entries[1].percentage, 25.0);
        assert!(ranked.percentage_sum() <= 100.0);
    }

    #[test]
    fn equal_rounded_percentages_keep_count_order() {
        let mut rows = Vec::new();
        for idx in 0..2001 {
            let person = idx.to_string();
            let next = if idx < 1001 { "Baker" } else { "Angler" };
            rows.push(JobRecord::new(person.clone(), "Cook", "", "Q1 2019"));
            rows.push(JobRecord::new(person, next, "", "Q2 2019"));
        }
        let table = build_sequences(rows).table;
        let ranked = rank_transitions(&table, "Cook", Direction::Forward, 5)
            .into_ranked()
            .unwrap();
        let entries: Vec<(&str, usize, f64)> = ranked
            .entries
            .iter()
            .map(|entry| (entry.target_job.as_str(), entry.count, entry.percentage))
            .collect();
        assert_eq!(entries, vec![("Baker", 1001, 50.0), ("Angler", 1000, 50.0)]);
    }

    #[test]
    fn zero_top_k_keeps_one_entry() {
        let table = table(&[("1", "Cook", "Q1 2019"), ("1", "Chef", "Q2 2019")]);
        let ranked = rank_transitions(&table, "Cook", Direction::Forward, 0)
            .into_ranked()
            .unwrap();
        assert_eq!(ranked.entries.len(), 1);
    }

    #[test]
    fn share_percentage_rounds_to_one_decimal() {
        assert_eq!(share_percentage(1, 3), 33.3);
        assert_eq!(share_percentage(2, 3), 66.7);
        assert_eq!(share_percentage(1, 8), 12.5);
        assert_eq!(share_percentage(0, 0), 0.0);
    }
}
