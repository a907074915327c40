//! Per-person chronological sequences.
//!
//! Records are moved into one table, stable-sorted by `(person_id,
//! start_value)` in place, and each person's contiguous run is linked to its
//! neighbors. Nothing links across run boundaries, so neighbor labels always
//! belong to the same person.

use std::collections::HashMap;
use std::ops::Range;

use crate::data::{Direction, JobRecord, SequencedRecord, Transition};
use crate::types::PersonId;

/// Output of [`build_sequences`].
#[derive(Clone, Debug)]
pub struct SequenceBuild {
    /// Sequenced records of every orderable episode.
    pub table: CareerTable,
    /// Records dropped because their period could not be parsed.
    pub unorderable: usize,
}

/// Immutable table of sequenced records grouped by person.
///
/// Records of one person are contiguous and ascending by `start_value`.
#[derive(Clone, Debug, Default)]
pub struct CareerTable {
    records: Vec<SequencedRecord>,
    persons: HashMap<PersonId, Range<usize>>,
}

/// Build per-person sequences from raw episode records.
///
/// Records with a missing `start_value` are excluded. Ties on `start_value`
/// keep input order.
pub fn build_sequences(records: Vec<JobRecord>) -> SequenceBuild {
    let total = records.len();
    let mut orderable: Vec<JobRecord> = records
        .into_iter()
        .filter(|record| record.start_value.is_some())
        .collect();
    let unorderable = total - orderable.len();

    // `sort_by` is stable, which keeps input order for equal start values.
    orderable.sort_by(|a, b| {
        a.person_id.cmp(&b.person_id).then_with(|| {
            let left = a.start_value.unwrap_or(f64::NEG_INFINITY);
            let right = b.start_value.unwrap_or(f64::NEG_INFINITY);
            left.total_cmp(&right)
        })
    });

    let mut persons = HashMap::new();
    let mut run_start = 0usize;
    for idx in 1..=orderable.len() {
        let run_ends =
            idx == orderable.len() || orderable[idx].person_id != orderable[run_start].person_id;
        if run_ends {
            persons.insert(orderable[run_start].person_id.clone(), run_start..idx);
            run_start = idx;
        }
    }

    let mut links = Vec::with_capacity(orderable.len());
    for range in persons_in_order(&persons) {
        for idx in range.clone() {
            let previous_job_label =
                (idx > range.start).then(|| orderable[idx - 1].job_title.clone());
            let next_job_label =
                (idx + 1 < range.end).then(|| orderable[idx + 1].job_title.clone());
            links.push((previous_job_label, next_job_label));
        }
    }

    let sequenced: Vec<SequencedRecord> = orderable
        .into_iter()
        .zip(links)
        .map(
            |(record, (previous_job_label, next_job_label))| SequencedRecord {
                record,
                previous_job_label,
                next_job_label,
            },
        )
        .collect();

    SequenceBuild {
        table: CareerTable {
            records: sequenced,
            persons,
        },
        unorderable,
    }
}

/// Person ranges sorted by start offset (the table's physical order).
fn persons_in_order(persons: &HashMap<PersonId, Range<usize>>) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = persons.values().cloned().collect();
    ranges.sort_by_key(|range| range.start);
    ranges
}

impl CareerTable {
    /// All sequenced records, grouped by person.
    pub fn records(&self) -> &[SequencedRecord] {
        &self.records
    }

    /// Number of sequenced records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record could be sequenced.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct persons with at least one orderable record.
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    /// Person ids in table order.
    pub fn persons(&self) -> impl Iterator<Item = &str> {
        persons_in_order(&self.persons)
            .into_iter()
            .map(move |range| self.records[range.start].person_id())
    }

    /// Chronological sequence of one person (empty for unknown ids).
    pub fn person_records(&self, person_id: &str) -> &[SequencedRecord] {
        self.persons
            .get(person_id)
            .map(|range| &self.records[range.clone()])
            .unwrap_or(&[])
    }

    /// Every adjacent-pair transition viewed from `direction`.
    ///
    /// Forward yields `(title -> next)`, reverse yields `(previous -> title)`;
    /// both views describe the same set of pairs.
    pub fn transitions(&self, direction: Direction) -> impl Iterator<Item = Transition> + '_ {
        self.records.iter().filter_map(move |entry| {
            let neighbor = entry.neighbor(direction)?.to_string();
            let title = entry.job_title().to_string();
            Some(match direction {
                Direction::Forward => Transition {
                    from_job: title,
                    to_job: neighbor,
                },
                Direction::Reverse => Transition {
                    from_job: neighbor,
                    to_job: title,
                },
            })
        })
    }

    /// Drop the derived neighbor fields and return the base records.
    pub fn into_job_records(self) -> Vec<JobRecord> {
        self.records.into_iter().map(|entry| entry.record).collect()
    }

    /// Rebuild sequences from this table's own base records.
    ///
    /// Base fields are left untouched; only neighbor fields are recomputed.
    pub fn resequence(self) -> CareerTable {
        build_sequences(self.into_job_records()).table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(person: &str, title: &str, period: &str) -> JobRecord {
        JobRecord::new(person, title, "", period)
    }

    fn titles(records: &[SequencedRecord]) -> Vec<&str> {
        records.iter().map(|entry| entry.job_title()).collect()
    }

    #[test]
    fn sorts_each_person_chronologically() {
        let build = build_sequences(vec![
            record("1", "Cook", "Q1 2020"),
            record("1", "Dishwasher", "Q1 2019"),
            record("1", "Waiter", "Q3 2019"),
        ]);
        assert_eq!(build.unorderable, 0);
        let seq = build.table.person_records("1");
        assert_eq!(titles(seq), vec!["Dishwasher", "Waiter", "Cook"]);
        assert_eq!(seq[0].previous_job_label, None);
        assert_eq!(seq[0].next_job_label.as_deref(), Some("Waiter"));
        assert_eq!(seq[1].previous_job_label.as_deref(), Some("Dishwasher"));
        assert_eq!(seq[1].next_job_label.as_deref(), Some("Cook"));
        assert_eq!(seq[2].next_job_label, None);
    }

    #[test]
    fn neighbors_never_cross_person_boundaries() {
        let build = build_sequences(vec![
            record("a", "Cook", "Q1 2019"),
            record("b", "Nurse", "Q2 2019"),
            record("a", "Chef", "Q3 2019"),
            record("b", "Doctor", "Q4 2019"),
        ]);
        let a = build.table.person_records("a");
        let b = build.table.person_records("b");
        assert_eq!(a[0].previous_job_label, None);
        assert_eq!(a[1].next_job_label, None);
        assert_eq!(b[0].previous_job_label, None);
        assert_eq!(b[0].next_job_label.as_deref(), Some("Doctor"));
        assert_eq!(build.table.person_count(), 2);
    }

    #[test]
    fn equal_start_values_keep_input_order() {
        let build = build_sequences(vec![
            record("1", "First", "Q2 2018"),
            record("1", "Second", "Q2 2018"),
            record("1", "Earlier", "Q1 2018"),
        ]);
        let seq = build.table.person_records("1");
        assert_eq!(titles(seq), vec!["Earlier", "First", "Second"]);
    }

    #[test]
    fn unorderable_records_are_excluded_and_counted() {
        let build = build_sequences(vec![
            record("1", "Cook", "Q1 2019"),
            record("1", "Mystery", "unknown"),
            record("1", "Waiter", "Q2 2019"),
        ]);
        assert_eq!(build.unorderable, 1);
        let seq = build.table.person_records("1");
        assert_eq!(titles(seq), vec!["Cook", "Waiter"]);
        assert_eq!(seq[0].next_job_label.as_deref(), Some("Waiter"));
    }

    #[test]
    fn person_with_only_unorderable_records_disappears() {
        let build = build_sequences(vec![record("ghost", "Cook", "n/a")]);
        assert!(build.table.is_empty());
        assert_eq!(build.table.person_count(), 0);
        assert!(build.table.person_records("ghost").is_empty());
    }

    #[test]
    fn transitions_forward_and_reverse_describe_same_pairs() {
        let build = build_sequences(vec![
            record("1", "Cook", "Q1 2019"),
            record("1", "Waiter", "Q3 2019"),
            record("1", "Cook", "Q1 2020"),
        ]);
        let mut forward: Vec<Transition> = build.table.transitions(Direction::Forward).collect();
        let mut reverse: Vec<Transition> = build.table.transitions(Direction::Reverse).collect();
        forward.sort_by(|a, b| (&a.from_job, &a.to_job).cmp(&(&b.from_job, &b.to_job)));
        reverse.sort_by(|a, b| (&a.from_job, &a.to_job).cmp(&(&b.from_job, &b.to_job)));
        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn resequence_keeps_base_fields() {
        let build = build_sequences(vec![
            record("2", "Intern", "Q1 2020"),
            record("1", "Cook", "Q3 2019"),
            record("2", "Student", "Q4 2019"),
        ]);
        let before = build.table.clone();
        let after = build.table.resequence();
        assert_eq!(before.records(), after.records());
    }
}
