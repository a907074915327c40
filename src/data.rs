use serde::{Deserialize, Serialize};

pub use crate::types::{JobCode, JobTitle, PeriodLabel, PersonId};

/// One employment episode for one person.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Groups records belonging to the same individual.
    pub person_id: PersonId,
    /// Normalized job label.
    pub job_title: JobTitle,
    /// Classification code for the label (carried, never ranked).
    pub job_code: JobCode,
    /// Raw period marker, e.g. `Q3 2019`.
    pub start_period: PeriodLabel,
    /// Timeline position `year + (quarter - 1) / 4`; `None` when the period
    /// could not be parsed, which makes the record unorderable.
    pub start_value: Option<f64>,
}

impl JobRecord {
    /// Build a record, deriving `start_value` from `start_period`.
    pub fn new(
        person_id: impl Into<PersonId>,
        job_title: impl Into<JobTitle>,
        job_code: impl Into<JobCode>,
        start_period: impl Into<PeriodLabel>,
    ) -> Self {
        let start_period = start_period.into();
        let start_value = crate::timeline::parse_start_value(&start_period);
        Self {
            person_id: person_id.into(),
            job_title: job_title.into(),
            job_code: job_code.into(),
            start_period,
            start_value,
        }
    }
}

/// A `JobRecord` linked to its chronological neighbors within the same person.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequencedRecord {
    /// Base episode fields.
    pub record: JobRecord,
    /// Title of the person's previous episode, if any.
    pub previous_job_label: Option<JobTitle>,
    /// Title of the person's next episode, if any.
    pub next_job_label: Option<JobTitle>,
}

impl SequencedRecord {
    /// Neighbor label looked at by a query in `direction`.
    pub fn neighbor(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Forward => self.next_job_label.as_deref(),
            Direction::Reverse => self.previous_job_label.as_deref(),
        }
    }

    /// Shorthand for `record.job_title`.
    pub fn job_title(&self) -> &str {
        &self.record.job_title
    }

    /// Shorthand for `record.person_id`.
    pub fn person_id(&self) -> &str {
        &self.record.person_id
    }
}

/// Which neighbor a transition query ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Where people go FROM the selected job.
    Forward,
    /// Where people come FROM to reach the selected job.
    Reverse,
}

/// Ordered pair of chronologically adjacent titles for one person.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Earlier title.
    pub from_job: JobTitle,
    /// Later title.
    pub to_job: JobTitle,
}

/// One ranked neighbor of a transition query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionShare {
    /// Neighbor title (next job for forward, previous job for reverse).
    pub target_job: JobTitle,
    /// Observed transitions to/from `target_job`.
    pub count: usize,
    /// `count / total * 100`, rounded to one decimal.
    pub percentage: f64,
}

/// Ranked neighbors of one job title in one direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    /// Queried title.
    pub source_job: JobTitle,
    /// Which neighbor was ranked.
    pub direction: Direction,
    /// Number of transitions analyzed (the percentage denominator).
    pub total: usize,
    /// At most `top_k` entries, best first.
    pub entries: Vec<TransitionShare>,
}

impl TransitionTable {
    /// Sum of the (rounded) percentages of the kept entries.
    pub fn percentage_sum(&self) -> f64 {
        self.entries.iter().map(|entry| entry.percentage).sum()
    }
}

/// A ranked `step_1 -> step_2 -> destination` chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoStepPath {
    /// Title held two moves before the destination.
    pub step_1: JobTitle,
    /// Title held right before the destination.
    pub step_2: JobTitle,
    /// Queried destination title.
    pub destination: JobTitle,
    /// Number of joined occurrences of this chain.
    pub count: usize,
}

/// Ranked two-step paths leading into one destination job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTable {
    /// Queried destination title.
    pub destination_job: JobTitle,
    /// Joined path rows observed before grouping.
    pub total_paths: usize,
    /// At most `top_k` entries, most frequent first.
    pub entries: Vec<TwoStepPath>,
}

/// Outcome of a ranking query.
///
/// `InsufficientData` means nothing matched; it is never represented as an
/// empty ranked table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "table", rename_all = "snake_case")]
pub enum Ranking<T> {
    /// At least one observation matched.
    Ranked(T),
    /// Nothing matched the query.
    InsufficientData,
}

impl<T> Ranking<T> {
    /// Whether the query matched nothing.
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Ranking::InsufficientData)
    }

    /// Borrow the ranked table, if any.
    pub fn ranked(&self) -> Option<&T> {
        match self {
            Ranking::Ranked(table) => Some(table),
            Ranking::InsufficientData => None,
        }
    }

    /// Take the ranked table, if any.
    pub fn into_ranked(self) -> Option<T> {
        match self {
            Ranking::Ranked(table) => Some(table),
            Ranking::InsufficientData => None,
        }
    }
}
