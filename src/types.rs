/// Opaque person identifier grouping the episodes of one individual.
/// Examples: `10423`, `p-0007`
pub type PersonId = String;
/// Normalized job label (the dataset's `matched_label` column).
/// Examples: `cook`, `waiter/waitress`, `nurse responsible for general care`
pub type JobTitle = String;
/// Occupation classification code carried alongside the label.
/// Example: `5120.1`
pub type JobCode = String;
/// Raw quarter/year period marker as found in the dataset.
/// Examples: `Q3 2019`, `Q1 2020`
pub type PeriodLabel = String;
/// Identifier for the dataset source that produced the rows.
/// Examples: `jobhop_train`, `local_snapshot`
pub type SourceId = String;
/// Dataset column name.
/// Examples: `matched_label`, `start_date`
pub type ColumnName = String;
