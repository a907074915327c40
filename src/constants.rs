/// Constants used by ranking queries.
pub mod ranking {
    /// Number of ranked entries returned when the caller does not choose one.
    pub const DEFAULT_TOP_K: usize = 5;
    /// Decimal places kept when rounding transition percentages.
    pub const PERCENT_DECIMALS: i32 = 1;
}

/// Column names of the JobHop dataset schema.
pub mod columns {
    /// Person identifier column.
    pub const PERSON_ID: &str = "person_id";
    /// Normalized job label column.
    pub const MATCHED_LABEL: &str = "matched_label";
    /// Occupation classification code column.
    pub const MATCHED_CODE: &str = "matched_code";
    /// Raw `Q<d> <yyyy>` start period column.
    pub const START_DATE: &str = "start_date";
}

/// Constants used by the timeline parser.
pub mod timeline {
    /// Unanchored `Q<digit> <4 digits>` pattern; groups are quarter and year.
    pub const PERIOD_PATTERN: &str = r"Q([0-9]) ([0-9]{4})";
    /// Fraction of a year covered by one quarter.
    pub const QUARTER_FRACTION: f64 = 0.25;
}

/// Constants used by dataset sources.
pub mod source {
    /// Default source id for local snapshot directories.
    pub const DEFAULT_SNAPSHOT_SOURCE_ID: &str = "local_snapshot";
    /// Shard extensions always readable without optional features.
    pub const JSONL_EXTENSIONS: [&str; 2] = ["jsonl", "ndjson"];
    /// CSV shard extension; the first row holds column names.
    pub const CSV_EXTENSION: &str = "csv";
    /// Parquet shard extension (requires the `huggingface` feature).
    pub const PARQUET_EXTENSION: &str = "parquet";
    /// Prefix marking a direct download URL instead of a hub file path.
    pub const REMOTE_URL_PREFIX: &str = "url::";
    /// Hugging Face dataset id of the JobHop dataset.
    pub const JOBHOP_DATASET: &str = "aida-ugent/JobHop";
    /// Parquet conversion of the JobHop train split on the hub.
    pub const JOBHOP_TRAIN_FILE: &str = "default/train/0000.parquet";
    /// Revision holding the hub's automatic parquet conversion.
    pub const JOBHOP_PARQUET_REVISION: &str = "refs/convert/parquet";
}

/// Constants used by load reporting.
pub mod ingest {
    /// Share of unorderable rows above which a load emits a warning.
    pub const UNORDERABLE_WARN_RATIO: f64 = 0.5;
}
