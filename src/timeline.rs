//! Quarter/year period parsing.
//!
//! Period labels look like `Q3 2019`. Parsing never fails loudly: labels
//! without a recognizable period yield `None`, which downstream stages treat
//! as "unorderable".

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::timeline::{PERIOD_PATTERN, QUARTER_FRACTION};

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PERIOD_PATTERN).expect("period pattern is a valid regex"));

/// A parsed `Q<quarter> <year>` period.
///
/// The quarter is not range checked: `Q0` and `Q5`..`Q9` are accepted and
/// map arithmetically onto the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterPeriod {
    /// Quarter digit as written (`0..=9`).
    pub quarter: u8,
    /// Four-digit year.
    pub year: i32,
}

impl QuarterPeriod {
    /// Timeline position `year + (quarter - 1) * 0.25`.
    pub fn start_value(&self) -> f64 {
        self.year as f64 + (self.quarter as f64 - 1.0) * QUARTER_FRACTION
    }
}

/// Find the first `Q<digit> <4 digits>` occurrence in `label`.
///
/// The match is unanchored: surrounding text is ignored and trailing digits
/// after the fourth year digit are not inspected. Only ASCII digits count.
pub fn parse_period(label: &str) -> Option<QuarterPeriod> {
    let captures = PERIOD_RE.captures(label)?;
    let quarter = captures.get(1)?.as_str().parse::<u8>().ok()?;
    let year = captures.get(2)?.as_str().parse::<i32>().ok()?;
    Some(QuarterPeriod { quarter, year })
}

/// Timeline position for `label`, or `None` when no period is found.
pub fn parse_start_value(label: &str) -> Option<f64> {
    parse_period(label).map(|period| period.start_value())
}
