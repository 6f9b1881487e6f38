//! Future period labels for a forecast horizon.

use chrono::{DateTime, Utc};

use crate::models::Frequency;

/// Instants of the next `horizon` periods after `start`.
///
/// Each step adds the frequency's fixed duration (7 or 30 days) to the previous
/// instant; the first period is one step after `start`. Calendar months are not
/// used.
pub fn period_instants(
    start: DateTime<Utc>,
    horizon: usize,
    frequency: Frequency,
) -> Vec<DateTime<Utc>> {
    let step = frequency.step();
    std::iter::successors(start.checked_add_signed(step), |cur| {
        cur.checked_add_signed(step)
    })
    .take(horizon)
    .collect()
}

/// Labels of the next `horizon` periods: `YYYY-MM-DD` weekly, `YYYY-MM` monthly.
pub fn next_periods(start: DateTime<Utc>, horizon: usize, frequency: Frequency) -> Vec<String> {
    period_instants(start, horizon, frequency)
        .into_iter()
        .map(|instant| instant.format(frequency.label_format()).to_string())
        .collect()
}
