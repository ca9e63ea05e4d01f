//! Per-month consumption from cumulative meter readings.
//!
//! A device stores one cumulative reading per month. The usage attributed to a
//! month is the difference to the previous trusted reading. A baseline of `0`
//! is not trusted: the first positive reading after it reports `0` and only
//! seeds the baseline. A sentinel reading, or a reading below the trusted
//! baseline (counter reset), reports no data. Outputs are never negative.

use tracing::trace;

use crate::month::Month;
use crate::snapshot::{CounterKind, MonthlyReading};

/// Consumption for one month; `None` renders as an empty cell.
pub type MonthlyUsage = Option<u64>;

pub fn monthly_deltas(reports: &[MonthlyReading], kind: CounterKind) -> Vec<MonthlyUsage> {
    let (deltas, _baseline) = reports.iter().map(|report| report.counter(kind)).fold(
        (Vec::with_capacity(reports.len()), 0_i64),
        |(mut deltas, baseline), reading| {
            deltas.push(month_usage(baseline, reading));
            (deltas, reading.max(0))
        },
    );
    deltas
}

/// Usage for a single month; a month with no stored report is no data.
pub fn delta_for_month(reports: &[MonthlyReading], kind: CounterKind, month: Month) -> MonthlyUsage {
    monthly_deltas(reports, kind)
        .get(month.index())
        .copied()
        .flatten()
}

fn month_usage(baseline: i64, reading: i64) -> MonthlyUsage {
    if reading < 0 {
        trace!(baseline, reading, "sentinel reading");
        return None;
    }
    if baseline == 0 {
        return (reading > 0).then_some(0);
    }
    match u64::try_from(reading - baseline) {
        Ok(delta) => Some(delta),
        Err(_) => {
            trace!(baseline, reading, "cumulative counter went backwards");
            None
        }
    }
}
