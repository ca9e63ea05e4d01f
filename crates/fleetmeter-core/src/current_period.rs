//! Consumption so far in the current calendar month.
//!
//! The stored report of the previous month is taken as the cumulative total at
//! the start of this month. Prints and copies guard that baseline differently,
//! see [`BaselineGate`].

use serde::{Deserialize, Serialize};

use crate::month::Month;
use crate::snapshot::{CounterKind, Device, MonthlyReading, SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Prints,
    Copies,
}

impl Axis {
    fn counters(self) -> (CounterKind, CounterKind) {
        match self {
            Axis::Prints => (CounterKind::MonoPrints, CounterKind::ColourPrints),
            Axis::Copies => (CounterKind::MonoCopies, CounterKind::ColourCopies),
        }
    }

    pub fn gate(self) -> BaselineGate {
        match self {
            Axis::Prints => BaselineGate::PositiveMonoBaseline,
            Axis::Copies => BaselineGate::RecordPresent,
        }
    }
}

/// When a baseline report is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineGate {
    /// The baseline's mono counter for the axis must be strictly positive.
    PositiveMonoBaseline,
    /// Any stored baseline report will do.
    RecordPresent,
}

impl BaselineGate {
    fn admits(self, baseline: &MonthlyReading, mono: CounterKind) -> bool {
        match self {
            BaselineGate::PositiveMonoBaseline => baseline.counter(mono) > 0,
            BaselineGate::RecordPresent => true,
        }
    }
}

/// Signed running total; negative values are display-empty but still sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PeriodTotal(pub i64);

impl PeriodTotal {
    pub const UNKNOWN: PeriodTotal = PeriodTotal(SENTINEL);

    pub fn display(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }
}

pub fn current_prints(device: &Device, current_month: Month) -> PeriodTotal {
    period_total(device, current_month, Axis::Prints)
}

pub fn current_copies(device: &Device, current_month: Month) -> PeriodTotal {
    period_total(device, current_month, Axis::Copies)
}

pub fn period_total(device: &Device, current_month: Month, axis: Axis) -> PeriodTotal {
    let (mono, colour) = axis.counters();

    let Some(baseline) = current_month
        .previous()
        .and_then(|month| device.report_at(month))
    else {
        return PeriodTotal::default();
    };

    if !axis.gate().admits(baseline, mono) {
        return PeriodTotal::default();
    }

    let current_mono = device.counter(mono);
    let current_colour = device.counter(colour);
    if current_mono == SENTINEL && current_colour == SENTINEL {
        return PeriodTotal::UNKNOWN;
    }

    PeriodTotal(
        (current_mono - baseline.counter(mono)) + (current_colour - baseline.counter(colour)),
    )
}
