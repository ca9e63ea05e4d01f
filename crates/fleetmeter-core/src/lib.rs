pub mod config;
pub mod current_period;
pub mod delta;
pub mod month;
pub mod report;
pub mod snapshot;
pub mod sort;

#[cfg(test)]
mod test_support;

pub use config::ReportConfig;
pub use current_period::{current_copies, current_prints, Axis, BaselineGate, PeriodTotal};
pub use delta::{delta_for_month, monthly_deltas, MonthlyUsage};
pub use month::{Month, ParseMonthError};
pub use report::{build_report, Cell, Column, ReportKind, ReportRow, ReportTable};
pub use snapshot::{
    CounterKind, Device, FleetSnapshot, MonthlyReading, SnapshotError, TonerChannel, SENTINEL,
};
pub use sort::{SortContext, SortDirection, SortEngine, SortKey, SortState};
