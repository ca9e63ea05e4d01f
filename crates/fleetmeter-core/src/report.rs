use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::ReportConfig;
use crate::current_period::{current_copies, current_prints};
use crate::delta::monthly_deltas;
use crate::month::Month;
use crate::snapshot::{CounterKind, Device, FleetSnapshot, TonerChannel};
use crate::sort::{SortContext, SortEngine, SortKey, SortState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Monthly usage of one counter over the selected year.
    Usage(CounterKind),
    /// Toner levels and this month's prints/copies for the current year.
    Toner,
    /// Stored cumulative readings of one month of the selected year.
    Month(Month),
}

impl ReportKind {
    /// Devices a view lists at all.
    pub fn includes(&self, device: &Device) -> bool {
        match self {
            ReportKind::Usage(CounterKind::MonoPrints) => device.mono_prints > 0,
            ReportKind::Usage(CounterKind::MonoCopies) => device.mono_copies > 0,
            ReportKind::Usage(CounterKind::ColourPrints) => device.colour_prints > 0,
            ReportKind::Usage(CounterKind::ColourCopies) => {
                device.colour_prints > 0 && device.colour_copies > 0
            }
            ReportKind::Toner | ReportKind::Month(_) => true,
        }
    }

    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::new("Location", SortKey::Location),
            Column::new("IP", SortKey::Address),
            Column::new("Name", SortKey::Name),
            Column::new("Serial", SortKey::Serial),
        ];
        match self {
            ReportKind::Usage(_) => {
                columns.extend(
                    Month::ALL
                        .into_iter()
                        .map(|month| Column::new(month.name(), SortKey::Month(month))),
                );
            }
            ReportKind::Toner => {
                columns.extend(
                    TonerChannel::ALL
                        .into_iter()
                        .map(|channel| Column::new(channel.label(), SortKey::Toner(channel))),
                );
                columns.push(Column::new("Current Monthly Prints", SortKey::Prints));
                columns.push(Column::new("Current Monthly Copies", SortKey::Copies));
            }
            ReportKind::Month(_) => {
                columns.extend(
                    CounterKind::ALL
                        .into_iter()
                        .map(|kind| Column::new(kind.label(), SortKey::Counter(kind))),
                );
            }
        }
        columns
    }

    fn month_counter(&self) -> Option<CounterKind> {
        match self {
            ReportKind::Usage(kind) => Some(*kind),
            ReportKind::Toner | ReportKind::Month(_) => None,
        }
    }

    fn year<'c>(&self, config: &'c ReportConfig) -> &'c str {
        match self {
            ReportKind::Toner => &config.current_year,
            ReportKind::Usage(_) | ReportKind::Month(_) => &config.year,
        }
    }

    fn cells(&self, device: &Device, config: &ReportConfig) -> Vec<Cell> {
        let mut cells = vec![
            Cell::text(&device.location),
            Cell::text(&device.address),
            Cell::text(&device.name),
            Cell::text(&device.serial),
        ];
        match self {
            ReportKind::Usage(kind) => {
                let deltas = monthly_deltas(&device.reports, *kind);
                cells.extend(
                    Month::ALL
                        .into_iter()
                        .map(|month| Cell::Count(deltas.get(month.index()).copied().flatten())),
                );
            }
            ReportKind::Toner => {
                cells.extend(
                    TonerChannel::ALL
                        .into_iter()
                        .map(|channel| Cell::reading(device.toner(channel))),
                );
                cells.push(Cell::Count(
                    current_prints(device, config.current_month).display(),
                ));
                cells.push(Cell::Count(
                    current_copies(device, config.current_month).display(),
                ));
            }
            ReportKind::Month(month) => {
                let report = device.report_named(*month);
                cells.extend(CounterKind::ALL.into_iter().map(|kind| {
                    report
                        .map(|r| Cell::reading(r.counter(kind)))
                        .unwrap_or(Cell::Count(None))
                }));
            }
        }
        cells
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Usage(kind) => f.write_str(kind.label()),
            ReportKind::Toner => f.write_str("Toner Levels"),
            ReportKind::Month(month) => write!(f, "{month} Readings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub label: String,
    pub key: SortKey,
}

impl Column {
    fn new(label: &str, key: SortKey) -> Self {
        Self {
            label: label.to_string(),
            key,
        }
    }
}

/// A display-safe value: text, a non-negative count, or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Count(Option<u64>),
}

impl Cell {
    fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    /// Wire reading; the sentinel and any other negative value are empty.
    fn reading(value: i64) -> Self {
        Cell::Count(u64::try_from(value).ok())
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Count(Some(count)) => count.to_string(),
            Cell::Count(None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Device address, the row key.
    pub key: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub year: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

pub fn build_report(
    snapshot: &FleetSnapshot,
    config: &ReportConfig,
    kind: ReportKind,
    sort: &SortState,
) -> ReportTable {
    let year = kind.year(config);
    let listed: Vec<&Device> = snapshot
        .devices(year)
        .iter()
        .filter(|device| kind.includes(device))
        .collect();

    let engine = SortEngine::new(SortContext {
        month_counter: kind.month_counter(),
        current_month: config.current_month,
    });
    let rows: Vec<ReportRow> = engine
        .order(listed, sort.key(), sort.direction())
        .into_iter()
        .map(|device| ReportRow {
            key: device.address.clone(),
            cells: kind.cells(device, config),
        })
        .collect();

    debug!(
        report = %kind,
        year,
        sort_key = ?sort.key().map(SortKey::as_str),
        direction = ?sort.direction(),
        rows = rows.len(),
        "built report table"
    );

    ReportTable {
        title: kind.to_string(),
        year: year.to_string(),
        columns: kind.columns(),
        rows,
    }
}
