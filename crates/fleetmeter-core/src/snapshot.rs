use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::month::Month;

/// Wire value for "reading unavailable".
pub const SENTINEL: i64 = -1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CounterKind {
    MonoPrints,
    MonoCopies,
    ColourPrints,
    ColourCopies,
}

impl CounterKind {
    pub const ALL: [CounterKind; 4] = [
        CounterKind::MonoPrints,
        CounterKind::MonoCopies,
        CounterKind::ColourPrints,
        CounterKind::ColourCopies,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            CounterKind::MonoPrints => "monoPrints",
            CounterKind::MonoCopies => "monoCopies",
            CounterKind::ColourPrints => "colourPrints",
            CounterKind::ColourCopies => "colourCopies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CounterKind::MonoPrints => "Mono Prints",
            CounterKind::MonoCopies => "Mono Copies",
            CounterKind::ColourPrints => "Colour Prints",
            CounterKind::ColourCopies => "Colour Copies",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TonerChannel {
    Black,
    Yellow,
    Magenta,
    Cyan,
    K1,
    K2,
}

impl TonerChannel {
    /// Column order of the toner report.
    pub const ALL: [TonerChannel; 6] = [
        TonerChannel::Black,
        TonerChannel::Yellow,
        TonerChannel::Magenta,
        TonerChannel::Cyan,
        TonerChannel::K1,
        TonerChannel::K2,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            TonerChannel::Black => "black",
            TonerChannel::Yellow => "yellow",
            TonerChannel::Magenta => "magenta",
            TonerChannel::Cyan => "cyan",
            TonerChannel::K1 => "k1",
            TonerChannel::K2 => "k2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TonerChannel::Black => "Black %",
            TonerChannel::Yellow => "Yellow %",
            TonerChannel::Magenta => "Magenta %",
            TonerChannel::Cyan => "Cyan %",
            TonerChannel::K1 => "K1 %",
            TonerChannel::K2 => "K2 %",
        }
    }
}

/// Explicit `null` on the wire reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyReading {
    #[serde(deserialize_with = "null_as_default")]
    pub month: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mono_prints: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub mono_copies: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub colour_prints: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub colour_copies: i64,
}

impl MonthlyReading {
    pub fn counter(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::MonoPrints => self.mono_prints,
            CounterKind::MonoCopies => self.mono_copies,
            CounterKind::ColourPrints => self.colour_prints,
            CounterKind::ColourCopies => self.colour_copies,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub serial: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mono_prints: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub mono_copies: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub colour_prints: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub colour_copies: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub black: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub cyan: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub magenta: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub yellow: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub k1: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub k2: i64,
    #[serde(rename = "Reports", deserialize_with = "null_as_default")]
    pub reports: Vec<MonthlyReading>,
}

impl Device {
    /// Current (today's) cumulative total.
    pub fn counter(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::MonoPrints => self.mono_prints,
            CounterKind::MonoCopies => self.mono_copies,
            CounterKind::ColourPrints => self.colour_prints,
            CounterKind::ColourCopies => self.colour_copies,
        }
    }

    pub fn toner(&self, channel: TonerChannel) -> i64 {
        match channel {
            TonerChannel::Black => self.black,
            TonerChannel::Yellow => self.yellow,
            TonerChannel::Magenta => self.magenta,
            TonerChannel::Cyan => self.cyan,
            TonerChannel::K1 => self.k1,
            TonerChannel::K2 => self.k2,
        }
    }

    /// Stored report at the month's position, if the device has one.
    pub fn report_at(&self, month: Month) -> Option<&MonthlyReading> {
        self.reports.get(month.index())
    }

    /// First stored report whose `month` label matches.
    pub fn report_named(&self, month: Month) -> Option<&MonthlyReading> {
        self.reports.iter().find(|r| r.month == month.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetSnapshot {
    years: BTreeMap<String, Vec<Device>>,
}

impl FleetSnapshot {
    pub fn new(years: BTreeMap<String, Vec<Device>>) -> Self {
        Self { years }
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Devices for a year; an unknown year is an empty report set.
    pub fn devices(&self, year: &str) -> &[Device] {
        self.years.get(year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }

    /// Months with at least one stored report in the year, calendar order.
    pub fn months(&self, year: &str) -> Vec<Month> {
        Month::ALL
            .into_iter()
            .filter(|month| {
                self.devices(year)
                    .iter()
                    .any(|device| device.report_named(*month).is_some())
            })
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }
}
