use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown month name: {0:?}")]
pub struct ParseMonthError(pub String);

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position, January = 0. Also the index into a device's reports.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    /// From a chrono month number (1..=12).
    pub fn from_number(number: u32) -> Option<Month> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::from_index(idx as usize))
    }

    pub fn previous(self) -> Option<Month> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Exact, case-sensitive: month names double as wire keys.
impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|month| month.name() == s)
            .ok_or_else(|| ParseMonthError(s.to_string()))
    }
}
