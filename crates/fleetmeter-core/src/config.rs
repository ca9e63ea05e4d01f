use chrono::{Datelike, Local, NaiveDate};

use crate::month::Month;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Report set shown by the usage and month views.
    pub year: String,
    /// Report set the toner view reads; always the calendar year of "today".
    pub current_year: String,
    pub current_month: Month,
}

impl ReportConfig {
    pub fn for_date(today: NaiveDate) -> Self {
        let current_year = today.year().to_string();
        Self {
            year: current_year.clone(),
            current_year,
            current_month: Month::from_number(today.month()).unwrap_or(Month::January),
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}
