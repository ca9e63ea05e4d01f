//! Column sorting shared by every report view.
//!
//! Keys dispatch to a typed comparison: text, dotted-quad addresses, numeric
//! fields, derived monthly usage and current-period totals. Unrecognised keys
//! compare equal and leave the input order untouched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::current_period::{current_copies, current_prints};
use crate::delta::delta_for_month;
use crate::month::Month;
use crate::snapshot::{CounterKind, Device, TonerChannel};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKey {
    Location,
    Address,
    Name,
    Serial,
    Toner(TonerChannel),
    /// Usage in a month for the view's counter kind.
    Month(Month),
    /// Current cumulative total of a counter.
    Counter(CounterKind),
    Prints,
    Copies,
    Unknown(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Location => "location",
            SortKey::Address => "address",
            SortKey::Name => "name",
            SortKey::Serial => "serial",
            SortKey::Toner(channel) => channel.field_name(),
            SortKey::Month(month) => month.name(),
            SortKey::Counter(kind) => kind.field_name(),
            SortKey::Prints => "prints",
            SortKey::Copies => "copies",
            SortKey::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SortKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "location" => SortKey::Location,
            "address" => SortKey::Address,
            "name" => SortKey::Name,
            "serial" => SortKey::Serial,
            "prints" => SortKey::Prints,
            "copies" => SortKey::Copies,
            other => {
                if let Some(channel) = TonerChannel::ALL
                    .into_iter()
                    .find(|c| c.field_name() == other)
                {
                    SortKey::Toner(channel)
                } else if let Some(kind) = CounterKind::ALL
                    .into_iter()
                    .find(|k| k.field_name() == other)
                {
                    SortKey::Counter(kind)
                } else if let Ok(month) = other.parse::<Month>() {
                    SortKey::Month(month)
                } else {
                    SortKey::Unknown(other.to_string())
                }
            }
        };
        Ok(key)
    }
}

impl From<&str> for SortKey {
    fn from(raw: &str) -> Self {
        match raw.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Column selection held by a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    key: Option<SortKey>,
    direction: SortDirection,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same key flips the direction; another key starts ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.key.as_ref() == Some(&key) {
            self.direction = self.direction.toggled();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn key(&self) -> Option<&SortKey> {
        self.key.as_ref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// What a comparison needs beyond the two devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortContext {
    /// Counter kind month keys read; month keys are inert without one.
    pub month_counter: Option<CounterKind>,
    pub current_month: Month,
}

#[derive(Debug, Clone, Copy)]
pub struct SortEngine {
    context: SortContext,
}

impl SortEngine {
    pub fn new(context: SortContext) -> Self {
        Self { context }
    }

    pub fn compare(&self, a: &Device, b: &Device, key: &SortKey) -> Ordering {
        match key {
            SortKey::Location => compare_text(&a.location, &b.location),
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::Serial => compare_text(&a.serial, &b.serial),
            SortKey::Address => compare_addresses(&a.address, &b.address),
            SortKey::Toner(channel) => a.toner(*channel).cmp(&b.toner(*channel)),
            SortKey::Counter(kind) => a.counter(*kind).cmp(&b.counter(*kind)),
            SortKey::Month(month) => match self.context.month_counter {
                Some(kind) => delta_for_month(&a.reports, kind, *month)
                    .cmp(&delta_for_month(&b.reports, kind, *month)),
                None => Ordering::Equal,
            },
            SortKey::Prints => current_prints(a, self.context.current_month)
                .cmp(&current_prints(b, self.context.current_month)),
            SortKey::Copies => current_copies(a, self.context.current_month)
                .cmp(&current_copies(b, self.context.current_month)),
            SortKey::Unknown(_) => Ordering::Equal,
        }
    }

    /// Ordered view of `devices`; without a key the input order is kept.
    pub fn sort<'a>(
        &self,
        devices: &'a [Device],
        key: Option<&SortKey>,
        direction: SortDirection,
    ) -> Vec<&'a Device> {
        self.order(devices.iter().collect(), key, direction)
    }

    pub fn order<'a>(
        &self,
        mut ordered: Vec<&'a Device>,
        key: Option<&SortKey>,
        direction: SortDirection,
    ) -> Vec<&'a Device> {
        if let Some(key) = key {
            trace!(%key, ?direction, devices = ordered.len(), "sorting devices");
            ordered.sort_by(|a, b| direction.apply(self.compare(a, b, key)));
        }
        ordered
    }
}

/// Collation in three passes: base letters ignoring accents and case, then
/// accents (unaccented first), then case (lowercase first).
pub fn compare_text(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

/// Octet-wise numeric comparison. Missing or non-numeric octets order after
/// numeric ones at the first position they occur.
pub fn compare_addresses(a: &str, b: &str) -> Ordering {
    address_rank(a).cmp(&address_rank(b))
}

fn address_rank(address: &str) -> [(bool, u32); 4] {
    let mut parts = address.split('.');
    std::array::from_fn(|_| {
        match parts.next().and_then(|octet| octet.trim().parse::<u32>().ok()) {
            Some(value) => (false, value),
            None => (true, 0),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{
        compare_addresses, compare_text, SortContext, SortDirection, SortEngine, SortKey,
        SortState,
    };
    use crate::month::Month;
    use crate::snapshot::{CounterKind, Device, MonthlyReading, TonerChannel};
    use crate::test_support::{device, device_with_reports};

    fn engine(month_counter: Option<CounterKind>) -> SortEngine {
        SortEngine::new(SortContext {
            month_counter,
            current_month: Month::April,
        })
    }

    fn addresses(devices: &[&Device]) -> Vec<String> {
        devices.iter().map(|d| d.address.clone()).collect()
    }

    #[test]
    fn parses_every_exposed_key() {
        assert_eq!(SortKey::from("location"), SortKey::Location);
        assert_eq!(SortKey::from("address"), SortKey::Address);
        assert_eq!(SortKey::from("k2"), SortKey::Toner(TonerChannel::K2));
        assert_eq!(SortKey::from("September"), SortKey::Month(Month::September));
        assert_eq!(
            SortKey::from("colourCopies"),
            SortKey::Counter(CounterKind::ColourCopies)
        );
        assert_eq!(SortKey::from("copies"), SortKey::Copies);
        assert_eq!(
            SortKey::from("september"),
            SortKey::Unknown("september".to_string())
        );
        assert_eq!(SortKey::from("magenta").to_string(), "magenta");
    }

    #[test]
    fn state_toggles_on_same_key_and_resets_on_new_key() {
        let mut state = SortState::new();
        assert_eq!(state.key(), None);

        state.select(SortKey::Name);
        assert_eq!(state.direction(), SortDirection::Ascending);
        state.select(SortKey::Name);
        assert_eq!(state.direction(), SortDirection::Descending);
        state.select(SortKey::Address);
        assert_eq!(state.key(), Some(&SortKey::Address));
        assert_eq!(state.direction(), SortDirection::Ascending);
    }

    #[test]
    fn addresses_compare_numerically_per_octet() {
        let devices = vec![
            device("10.0.0.10", "a"),
            device("10.0.0.2", "b"),
            device("9.255.255.255", "c"),
        ];

        let sorted = engine(None).sort(&devices, Some(&SortKey::Address), SortDirection::Ascending);

        assert_eq!(
            addresses(&sorted),
            vec!["9.255.255.255", "10.0.0.2", "10.0.0.10"]
        );
    }

    #[test]
    fn malformed_addresses_do_not_panic_and_sort_after_numeric_octets() {
        let devices = vec![
            device("printer.local", "a"),
            device("10.0.0.2", "b"),
            device("10.0.x.1", "c"),
            device("", "d"),
            device("10.0.0.1", "e"),
        ];

        let sorted = engine(None).sort(&devices, Some(&SortKey::Address), SortDirection::Ascending);

        let order = addresses(&sorted);
        assert_eq!(&order[..3], &["10.0.0.1", "10.0.0.2", "10.0.x.1"]);
        assert_eq!(order.len(), 5);
        assert_eq!(compare_addresses("10.0.0", "10.0.0.0"), Ordering::Greater);
    }

    #[test]
    fn toggling_reverses_exactly() {
        let devices = vec![
            device("10.0.0.3", "charlie"),
            device("10.0.0.1", "Alpha"),
            device("10.0.0.2", "bravo"),
        ];
        let engine = engine(None);

        let first = engine.sort(&devices, Some(&SortKey::Name), SortDirection::Ascending);
        let again = engine.sort(&devices, Some(&SortKey::Name), SortDirection::Ascending);
        let reversed = engine.sort(&devices, Some(&SortKey::Name), SortDirection::Descending);

        assert_eq!(addresses(&first), addresses(&again));
        assert_eq!(addresses(&first), vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        let mut expected = addresses(&first);
        expected.reverse();
        assert_eq!(addresses(&reversed), expected);
    }

    #[test]
    fn text_comparison_ignores_case_first() {
        assert_eq!(compare_text("alpha", "Bravo"), Ordering::Less);
        assert_eq!(compare_text("a", "A"), Ordering::Less);
        assert_eq!(compare_text("same", "same"), Ordering::Equal);
    }

    #[test]
    fn accented_text_sorts_with_its_base_letter() {
        assert_eq!(compare_text("Érable", "Zeta"), Ordering::Less);
        assert_eq!(compare_text("école", "ezz"), Ordering::Less);
        assert_eq!(compare_text("ecole", "école"), Ordering::Less);
        assert_eq!(compare_text("école", "Ecole"), Ordering::Greater);
    }

    #[test]
    fn accented_locations_sort_among_plain_ones() {
        let mut north = device("10.0.0.1", "n");
        north.location = "Zürich".to_string();
        let mut east = device("10.0.0.2", "e");
        east.location = "Étage 2".to_string();
        let mut annex = device("10.0.0.3", "a");
        annex.location = "annex".to_string();
        let devices = vec![north, east, annex];

        let sorted = engine(None).sort(
            &devices,
            Some(&SortKey::Location),
            SortDirection::Ascending,
        );

        assert_eq!(addresses(&sorted), vec!["10.0.0.3", "10.0.0.2", "10.0.0.1"]);
    }

    #[test]
    fn month_key_sorts_by_derived_usage_with_no_data_lowest() {
        let devices = vec![
            device_with_reports("10.0.0.1", "a", CounterKind::MonoCopies, &[100, 180, 190]),
            device_with_reports("10.0.0.2", "b", CounterKind::MonoCopies, &[100, -1, -1]),
            device_with_reports("10.0.0.3", "c", CounterKind::MonoCopies, &[100, 130, 400]),
        ];
        let engine = engine(Some(CounterKind::MonoCopies));
        let key = SortKey::Month(Month::March);

        let ascending = engine.sort(&devices, Some(&key), SortDirection::Ascending);
        let descending = engine.sort(&devices, Some(&key), SortDirection::Descending);

        assert_eq!(addresses(&ascending), vec!["10.0.0.2", "10.0.0.1", "10.0.0.3"]);
        assert_eq!(addresses(&descending), vec!["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn month_key_without_counter_context_keeps_order() {
        let devices = vec![
            device_with_reports("10.0.0.1", "a", CounterKind::MonoPrints, &[0, 900]),
            device_with_reports("10.0.0.2", "b", CounterKind::MonoPrints, &[0, 10]),
        ];

        let sorted = engine(None).sort(
            &devices,
            Some(&SortKey::Month(Month::February)),
            SortDirection::Descending,
        );

        assert_eq!(addresses(&sorted), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn numeric_keys_cover_toner_counters_and_period_totals() {
        let baseline = |mono_prints: i64| MonthlyReading {
            month: "March".to_string(),
            mono_prints,
            ..MonthlyReading::default()
        };
        let mut low = device("10.0.0.1", "low");
        low.black = 10;
        low.mono_copies = 900;
        low.mono_prints = 150;
        low.reports = vec![baseline(1), baseline(1), baseline(100)];
        let mut high = device("10.0.0.2", "high");
        high.black = -1;
        high.mono_copies = 5;
        high.mono_prints = 700;
        high.reports = vec![baseline(1), baseline(1), baseline(100)];
        let devices = vec![low, high];
        let engine = engine(None);

        let by_black = engine.sort(
            &devices,
            Some(&SortKey::Toner(TonerChannel::Black)),
            SortDirection::Ascending,
        );
        let by_copies_total = engine.sort(
            &devices,
            Some(&SortKey::Counter(CounterKind::MonoCopies)),
            SortDirection::Ascending,
        );
        let by_prints = engine.sort(&devices, Some(&SortKey::Prints), SortDirection::Descending);

        assert_eq!(addresses(&by_black), vec!["10.0.0.2", "10.0.0.1"]);
        assert_eq!(addresses(&by_copies_total), vec!["10.0.0.2", "10.0.0.1"]);
        assert_eq!(addresses(&by_prints), vec!["10.0.0.2", "10.0.0.1"]);
    }

    #[test]
    fn unknown_and_missing_keys_keep_input_order() {
        let devices = vec![device("10.0.0.9", "z"), device("10.0.0.1", "a")];
        let engine = engine(None);

        let unknown = engine.sort(
            &devices,
            Some(&SortKey::from("Reports")),
            SortDirection::Descending,
        );
        let state = SortState::new();
        let unsorted = engine.sort(&devices, state.key(), state.direction());

        assert_eq!(addresses(&unknown), vec!["10.0.0.9", "10.0.0.1"]);
        assert_eq!(addresses(&unsorted), vec!["10.0.0.9", "10.0.0.1"]);
    }
}
