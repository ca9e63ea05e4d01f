use crate::month::Month;
use crate::snapshot::{CounterKind, Device, MonthlyReading};

/// One report per value, labelled January onwards, with only `kind` set.
pub fn readings(kind: CounterKind, values: &[i64]) -> Vec<MonthlyReading> {
    values
        .iter()
        .zip(Month::ALL)
        .map(|(value, month)| {
            let mut report = MonthlyReading {
                month: month.name().to_string(),
                ..MonthlyReading::default()
            };
            match kind {
                CounterKind::MonoPrints => report.mono_prints = *value,
                CounterKind::MonoCopies => report.mono_copies = *value,
                CounterKind::ColourPrints => report.colour_prints = *value,
                CounterKind::ColourCopies => report.colour_copies = *value,
            }
            report
        })
        .collect()
}

pub fn device(address: &str, name: &str) -> Device {
    Device {
        address: address.to_string(),
        name: name.to_string(),
        serial: format!("SN-{name}"),
        location: format!("Room {name}"),
        ..Device::default()
    }
}

pub fn device_with_reports(
    address: &str,
    name: &str,
    kind: CounterKind,
    values: &[i64],
) -> Device {
    Device {
        reports: readings(kind, values),
        ..device(address, name)
    }
}
