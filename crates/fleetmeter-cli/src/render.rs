use anyhow::Result;
use clap::ValueEnum;
use fleetmeter_core::{FleetSnapshot, ReportTable, SortDirection, SortState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

pub fn print_table(table: &ReportTable, sort: &SortState, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputFormat::Human => print!("{}", format_table(table, sort)),
    }
    Ok(())
}

pub fn print_years(snapshot: &FleetSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let years: Vec<_> = snapshot
                .years()
                .map(|year| {
                    serde_json::json!({
                        "year": year,
                        "devices": snapshot.devices(year).len(),
                        "months": snapshot.months(year),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&years)?);
        }
        OutputFormat::Human => print!("{}", format_years(snapshot)),
    }
    Ok(())
}

pub(crate) fn format_years(snapshot: &FleetSnapshot) -> String {
    let mut out = String::from("=== Report Years ===\n");
    for year in snapshot.years() {
        let months = snapshot
            .months(year)
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{year}  devices={:<4} months: {}\n",
            snapshot.devices(year).len(),
            if months.is_empty() { "-" } else { months.as_str() }
        ));
    }
    out
}

/// Column label with the sort marker when the column is the active key.
pub(crate) fn header_label(label: &str, key: &fleetmeter_core::SortKey, sort: &SortState) -> String {
    match (sort.key(), sort.direction()) {
        (Some(active), SortDirection::Ascending) if active == key => format!("{label} ^"),
        (Some(active), SortDirection::Descending) if active == key => format!("{label} v"),
        _ => label.to_string(),
    }
}

pub(crate) fn format_table(table: &ReportTable, sort: &SortState) -> String {
    let headers: Vec<String> = table
        .columns
        .iter()
        .map(|column| header_label(&column.label, &column.key, sort))
        .collect();
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.cells.iter().map(|cell| cell.render()).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            body.iter()
                .filter_map(|cells| cells.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format!("=== {} ({}) ===\n", table.title, table.year);
    out.push_str(&format_line(&headers, &widths));
    out.push_str(&format_line(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    for cells in &body {
        out.push_str(&format_line(cells, &widths));
    }
    if body.is_empty() {
        out.push_str("(no devices)\n");
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
