use super::{columns, Cell, ColumnKind};
use crate::analysis::RankedReport;

/// Print the ranked report as a plain table on stdout.
pub fn print_report(report: &RankedReport) {
    let columns = columns(report.strategy);

    let header: Vec<String> = columns.iter().map(|c| short_header(&c.header)).collect();
    println!("{}", header.join(" | "));

    for record in &report.rows {
        let line: Vec<String> = columns
            .iter()
            .map(|column| format_cell(column.cell(record), column.kind))
            .collect();
        println!("{}", line.join(" | "));
    }
}

fn short_header(header: &str) -> String {
    header
        .replace(" Price Return", " Ret")
        .replace(" Return Percentile", " Pct")
        .replace("Number of Shares to Buy", "Shares")
}

fn format_cell(cell: Cell, kind: ColumnKind) -> String {
    match (cell, kind) {
        (Cell::Text(text), _) => text,
        (Cell::Blank, _) => "-".to_string(),
        (Cell::Number(value), ColumnKind::Currency) => format!("${:.2}", value),
        (Cell::Number(value), ColumnKind::Percent) => format!("{:.2}%", value * 100.0),
        (Cell::Number(value), _) => format!("{:.0}", value),
    }
}
