use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use tracing::info;

use super::{columns, Cell, ColumnKind, COLUMN_WIDTH};
use crate::analysis::RankedReport;
use crate::error::ReportError;

const FONT_COLOR: u32 = 0x000000;
const BACKGROUND_COLOR: u32 = 0xE8EAF6;

fn cell_format(kind: ColumnKind) -> Format {
    let format = Format::new()
        .set_font_color(Color::RGB(FONT_COLOR))
        .set_background_color(Color::RGB(BACKGROUND_COLOR))
        .set_border(FormatBorder::Thin);

    match kind {
        ColumnKind::Text => format,
        ColumnKind::Currency => format.set_num_format("$0.00"),
        ColumnKind::Integer => format.set_num_format("0"),
        ColumnKind::Percent => format.set_num_format("0.00%"),
    }
}

/// Build the single-sheet workbook for a ranked report.
pub fn render_workbook(report: &RankedReport) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(report.strategy.sheet_name())?;

    for (col, column) in columns(report.strategy).iter().enumerate() {
        let col = col as u16;
        let format = cell_format(column.kind);

        worksheet.set_column_width(col, COLUMN_WIDTH)?;
        worksheet.set_column_format(col, &format)?;
        worksheet.write_string_with_format(0, col, &column.header, &format)?;

        for (i, record) in report.rows.iter().enumerate() {
            let row = (i + 1) as u32;
            match column.cell(record) {
                Cell::Text(text) => worksheet.write_string_with_format(row, col, text, &format)?,
                Cell::Number(value) => worksheet.write_number_with_format(row, col, value, &format)?,
                Cell::Blank => worksheet.write_blank(row, col, &format)?,
            };
        }
    }

    Ok(workbook)
}

/// Write the report to `path` as an `.xlsx` file.
pub fn write_xlsx(report: &RankedReport, path: &Path) -> Result<(), ReportError> {
    let mut workbook = render_workbook(report)?;
    workbook.save(path)?;
    info!("📄 Wrote {} rows to {}", report.rows.len(), path.display());
    Ok(())
}
