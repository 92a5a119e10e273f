use std::io::Write;
use rust_xlsxwriter::{Workbook, XlsxError};
use crate::outcome::{OutcomeRecord, Summary};

pub const HEADERS: [&str; 3] = ["roll_number", "cgpa", "status"];
pub const SHEET_NAME: &str = "Results";

/// Writes the ranked results followed by the summary block as CSV.
pub fn write_report<W: Write>(writer: W, results: &[OutcomeRecord], summary: &Summary) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    csv_writer.write_record(HEADERS)?;
    for record in results {
        csv_writer.write_record([record.roll_number.as_str(), record.score.as_str(), record.status.as_str()])?;
    }

    csv_writer.write_record(["", "", ""])?;
    csv_writer.write_record(["Summary"])?;
    for (key, count) in summary.entries() {
        csv_writer.write_record([humanize(key), count.to_string()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(results: &[OutcomeRecord], summary: &Summary) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_report(&mut buf, results, summary)?;
    Ok(buf)
}

/// Renders the same layout as the CSV report into a single `Results` sheet.
///
/// Scores stay text so `--` and `8.50` come out as shown on the portal;
/// summary counts are written as numbers.
pub fn to_xlsx_bytes(results: &[OutcomeRecord], summary: &Summary) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string(0, col, header)?;
    }

    let mut row: u32 = 1;
    for record in results {
        sheet.write_string(row, 0, record.roll_number.as_str())?;
        sheet.write_string(row, 1, record.score.as_str())?;
        sheet.write_string(row, 2, record.status.as_str())?;
        row += 1;
    }

    // one blank row between the table and the summary block
    row += 1;
    sheet.write_string(row, 0, "Summary")?;
    for (key, count) in summary.entries() {
        row += 1;
        sheet.write_string(row, 0, humanize(key))?;
        sheet.write_number(row, 1, count as f64)?;
    }

    workbook.save_to_buffer()
}

/// `not_found` -> `Not found`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
