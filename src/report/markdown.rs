//! report::markdown
//!
//! Pipe tables built by re-reading the CSV output.
//!
//! Each blank-line separated CSV block becomes one table. Numeric cells
//! are rewritten in their shortest form, so `1234.500000` renders as
//! `1234.5`. Group label rows are padded out to the header width.

use std::io::Write;

use super::csv::CsvFormatter;
use super::{FormatError, Formatter, Report};

/// Writes GitHub-flavored Markdown tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter {
    /// Omit the `±` range column after each value
    pub no_range: bool,
}

impl Formatter for MarkdownFormatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError> {
        let mut buf = Vec::new();
        CsvFormatter {
            no_range: self.no_range,
        }
        .format(&mut buf, report)?;

        let tables = csv_to_markdown(&String::from_utf8(buf)?)?;
        w.write_all(tables.join("\n").as_bytes())?;
        Ok(())
    }
}

/// Rewrite a cell holding a finite number in its shortest decimal form.
/// Any other cell is returned unchanged.
///
/// ```
/// use benchdiff::report::normalize_float;
///
/// assert_eq!(normalize_float("1.500000"), "1.5");
/// assert_eq!(normalize_float("100.000000"), "100");
/// assert_eq!(normalize_float("+1.23%"), "+1.23%");
/// ```
pub fn normalize_float(cell: &str) -> String {
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => v.to_string(),
        _ => cell.to_string(),
    }
}

/// Convert CSV text holding one or more blank-line separated tables into
/// one Markdown table per block.
pub fn csv_to_markdown(csv: &str) -> Result<Vec<String>, FormatError> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in csv.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks.iter().map(|block| block_to_markdown(block)).collect()
}

fn block_to_markdown(block: &str) -> Result<String, FormatError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(block.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(normalize_float).collect());
    }

    let Some(header) = records.first() else {
        return Ok(String::new());
    };
    let width = records.iter().map(Vec::len).max().unwrap_or(header.len());

    let mut out = String::new();
    push_row(&mut out, header, width);
    push_row(&mut out, &vec!["---".to_string(); width], width);
    for record in &records[1..] {
        push_row(&mut out, record, width);
    }
    Ok(out)
}

fn push_row(out: &mut String, cells: &[String], width: usize) {
    out.push('|');
    for i in 0..width {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        out.push(' ');
        out.push_str(&cell.replace('|', "\\|"));
        out.push_str(" |");
    }
    out.push('\n');
}
