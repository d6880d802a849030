//! report::csv
//!
//! RFC 4180 output, one block per metric separated by a blank line.
//!
//! ```text
//! name,old time/op (ns/op),±,new time/op (ns/op),±,delta,note
//! pkg:example.com/widget
//! Encode-8,1234.000000,2%,1100.000000,1%,-10.86%,(p=0.012 n=5+5)
//! ```
//!
//! Values are written unscaled in the metric's base unit. Group labels
//! occupy a row of their own, so records are not all the same length.

use std::io::Write;

use super::{FormatError, Formatter, Report};
use crate::stats::Table;

/// Writes comma-separated tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter {
    /// Omit the `±` range column after each value
    pub no_range: bool,
}

impl Formatter for CsvFormatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError> {
        for (i, table) in report.tables.iter().enumerate() {
            if i > 0 {
                w.write_all(b"\n")?;
            }
            w.write_all(&self.table_bytes(table)?)?;
        }
        Ok(())
    }
}

impl CsvFormatter {
    fn table_bytes(&self, table: &Table) -> Result<Vec<u8>, FormatError> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());

        let mut header = vec!["name".to_string()];
        for config in &table.configs {
            header.push(format!("{} {} ({})", config, table.metric, table.unit));
            if !self.no_range {
                header.push("±".to_string());
            }
        }
        if table.has_delta() {
            header.push("delta".to_string());
            header.push("note".to_string());
        }
        writer.write_record(&header)?;

        let mut group = "";
        for row in &table.rows {
            if row.group != group && !row.group.is_empty() {
                writer.write_record([row.group.as_str()])?;
            }
            group = &row.group;

            let mut record = vec![row.benchmark.clone()];
            for metrics in &row.metrics {
                match metrics {
                    Some(m) => {
                        record.push(format!("{:.6}", m.mean));
                        if !self.no_range {
                            record.push(range_cell(m.relative_range(), m.rvalues.is_empty()));
                        }
                    }
                    None => {
                        record.push(String::new());
                        if !self.no_range {
                            record.push(String::new());
                        }
                    }
                }
            }
            if table.has_delta() {
                record.push(row.delta.clone());
                record.push(row.note.clone());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        writer.into_inner().map_err(|e| FormatError::Io(e.into_error()))
    }
}

fn range_cell(relative_range: f64, no_samples: bool) -> String {
    if no_samples {
        String::new()
    } else {
        format!("{:.0}%", relative_range * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Collection, DeltaTest};

    fn collection() -> Collection {
        let mut c = Collection::default();
        c.delta_test = DeltaTest::None;
        c.add_config("old", "BenchmarkA 1 1.5 ns/op\n");
        c.add_config("new", "BenchmarkA 1 3 ns/op\n");
        c
    }

    fn render(no_range: bool, report: &Report) -> String {
        let mut out = Vec::new();
        CsvFormatter { no_range }.format(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_header_and_rows() {
        let csv = render(false, &Report::new(collection().tables()));
        assert_eq!(
            csv,
            "name,old time/op (ns/op),±,new time/op (ns/op),±,delta,note\n\
             A,1.500000,0%,3.000000,0%,+100.00%,(n=1+1)\n"
        );
    }

    #[test]
    fn no_range_drops_columns() {
        let csv = render(true, &Report::new(collection().tables()));
        assert_eq!(
            csv,
            "name,old time/op (ns/op),new time/op (ns/op),delta,note\n\
             A,1.500000,3.000000,+100.00%,(n=1+1)\n"
        );
    }

    #[test]
    fn quotes_cells_with_commas() {
        let mut c = Collection::default();
        c.add_config("a,b", "BenchmarkA 1 1 ns/op\n");
        let csv = render(true, &Report::new(c.tables()));
        assert!(csv.starts_with("name,\"a,b time/op (ns/op)\"\n"), "{}", csv);
    }

    #[test]
    fn blank_line_between_tables() {
        let mut c = Collection::default();
        c.add_config("x", "pkg: p\nBenchmarkA 1 1 ns/op 2 B/op\n");
        let csv = render(true, &Report::new(c.tables()));
        assert_eq!(
            csv,
            "name,x time/op (ns/op)\npkg:p\nA,1.000000\n\nname,x alloc/op (B/op)\npkg:p\nA,2.000000\n"
        );
    }
}
