//! report::json

use std::io::Write;

use super::{FormatError, Formatter, Report};

/// Writes the whole [`Report`] as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError> {
        serde_json::to_writer_pretty(&mut *w, report)?;
        writeln!(w)?;
        Ok(())
    }
}
