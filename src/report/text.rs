//! report::text
//!
//! Column-aligned plain text.
//!
//! ```text
//! name      old time/op  new time/op  delta
//! pkg:example.com/widget
//! Encode-8  1.23µs ±2%    1.10µs ±1%   -10.57%  (p=0.012 n=5+5)
//! ```

use std::io::Write;

use super::{FormatError, Formatter, Report};
use crate::stats::Table;

/// Writes aligned, human-readable tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

enum Line {
    Cells(Vec<String>),
    Group(String),
}

impl Formatter for TextFormatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError> {
        if let Some(rev) = &report.revisions {
            writeln!(w, "base: {} ({})", rev.base_ref, rev.base.short(10))?;
            if rev.worktree_dirty {
                writeln!(w, "head: {} + uncommitted changes", rev.head.short(10))?;
            } else {
                writeln!(w, "head: {}", rev.head.short(10))?;
            }
            writeln!(w)?;
        }

        for (i, table) in report.tables.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            write_table(w, table)?;
        }
        Ok(())
    }
}

fn write_table(w: &mut dyn Write, table: &Table) -> Result<(), FormatError> {
    let mut lines = Vec::with_capacity(table.rows.len() + 1);

    let mut header = vec!["name".to_string()];
    header.extend(table.configs.iter().map(|c| format!("{} {}", c, table.metric)));
    if table.has_delta() {
        header.push("delta".to_string());
    }
    lines.push(Line::Cells(header));

    let mut group = "";
    for row in &table.rows {
        if row.group != group && !row.group.is_empty() {
            lines.push(Line::Group(row.group.clone()));
        }
        group = &row.group;

        let mut cells = vec![row.benchmark.clone()];
        cells.extend((0..table.configs.len()).map(|i| row.format_metric(i)));
        if table.has_delta() {
            cells.push(row.delta.clone());
            cells.push(row.note.clone());
        }
        lines.push(Line::Cells(cells));
    }

    let mut widths: Vec<usize> = Vec::new();
    for line in &lines {
        if let Line::Cells(cells) = line {
            for (i, cell) in cells.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
    }

    for line in &lines {
        match line {
            Line::Group(g) => writeln!(w, "{}", g)?,
            Line::Cells(cells) => {
                let mut out = String::new();
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        out.push_str("  ");
                    }
                    out.push_str(cell);
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    out.extend(std::iter::repeat(' ').take(pad));
                }
                writeln!(w, "{}", out.trim_end())?;
            }
        }
    }
    Ok(())
}
