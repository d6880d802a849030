//! report::html
//!
//! A standalone HTML document. The header and footer wrap one
//! `<table class='benchstat'>` per metric; either may be replaced, and an
//! empty replacement is omitted entirely.

use std::io::Write;

use super::{FormatError, Formatter, Report};
use crate::stats::{Change, Table};

/// Document head written before the tables by default.
pub const DEFAULT_HTML_HEADER: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Performance Result Comparison</title>
<style>
.benchstat { border-collapse: collapse; }
.benchstat th:nth-child(1) { text-align: left; }
.benchstat tbody td:nth-child(1n+2):not(.note) { text-align: right; padding: 0em 1em; }
.benchstat tr:not(.configs) th { border-top: 1px solid #666; border-bottom: 1px solid #ccc; }
.benchstat .nodelta { text-align: center !important; }
.benchstat .better td.delta { font-weight: bold; }
.benchstat .worse td.delta { font-weight: bold; color: #c00; }
</style>
</head>
<body>
"#;

/// Document tail written after the tables by default.
pub const DEFAULT_HTML_FOOTER: &str = "</body>\n</html>\n";

/// Writes an HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlFormatter {
    header: String,
    footer: String,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl HtmlFormatter {
    /// `None` selects the default header or footer.
    pub fn new(header: Option<String>, footer: Option<String>) -> Self {
        Self {
            header: header.unwrap_or_else(|| DEFAULT_HTML_HEADER.to_string()),
            footer: footer.unwrap_or_else(|| DEFAULT_HTML_FOOTER.to_string()),
        }
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError> {
        w.write_all(self.header.as_bytes())?;
        for (i, table) in report.tables.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            write_table(w, table)?;
        }
        w.write_all(self.footer.as_bytes())?;
        Ok(())
    }
}

fn write_table(w: &mut dyn Write, table: &Table) -> Result<(), FormatError> {
    let delta = table.has_delta();
    let columns = table.configs.len() + 1 + if delta { 2 } else { 0 };

    writeln!(w, "<table class='benchstat'>")?;
    writeln!(w, "<thead>")?;
    if table.configs.len() > 1 {
        write!(w, "<tr class='configs'><th>")?;
        for config in &table.configs {
            write!(w, "<th>{}", escape(config))?;
        }
        writeln!(w)?;
    }
    write!(
        w,
        "<tr><th><th colspan='{}' class='metric'>{}",
        table.configs.len(),
        escape(&table.metric)
    )?;
    if delta {
        write!(w, "<th>delta")?;
    }
    writeln!(w)?;
    writeln!(w, "</thead>")?;
    writeln!(w, "<tbody>")?;

    let mut group = "";
    for row in &table.rows {
        if row.group != group && !row.group.is_empty() {
            writeln!(
                w,
                "<tr class='group'><th colspan='{}'>{}",
                columns,
                escape(&row.group)
            )?;
        }
        group = &row.group;

        if delta {
            write!(w, "<tr class='{}'>", change_class(row.change))?;
        } else {
            write!(w, "<tr>")?;
        }
        write!(w, "<td>{}", escape(&row.benchmark))?;
        for i in 0..table.configs.len() {
            write!(w, "<td>{}", escape(&row.format_metric(i)))?;
        }
        if delta {
            let class = if row.is_insignificant() { "nodelta" } else { "delta" };
            write!(w, "<td class='{}'>{}", class, escape(&row.delta))?;
            write!(w, "<td class='note'>{}", escape(&row.note))?;
        }
        writeln!(w)?;
    }

    writeln!(w, "<tr><td>&nbsp;")?;
    writeln!(w, "</tbody>")?;
    writeln!(w, "</table>")?;
    Ok(())
}

fn change_class(change: Change) -> &'static str {
    match change {
        Change::Better => "better",
        Change::Worse => "worse",
        Change::Unchanged => "unchanged",
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Collection, DeltaTest};

    fn render(formatter: &HtmlFormatter, report: &Report) -> String {
        let mut out = Vec::new();
        formatter.format(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report() -> Report {
        let mut c = Collection::default();
        c.delta_test = DeltaTest::None;
        c.add_config("old", "pkg: a<b>\nBenchmarkA 1 10 ns/op\nBenchmarkB 1 10 ns/op\n");
        c.add_config("new", "pkg: a<b>\nBenchmarkA 1 20 ns/op\nBenchmarkB 1 5 ns/op\n");
        Report::new(c.tables())
    }

    #[test]
    fn wraps_in_default_document() {
        let html = render(&HtmlFormatter::default(), &report());
        assert!(html.starts_with("<!doctype html>\n"));
        assert!(html.contains("<title>Performance Result Comparison</title>"));
        assert!(html.ends_with("</table>\n</body>\n</html>\n"));
    }

    #[test]
    fn marks_rows_by_change() {
        let html = render(&HtmlFormatter::default(), &report());
        assert!(html.contains("<tr class='configs'><th><th>old<th>new\n"));
        assert!(html.contains("<tr class='worse'><td>A<td>10.0ns ±0%<td>20.0ns ±0%<td class='delta'>+100.00%"));
        assert!(html.contains("<tr class='better'><td>B"));
        assert!(html.contains("<tr class='group'><th colspan='5'>pkg:a&lt;b&gt;\n"));
    }

    #[test]
    fn custom_and_empty_wrappers() {
        let formatter = HtmlFormatter::new(Some("<main>\n".into()), Some(String::new()));
        let html = render(&formatter, &report());
        assert!(html.starts_with("<main>\n<table class='benchstat'>"));
        assert!(html.ends_with("</table>\n"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&#34;x&#34;&gt;&amp;&#39;");
    }
}
