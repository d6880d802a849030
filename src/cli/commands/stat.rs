//! stat command - Compare two existing result files

use std::io::Write;
use std::path::Path;

use super::{apply_report_args, load_config, open_output};
use crate::cli::args::StatArgs;
use crate::engine::{Context, DiffOptions};
use crate::report::{formatter_for, Report};
use crate::stats::parse_file;
use anyhow::{Context as _, Result};

/// Compare `args.old` against `args.new` without touching git.
pub fn stat(ctx: &Context, args: StatArgs) -> Result<()> {
    let config = load_config(ctx)?;
    let mut options = DiffOptions::from_config(&config);
    apply_report_args(&mut options, args.report)?;

    let (old_label, new_label) = labels(&args.old, &args.new);
    let mut collection = options.collection();
    for (label, path) in [(old_label, &args.old), (new_label, &args.new)] {
        let results =
            parse_file(path).with_context(|| format!("Failed to read results from {}", path.display()))?;
        collection.add_results(&label, results);
    }
    let report = Report::new(collection.tables());

    let mut out = open_output(args.output.as_ref())?;
    formatter_for(options.format, &options.format_options)
        .format(&mut out, &report)
        .context("Failed to write report")?;
    out.flush().context("Failed to write report")?;
    Ok(())
}

/// Column labels for two result files: their file stems, or the full
/// paths when the stems collide.
fn labels(old: &Path, new: &Path) -> (String, String) {
    let stem = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };
    let (a, b) = (stem(old), stem(new));
    if a == b {
        (old.display().to_string(), new.display().to_string())
    } else {
        (a, b)
    }
}
