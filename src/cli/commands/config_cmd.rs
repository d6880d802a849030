//! config command - Print the effective configuration

use super::load_config;
use crate::engine::Context;
use anyhow::{Context as _, Result};

/// Print the merged configuration as TOML, or with `paths` the files it
/// was loaded from.
pub fn config(ctx: &Context, paths: bool) -> Result<()> {
    let config = load_config(ctx)?;

    if paths {
        let show = |path: Option<&std::path::Path>| {
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        };
        println!("global: {}", show(config.global_config_loaded_from()));
        println!("repo: {}", show(config.repo_config_loaded_from()));
        return Ok(());
    }

    let text = config.to_toml().context("Failed to render config")?;
    print!("{}", text);
    Ok(())
}
