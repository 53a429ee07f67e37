//! list command - Show a tool's patches in the local catalog

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::catalog::Catalog;
use crate::core::config::Config;
use crate::core::paths::CheckoutPaths;
use crate::core::types::Tool;
use crate::engine::Context;
use crate::ui::output;

/// Run the list command.
///
/// Listing ignores `--quiet`: the list is the command's output.
pub fn list(_ctx: &Context, tool: Tool, catalog_path: Option<PathBuf>, diffs: bool) -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let catalog_path = match catalog_path {
        Some(path) => path,
        None => CheckoutPaths::new(config.workspace_root()?, config.catalog_repo()).catalog_dir(),
    };

    let catalog = Catalog::for_tool(&catalog_path, tool).with_extensions(config.extensions());
    let patches = catalog.list_patches()?;
    tracing::debug!(count = patches.len(), root = %catalog.root().display(), "listing");

    for patch in &patches {
        println!("{}", patch.id);
        if diffs {
            let names: Vec<String> = catalog
                .variants(patch)
                .iter()
                .map(|v| v.file_name())
                .collect();
            if !names.is_empty() {
                println!("{}", output::format_list(&names, "  "));
            }
        }
    }

    Ok(())
}
