use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use wsnav_workspace::{Element, ElementKind, MarkerUpdate, Workspace};

use crate::args::GlobalArgs;
use crate::commands::Command;

#[derive(Debug, Parser)]
pub struct Show {
    /// JSON file holding the element tree
    tree: PathBuf,

    /// JSON file holding a batch of marker updates to apply before printing
    #[arg(long)]
    markers: Option<PathBuf>,

    /// Expand every folder instead of only the root
    #[arg(long)]
    expand_all: bool,
}

impl Command for Show {
    async fn execute(&self, _args: &GlobalArgs) -> Result<ExitCode> {
        let raw = fs::read_to_string(&self.tree)
            .with_context(|| format!("reading {}", self.tree.display()))?;
        let root: Element = serde_json::from_str(&raw).context("parsing element tree")?;

        let settings = wsnav_conf::Settings::new(&std::env::current_dir()?)?;
        debug!(
            clear_stale_markers = settings.clear_stale_markers,
            "settings loaded"
        );

        let workspace = Workspace::new();
        workspace.reload(root, settings.clear_stale_markers);

        if self.expand_all {
            expand_folders(&workspace, &workspace.get_root_path()?)?;
        }

        if let Some(markers) = &self.markers {
            let raw = fs::read_to_string(markers)
                .with_context(|| format!("reading {}", markers.display()))?;
            let updates: Vec<MarkerUpdate> =
                serde_json::from_str(&raw).context("parsing marker updates")?;
            workspace.update_markers(&updates);
        }

        print_visible(&workspace, &workspace.get_root_path()?, 0, settings.debug)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn expand_folders(workspace: &Workspace, path: &str) -> Result<()> {
    let info = workspace.get_element_info(path)?;
    if info.kind == ElementKind::Folder {
        workspace.set_expanded(path, true);
        for child in info.child_paths {
            expand_folders(workspace, &child)?;
        }
    }
    Ok(())
}

/// Pre-order walk of the visible tree: collapsed folders are printed but
/// their descendants are not.
fn print_visible(workspace: &Workspace, path: &str, depth: usize, with_paths: bool) -> Result<()> {
    let info = workspace.get_element_info(path)?;
    let indent = "  ".repeat(depth);
    let sigil = match info.kind {
        ElementKind::Folder if workspace.is_expanded(path) => '+',
        ElementKind::Folder => '>',
        ElementKind::File => '-',
    };

    let mut line = format!("{indent}{sigil} {}", info.name);
    if with_paths {
        line.push_str(&format!("  ({path})"));
    }
    let markers = workspace.get_markers(path);
    if !markers.is_empty() {
        line.push_str(&format!("  {}", serde_json::to_string(&markers)?));
    }
    println!("{line}");

    if info.kind == ElementKind::Folder && workspace.is_expanded(path) {
        for child in info.child_paths {
            print_visible(workspace, &child, depth + 1, with_paths)?;
        }
    }
    Ok(())
}
