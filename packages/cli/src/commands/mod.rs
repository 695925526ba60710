pub mod id;
pub mod replay;
pub mod resolve;

pub use id::{id, IdArgs};
pub use replay::{replay, ReplayArgs};
pub use resolve::{resolve, ResolveArgs};

use anyhow::{Context, Result};
use gbn_editor::EditorConfig;
use std::path::{Path, PathBuf};

/// Explicit `--config` file, else `gbn.config.json` in `cwd`, else defaults
pub(crate) fn load_config(explicit: Option<&PathBuf>, cwd: &Path) -> Result<EditorConfig> {
    match explicit {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => EditorConfig::load(cwd).with_context(|| {
            format!("Failed to load config {}", EditorConfig::path_in(cwd).display())
        }),
    }
}
