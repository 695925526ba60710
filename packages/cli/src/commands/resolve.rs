use super::load_config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use gbn_editor::{Breakpoint, StoreState};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// State file written by `gbn replay`
    pub state: PathBuf,

    /// Block id
    pub block: String,

    /// Breakpoint to resolve for (desktop, tablet, mobile, ...)
    pub breakpoint: String,

    /// Editor config file (defaults to gbn.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn resolve(args: ResolveArgs, cwd: &Path) -> Result<()> {
    let config = load_config(args.config.as_ref(), cwd)?;

    let content =
        fs::read_to_string(&args.state).with_context(|| format!("Failed to read {}", args.state.display()))?;
    let state: StoreState = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", args.state.display()))?;

    let breakpoint = Breakpoint::from(args.breakpoint);
    if !config.knows_breakpoint(&breakpoint) {
        tracing::warn!(breakpoint = %breakpoint, "Resolving for a breakpoint outside the configured set");
    }

    let effective = state
        .effective_config(&args.block, &breakpoint, &config.base_breakpoint)
        .ok_or_else(|| anyhow!("No block '{}' in {}", args.block, args.state.display()))?;

    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
