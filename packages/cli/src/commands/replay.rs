use super::load_config;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use gbn_editor::{DispatchOutcome, Store};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON file holding an array of actions
    pub actions: PathBuf,

    /// Editor config file (defaults to gbn.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the final state here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Dispatch counts for one replay
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
}

pub fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let config = load_config(args.config.as_ref(), cwd)?;
    let actions = read_actions(&args.actions)?;

    eprintln!("▶ {} {}", "Replaying".green().bold(), args.actions.display());

    let mut store = Store::with_config(&config);
    let summary = replay_into(&mut store, &actions);

    eprintln!("   Actions:  {}", actions.len());
    eprintln!("   {} {}", "Applied:".green(), summary.applied);
    if summary.rejected > 0 {
        eprintln!("   {} {}", "Rejected:".yellow(), summary.rejected);
    }

    let state = serde_json::to_string_pretty(&store.get_state())?;
    match args.output {
        Some(path) => {
            fs::write(&path, state).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("   {} {}", "✓".green(), path.display());
        }
        None => println!("{}", state),
    }

    Ok(())
}

/// Dispatch every action in order, counting outcomes
pub fn replay_into(store: &mut Store, actions: &[Value]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for (index, raw) in actions.iter().enumerate() {
        match store.dispatch_raw(raw) {
            DispatchOutcome::Applied => summary.applied += 1,
            DispatchOutcome::Rejected => {
                info!(index, "Action rejected");
                summary.rejected += 1;
            }
        }
    }

    summary
}

fn read_actions(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    match value {
        Value::Array(actions) => Ok(actions),
        _ => bail!("{} must contain a JSON array of actions", path.display()),
    }
}
