mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{id, replay, resolve, IdArgs, ReplayArgs, ResolveArgs};
use tracing_subscriber::EnvFilter;

/// GBN CLI - inspect and replay visual builder editing sessions
#[derive(Parser, Debug)]
#[command(name = "gbn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch a recorded list of actions and print the final state
    Replay(ReplayArgs),

    /// Print the block id for a DOM path
    Id(IdArgs),

    /// Print a block's effective configuration at a breakpoint
    Resolve(ResolveArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Replay(args) => replay(args, &cwd),
        Command::Id(args) => id(args),
        Command::Resolve(args) => resolve(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
