use anyhow::{bail, Result};
use clap::Args;
use gbn_editor::{compute_id, hash_path};

#[derive(Args, Debug)]
pub struct IdArgs {
    /// DOM path, e.g. "html:0>body:0>main:0>section:1"
    pub path: String,

    /// Also print the raw 32-bit path hash
    #[arg(long)]
    pub hash: bool,
}

pub fn id(args: IdArgs) -> Result<()> {
    // Empty path is the document root's id
    if !args.path.is_empty() {
        if let Some(bad) = args.path.split('>').find(|segment| !is_segment(segment)) {
            bail!("Invalid path segment '{}', expected tag:index", bad);
        }
    }

    if args.hash {
        println!("{}\t{}", compute_id(&args.path), hash_path(&args.path));
    } else {
        println!("{}", compute_id(&args.path));
    }
    Ok(())
}

fn is_segment(segment: &str) -> bool {
    match segment.split_once(':') {
        Some((tag, index)) => !tag.is_empty() && index.parse::<usize>().is_ok(),
        None => false,
    }
}
