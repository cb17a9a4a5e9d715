use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use treecheck_core::{from_disk, verify, CollectMode, Completion};

mod input;
mod output;

use input::{load_expected, read_lines, resolve_path, TreeFormat};
use output::Output;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints the tree state of a directory.
    /// Files carry their contents; directories have none.
    Snapshot {
        /// Directory to collect
        dir: PathBuf,
        /// Format of the printed tree
        #[clap(long, value_enum, default_value = "toml")]
        format: TreeFormat,
    },
    /// Checks a directory against an expected tree file (.toml or .json).
    /// Exits with status 1 when they differ
    Verify {
        expected: PathBuf,
        dir: PathBuf,
    },
    /// Checks client output lines against an expected tree file.
    /// Lines that are not status lines, like `Exported revision 1.`, are skipped
    ParseOutput {
        expected: PathBuf,
        /// Path prefix to remove from reported paths, usually the operation target
        #[clap(long)]
        strip_prefix: Option<String>,
        /// Read lines from this file instead of stdin
        #[clap(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[clap(version, author, about)]
pub struct Cli {
    /// Output results as JSON
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

/// Returns whether the checked tree matched.
fn try_main() -> Result<bool> {
    env_logger::init();

    let cli = Cli::parse();
    let output = Output::new(cli.json);

    match cli.command {
        Command::Snapshot { dir, format } => {
            let dir = resolve_path(&dir)?;
            let state = from_disk(&dir)?;
            log::debug!("Collected {} entries from {}", state.len(), dir.display());
            output.state(&state, format)?;
            Ok(true)
        }
        Command::Verify { expected, dir } => {
            let expected = load_expected(&resolve_path(&expected)?)?;
            let dir = resolve_path(&dir)?;

            let mut existing = || Completion::success(Vec::new());
            let result = verify(&expected, &mut existing, CollectMode::disk(dir));
            output.result(&result);
            Ok(result.passed())
        }
        Command::ParseOutput {
            expected,
            strip_prefix,
            input,
        } => {
            let expected = load_expected(&resolve_path(&expected)?)?;
            let lines = read_lines(input.as_deref())?;
            log::debug!("Read {} output lines", lines.len());

            let mut captured = move || Completion::success(lines.clone());
            let mode = match strip_prefix {
                Some(prefix) => CollectMode::output_under(prefix),
                None => CollectMode::output(),
            };
            let result = verify(&expected, &mut captured, mode);
            output.result(&result);
            Ok(result.passed())
        }
    }
}

fn main() {
    match try_main() {
        Ok(true) => {}
        Ok(false) => ::std::process::exit(1),
        Err(e) => {
            eprintln!("{e:?}");
            ::std::process::exit(2)
        }
    }
}
