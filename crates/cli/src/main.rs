// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thin CLI surface over `codeshift`: `dump` previews matches, `do` assembles a query from flags,
//! `run` executes a named built-in codemod (ยง6).

mod codemod;
mod query_args;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codeshift", version, about = "A safe, programmable source-code refactoring engine.")]
struct Cli {
    /// Verbose (debug-level) logging.
    #[arg(long, global = true)]
    debug: bool,
    /// Suppress all but warning/error logging.
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every match of a pattern, without rewriting anything.
    Dump {
        /// Pattern-DSL text (see `codeshift_cst::pattern`).
        pattern: String,
        /// Files or directories to search (`.py` by default).
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        #[arg(long, default_value = ".py")]
        suffix: String,
    },
    /// Build a query from a pattern plus transform flags and run it.
    Do {
        #[command(flatten)]
        query: query_args::QueryArgs,
        /// Files or directories to refactor.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        /// Actually write changes (otherwise hunks are only reported).
        #[arg(long)]
        write: bool,
        /// Review each hunk interactively before writing.
        #[arg(short, long)]
        interactive: bool,
    },
    /// Run one of the built-in named codemods.
    Run {
        name: String,
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        #[arg(long)]
        write: bool,
        #[arg(short, long)]
        interactive: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet);

    match cli.command {
        Command::Dump { pattern, paths, suffix } => dump(&pattern, &paths, &suffix),
        Command::Do { query, paths, write, interactive } => {
            let q = query.build()?;
            run_query(q, &paths, write, interactive)
        }
        Command::Run { name, paths, write, interactive } => {
            let q = codemod::lookup(&name)
                .with_context(|| format!("no built-in codemod named {name:?}"))?
                .build();
            run_query(q, &paths, write, interactive)
        }
    }
}

fn init_logging(debug: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn dump(pattern: &str, paths: &[PathBuf], suffix: &str) -> Result<()> {
    let compiled = codeshift_selectors::pattern(pattern).context("invalid pattern")?;
    let files = collect_files(paths, suffix);
    for path in files {
        let Ok(src) = std::fs::read_to_string(&path) else { continue };
        let Ok(tree) = codeshift_fixture_lang::parse(&src) else { continue };
        for m in codeshift_cst::pattern::find_all(&tree, &compiled) {
            println!("{}: {}", path.display(), tree.text(m.root).trim());
        }
    }
    Ok(())
}

fn run_query(mut query: codeshift_query::Query, paths: &[PathBuf], write: bool, interactive: bool) -> Result<()> {
    let fixers = query.compile().context("failed to compile query")?;
    let files = collect_files(paths, ".py");
    let config = codeshift_driver::RunConfig {
        interactive,
        dry_run: !write && !interactive,
        in_process: false,
    };
    let driver = codeshift_driver::Driver::new(&fixers, config);
    let summary = driver.run(files)?;
    println!(
        "{} seen, {} changed, {} skipped, {} failed to re-parse",
        summary.files_seen, summary.files_changed, summary.files_skipped, summary.files_bad_transform
    );
    Ok(())
}

fn collect_files(paths: &[PathBuf], suffix: &str) -> Vec<PathBuf> {
    paths.iter().flat_map(|p| codeshift_driver::walk_files(p, suffix)).collect()
}
