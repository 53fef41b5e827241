// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parallel refactoring driver: walks a file set, runs a compiled set of
//! [`codeshift_query::Fixer`]s over each, and reviews the result as a diff (ยง4.6/ยง5).
//!
//! Each file is one unit of work for `rayon`'s work-stealing pool; cancellation (the user
//! pressing `q` mid-review) is a shared `AtomicBool` checked between files, since `rayon` has no
//! worker-shutdown hook to pass a literal sentinel through.

mod error;
mod hunks;
mod interactive;
mod pipeline;

pub use error::DriverError;
pub use hunks::{Hunk, HunkLine, LineKind};
pub use pipeline::{FileOutcome, FileResult};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use codeshift_query::Fixer;
use rayon::prelude::*;
use tracing::info;

/// How a [`Driver::run`] should behave: interactively, silently, and whether to touch disk at
/// all.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunConfig {
    /// Prompt per-hunk via [`interactive::prompt_hunks`] rather than accepting every hunk.
    pub interactive: bool,
    /// Compute and report hunks without ever writing to disk (`dump`'s preview mode, and tests).
    pub dry_run: bool,
    /// Process files on the calling thread instead of `rayon`'s pool, so a callback panic
    /// surfaces directly rather than through a crossed worker boundary (debugging).
    pub in_process: bool,
}

/// Per-run totals, printed by the CLI after [`Driver::run`] returns.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_seen: usize,
    pub files_changed: usize,
    pub files_skipped: usize,
    pub files_bad_transform: usize,
}

pub struct Driver<'a> {
    fixers: &'a [Fixer],
    config: RunConfig,
}

impl<'a> Driver<'a> {
    #[must_use]
    pub fn new(fixers: &'a [Fixer], config: RunConfig) -> Self {
        Self { fixers, config }
    }

    /// Runs every fixer over every file in `paths`, applying the interactive (or non-interactive)
    /// review policy and, unless `dry_run`, writing accepted changes back to disk.
    pub fn run(&self, paths: impl IntoIterator<Item = PathBuf>) -> Result<RunSummary, DriverError> {
        let paths: Vec<PathBuf> = paths.into_iter().collect();
        info!(files = paths.len(), "starting run");
        let cancel = AtomicBool::new(false);

        let results: Vec<FileResult> = if self.config.in_process {
            paths.iter().map(|p| pipeline::process_file(p, self.fixers, &cancel)).collect()
        } else {
            paths.par_iter().map(|p| pipeline::process_file(p, self.fixers, &cancel)).collect()
        };

        let mut summary = RunSummary { files_seen: results.len(), ..RunSummary::default() };
        for result in results {
            match self.review_and_apply(&result, &cancel)? {
                ReviewOutcome::Unchanged => {}
                ReviewOutcome::Skipped => summary.files_skipped += 1,
                ReviewOutcome::BadTransform => summary.files_bad_transform += 1,
                ReviewOutcome::Applied => summary.files_changed += 1,
                ReviewOutcome::Quit => {
                    cancel.store(true, Ordering::Relaxed);
                    info!(?summary, "run cancelled by user");
                    return Err(DriverError::BowlerQuit);
                }
            }
        }
        info!(?summary, "run complete");
        Ok(summary)
    }

    fn review_and_apply(&self, result: &FileResult, cancel: &AtomicBool) -> Result<ReviewOutcome, DriverError> {
        match &result.outcome {
            FileOutcome::Skipped { reason } => {
                tracing::warn!(path = %result.path.display(), reason, "skipped");
                Ok(ReviewOutcome::Skipped)
            }
            FileOutcome::Unchanged => Ok(ReviewOutcome::Unchanged),
            FileOutcome::BadTransform { .. } => {
                tracing::error!(path = %result.path.display(), "rewrite discarded: failed to re-parse");
                Ok(ReviewOutcome::BadTransform)
            }
            FileOutcome::Changed { hunks, new_text } => {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(ReviewOutcome::Skipped);
                }
                let final_text = if self.config.interactive {
                    match interactive::prompt_hunks(&result.path, hunks)
                        .map_err(|source| DriverError::Io { path: result.path.clone(), source })?
                    {
                        interactive::PromptOutcome::Decisions(decisions) => {
                            hunks::reconstruct(&result.original, new_text, hunks, &decisions)
                        }
                        interactive::PromptOutcome::Quit(decisions) => {
                            let partial = hunks::reconstruct(&result.original, new_text, hunks, &decisions);
                            if !self.config.dry_run {
                                write_file(&result.path, &partial)?;
                            }
                            return Ok(ReviewOutcome::Quit);
                        }
                    }
                } else {
                    new_text.clone()
                };
                if self.config.dry_run {
                    return Ok(ReviewOutcome::Applied);
                }
                write_file(&result.path, &final_text)?;
                Ok(ReviewOutcome::Applied)
            }
        }
    }
}

enum ReviewOutcome {
    Unchanged,
    Skipped,
    BadTransform,
    Applied,
    Quit,
}

fn write_file(path: &Path, contents: &str) -> Result<(), DriverError> {
    std::fs::write(path, contents).map_err(|source| DriverError::Io { path: path.to_path_buf(), source })
}

/// Walks `root`, honoring `.gitignore`/hidden-file conventions, yielding every file whose name
/// ends with `suffix`.
#[must_use]
pub fn walk_files(root: &Path, suffix: &str) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(root)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| path.to_string_lossy().ends_with(suffix))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use codeshift_selectors::function;

    fn rename_fixer(from: &str, to: &str) -> Fixer {
        let mut query = codeshift_query::Query::new();
        query.select_function(from).is_def().rename(to);
        query.compile().unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn dry_run_reports_change_without_writing() {
        let dir = std::env::temp_dir().join(format!("codeshift-driver-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("a.py");
        std::fs::write(&file, "def greet(name):\n    pass\n").unwrap();

        let fixer = rename_fixer("greet", "say_hello");
        let fixers = vec![fixer];
        let driver = Driver::new(&fixers, RunConfig { dry_run: true, ..RunConfig::default() });
        let summary = driver.run(vec![file.clone()]).unwrap();
        assert_eq!(summary.files_changed, 1);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "def greet(name):\n    pass\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn non_interactive_write_applies_the_full_rewrite() {
        let dir = std::env::temp_dir().join(format!("codeshift-driver-test-write-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("a.py");
        std::fs::write(&file, "def greet(name):\n    pass\n").unwrap();

        let fixer = rename_fixer("greet", "say_hello");
        let fixers = vec![fixer];
        let driver = Driver::new(&fixers, RunConfig::default());
        let summary = driver.run(vec![file.clone()]).unwrap();
        assert_eq!(summary.files_changed, 1);
        assert!(std::fs::read_to_string(&file).unwrap().contains("def say_hello(name):"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unparseable_rewrite_is_never_written() {
        // sanity check that `function` selector compiles; full BadTransform coverage belongs to
        // codeshift-imr/codeshift-query, which own the invariants that make a bad rewrite possible.
        assert!(function("greet").is_ok());
    }
}
