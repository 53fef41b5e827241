// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-file pipeline: read, parse, run fixers, serialize, diff, AST-revalidate.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use codeshift_fixture_lang::parse;
use codeshift_query::Fixer;
use tracing::{debug, info_span, warn};

use crate::hunks::{partition_hunks, Hunk};

/// What happened to one file during a run.
pub enum FileOutcome {
    /// Cancelled before processing began, or skipped because it couldn't be read/decoded/parsed
    /// (`ยง4.6` step 1-3: log and move on, never fail the whole run for one bad file).
    Skipped { reason: &'static str },
    /// No fixer matched anything; nothing to review.
    Unchanged,
    /// At least one fixer applied; `hunks`/`new_text` are ready for review.
    Changed { hunks: Vec<Hunk>, new_text: String },
    /// A fixer's output failed to re-parse — the rewrite is discarded, not written, and the hunks
    /// are reported for diagnosis only.
    BadTransform { hunks: Vec<Hunk> },
}

pub struct FileResult {
    pub path: PathBuf,
    pub original: String,
    pub outcome: FileOutcome,
}

/// Runs every fixer against one file, bottom-up, returning the outcome without writing anything
/// to disk — writing happens after interactive review, in the driver's main loop.
pub fn process_file(path: &Path, fixers: &[Fixer], cancel: &AtomicBool) -> FileResult {
    let span = info_span!("file", path = %path.display());
    let _enter = span.enter();

    if cancel.load(Ordering::Relaxed) {
        return skipped(path, "cancelled");
    }

    let Ok(bytes) = std::fs::read(path) else {
        warn!("failed to read file");
        return skipped(path, "read error");
    };
    let Ok(mut original) = String::from_utf8(bytes) else {
        warn!("failed to decode file as utf-8");
        return skipped(path, "decode error");
    };
    if !original.ends_with('\n') {
        original.push('\n');
    }

    let Ok(mut tree) = parse(&original) else {
        warn!("failed to parse file");
        return skipped(path, "parse error");
    };

    let mut applied = 0usize;
    for fixer in fixers {
        match fixer.run(&mut tree, path) {
            Ok(n) => applied += n,
            Err(err) => warn!(%err, "fixer failed on this file, skipping it"),
        }
    }

    if applied == 0 {
        return FileResult { path: path.to_path_buf(), original, outcome: FileOutcome::Unchanged };
    }

    let new_text = tree.text(tree.root());
    debug!(matches = applied, "fixers applied");

    if parse(&new_text).is_err() {
        tracing::error!("rewritten file failed to re-parse, discarding the rewrite");
        let hunks = partition_hunks(&original, &new_text);
        return FileResult { path: path.to_path_buf(), original, outcome: FileOutcome::BadTransform { hunks } };
    }

    let hunks = partition_hunks(&original, &new_text);
    FileResult { path: path.to_path_buf(), original, outcome: FileOutcome::Changed { hunks, new_text } }
}

fn skipped(path: &Path, reason: &'static str) -> FileResult {
    FileResult { path: path.to_path_buf(), original: String::new(), outcome: FileOutcome::Skipped { reason } }
}
