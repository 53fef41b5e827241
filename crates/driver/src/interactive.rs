// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `[y,n,q,a,d,?]` interactive hunk-review prompt (ยง4.6/ยง5), driven by raw-mode key reads so
//! the user doesn't have to press Enter after each choice.

use std::io::Write;
use std::path::Path;

use ansiterm::Colour;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal;

use crate::hunks::{Hunk, LineKind};

/// What the user decided about the file as a whole, once every hunk has been resolved (or the
/// user short-circuited with `a`/`d`/`q`).
pub enum PromptOutcome {
    /// One accept/reject decision per hunk, in order.
    Decisions(Vec<bool>),
    /// Quit immediately; decisions made so far (if any) should still be applied.
    Quit(Vec<bool>),
}

/// Walks the user through every hunk in `hunks` for `path`, one at a time.
pub fn prompt_hunks(path: &Path, hunks: &[Hunk]) -> std::io::Result<PromptOutcome> {
    terminal::enable_raw_mode()?;
    let outcome = run_prompt_loop(path, hunks);
    terminal::disable_raw_mode()?;
    outcome
}

fn run_prompt_loop(path: &Path, hunks: &[Hunk]) -> std::io::Result<PromptOutcome> {
    let mut decisions = Vec::with_capacity(hunks.len());
    for (index, hunk) in hunks.iter().enumerate() {
        loop {
            print_hunk(path, index, hunks.len(), hunk);
            match read_key()? {
                'y' => {
                    decisions.push(true);
                    break;
                }
                'n' => {
                    decisions.push(false);
                    break;
                }
                'a' => {
                    decisions.resize(hunks.len(), true);
                    return Ok(PromptOutcome::Decisions(decisions));
                }
                'd' => {
                    decisions.resize(hunks.len(), false);
                    return Ok(PromptOutcome::Decisions(decisions));
                }
                'q' => return Ok(PromptOutcome::Quit(decisions)),
                '?' => print_help(),
                _ => {}
            }
        }
    }
    Ok(PromptOutcome::Decisions(decisions))
}

fn read_key() -> std::io::Result<char> {
    loop {
        if let Event::Key(key) = event::read()? {
            if let KeyCode::Char(c) = key.code {
                return Ok(c);
            }
        }
    }
}

fn print_hunk(path: &Path, index: usize, total: usize, hunk: &Hunk) {
    println!("{} hunk {}/{} {}", path.display(), index + 1, total, hunk.header);
    for line in &hunk.lines {
        match line.kind {
            LineKind::Added => print!("{}", Colour::Green.paint(format!("+{}", line.text))),
            LineKind::Removed => print!("{}", Colour::Red.paint(format!("-{}", line.text))),
            LineKind::Context => print!(" {}", line.text),
        }
    }
    print!("Apply this hunk [y,n,q,a,d,?]? ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!(
        "y - apply this hunk\n\
         n - skip this hunk\n\
         q - quit, applying accepted hunks so far\n\
         a - apply this and every remaining hunk in this file\n\
         d - skip this and every remaining hunk in this file\n\
         ? - print this help"
    );
}
