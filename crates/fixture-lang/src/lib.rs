// SPDX-License-Identifier: MIT OR Apache-2.0
//! A minimal lossless parser for a reduced Python-like subset.
//!
//! The pattern matcher and IMR are written against the symbolic grammar vocabulary in
//! `codeshift_cst` (ยง1 of the design this crate supports treats the real target-language grammar
//! as an external collaborator). This crate is the stand-in that gives this workspace's own
//! tests and demos something to build a [`codeshift_cst::Tree`] from: function and class
//! definitions, assignment, dotted attribute/call chains, imports, decorators, and a handful of
//! binary operators. It is not part of the refactoring engine itself.

mod parser;
mod tokenizer;

pub use codeshift_cst::Tree;

/// Parses `src` into a [`Tree`]. Round-trips exactly: `tree.text(tree.root()) == src`.
pub fn parse(src: &str) -> Result<Tree, FixtureError> {
    parser::parse(src)
}

/// A parse failure in the fixture grammar — a malformed test input, not a matcher or IMR bug.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FixtureError {
    #[error("{line}:{col}: unterminated string literal")]
    UnterminatedString { line: usize, col: usize },
    #[error("{line}:{col}: unexpected character {found:?}")]
    UnexpectedChar { found: char, line: usize, col: usize },
    #[error("{line}:{col}: expected {expected}, found {found:?}")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
        col: usize,
    },
    #[error("{line}:{col}: unexpected token {found:?}")]
    UnexpectedToken {
        found: String,
        line: usize,
        col: usize,
    },
    #[error("{line}:{col}: indentation does not start a new block")]
    BadIndent { line: usize, col: usize },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_module_with_import_and_function() {
        let src = "from collections import OrderedDict\n\ndef build():\n    return OrderedDict()\n";
        let tree = parse(src).unwrap();
        assert_eq!(tree.text(tree.root()), src);
    }
}
