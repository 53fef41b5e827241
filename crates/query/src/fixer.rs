// SPDX-License-Identifier: MIT OR Apache-2.0
//! A compiled pattern + filter/callback chain, applied bottom-up to one file's tree.

use std::path::Path;

use codeshift_cst::pattern::{find_all, Pattern};
use codeshift_cst::Tree;

use crate::transform::ParameterList;
use crate::{Callback, Filter, QueryError};

/// Compiled unit produced by [`crate::Query::compile`]. Bottom-up matching runs once per call to
/// [`Fixer::run`]; a fixer may be re-run against a different file (the pattern and callbacks are
/// read-only and shared across files, ยง5).
pub struct Fixer {
    pub(crate) pattern: Pattern,
    pub(crate) filters: Vec<Filter>,
    pub(crate) callbacks: Vec<Callback>,
    pub(crate) parameters: Option<ParameterList>,
}

impl Fixer {
    #[must_use]
    pub fn parameters(&self) -> Option<&ParameterList> {
        self.parameters.as_ref()
    }

    /// Runs this fixer's pattern against `tree`, bottom-up, invoking filters then callbacks on
    /// every match that passes all filters. Matches are collected before any callback mutates the
    /// tree, so a callback never re-matches a subtree it (or an earlier callback) just replaced.
    pub fn run(&self, tree: &mut Tree, path: &Path) -> Result<usize, QueryError> {
        let matches = find_all(tree, &self.pattern);
        let mut applied = 0;
        for m in matches {
            if !self.filters.iter().all(|f| f(tree, m.root, &m.captures, path)) {
                continue;
            }
            let mut current = m.root;
            let mut replaced = false;
            for cb in &self.callbacks {
                if let Some(new_id) = cb(tree, current, &m.captures, self.parameters.as_ref())? {
                    if replaced {
                        return Err(QueryError::MultipleReplacements);
                    }
                    replaced = true;
                    current = new_id;
                }
            }
            applied += 1;
        }
        Ok(applied)
    }
}
