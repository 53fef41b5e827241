// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single accumulated selector + filter + callback registration, not yet compiled.

use codeshift_cst::pattern::Pattern;

use crate::{Callback, Filter, Fixer, QueryError};

/// `*`/`**` marker for a described parameter, mirroring `codeshift_imr::Star`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Star {
    #[default]
    None,
    Star,
    DoubleStar,
}

/// One parameter of a signature the caller describes explicitly, standing in for Bowler's
/// introspection of a live callable object (ยง9 Open Question).
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub has_default: bool,
    pub star: Star,
}

/// A function's full parameter list, supplied by the caller via [`crate::Query::with_parameters`]
/// so `add_argument`/`remove_argument` can reason about positions and existing `*`/`**` carriers
/// without needing a live callable to inspect.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    pub params: Vec<ParamSpec>,
}

impl ParameterList {
    #[must_use]
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    /// The index `name` would occupy among call-site arguments: position among the described
    /// parameters, counting past `self`/`cls`/`meta` since a call site never passes those
    /// explicitly.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.params.iter().filter(|p| !matches!(p.name.as_str(), "self" | "cls" | "meta")).position(|p| p.name == name)
    }

    #[must_use]
    pub fn has_double_star(&self) -> bool {
        self.params.iter().any(|p| p.star == Star::DoubleStar)
    }
}

/// A selector pattern plus the filters and callbacks registered against it, not yet compiled to
/// a [`Fixer`].
pub struct Transform {
    pub(crate) pattern: Result<Pattern, QueryError>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) callbacks: Vec<Callback>,
    pub(crate) parameters: Option<ParameterList>,
    pub(crate) in_class: Option<Option<String>>,
    pub(crate) requires_in_class: bool,
}

impl Transform {
    pub(crate) fn new(pattern: Result<Pattern, QueryError>) -> Self {
        Self {
            pattern,
            filters: Vec::new(),
            callbacks: Vec::new(),
            parameters: None,
            in_class: None,
            requires_in_class: false,
        }
    }

    pub(crate) fn compile(self) -> Result<Fixer, QueryError> {
        if self.requires_in_class && self.in_class.is_none() {
            return Err(QueryError::EncapsulateNeedsInClass);
        }
        let pattern = self.pattern?;
        Ok(Fixer {
            pattern,
            filters: self.filters,
            callbacks: self.callbacks,
            parameters: self.parameters,
        })
    }
}
