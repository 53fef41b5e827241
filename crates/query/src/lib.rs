// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fluent composition of selectors, filters and callbacks into compiled [`Fixer`]s.
//!
//! A [`Query`] accumulates [`Transform`]s: `select_*` methods append one, `filter`/`rename`/
//! `add_argument`/... mutate whichever transform was appended most recently. [`Query::compile`]
//! resolves every transform to a [`Fixer`], ready to hand to the driver.

mod callbacks;
mod filters;
mod fixer;
mod transform;

pub use fixer::Fixer;
pub use transform::{ParamSpec, ParameterList, Star, Transform};

use std::path::Path;

use codeshift_cst::pattern::{Captures, Pattern, PatternError};
use codeshift_cst::NodeId;
use codeshift_imr::ImrError;

/// A query-building or fixer-execution error.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no active transform: call a select_* method before a filter or callback")]
    NoActiveTransform,
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Imr(#[from] ImrError),
    #[error("only the last fixer/callback may return a different node")]
    MultipleReplacements,
    #[error("add_argument/remove_argument on a call site needs a ParameterList (call Query::with_parameters first)")]
    MissingParameterList,
    #[error("no parameter named {0:?}")]
    NoSuchParameter(String),
    #[error("cannot remove a variadic parameter ({0:?})")]
    CannotRemoveVariadic(String),
    #[error("encapsulate requires an in_class filter on the transform")]
    EncapsulateNeedsInClass,
    #[error("encapsulate: internal name {0:?} begins with `__`, which triggers name mangling")]
    EncapsulateNameMangling(String),
}

pub(crate) type Filter = Box<dyn Fn(&codeshift_cst::Tree, NodeId, &Captures, &Path) -> bool + Send + Sync>;
/// A callback also receives the transform's described `ParameterList`, if [`Query::with_parameters`]
/// set one — `add_argument`/`remove_argument` are the only callbacks that read it.
pub(crate) type Callback = Box<
    dyn Fn(&mut codeshift_cst::Tree, NodeId, &Captures, Option<&ParameterList>) -> Result<Option<NodeId>, QueryError> + Send + Sync,
>;

/// Fluent builder: selectors append [`Transform`]s, filters/callbacks mutate the last one.
#[derive(Default)]
pub struct Query {
    transforms: Vec<Transform>,
    hunk_filters: Vec<Box<dyn Fn(&Path, &str) -> bool + Send + Sync>>,
    file_suffix: String,
    interactive: bool,
    dry_run: bool,
    exceptions: Vec<QueryError>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self {
            file_suffix: ".py".to_string(),
            ..Self::default()
        }
    }

    fn push(&mut self, pattern: Result<Pattern, PatternError>) -> &mut Self {
        self.transforms.push(Transform::new(pattern.map_err(QueryError::from)));
        self
    }

    pub fn select_root(&mut self) -> &mut Self {
        self.push(codeshift_selectors::root())
    }

    pub fn select_module(&mut self, dotted_name: &str) -> &mut Self {
        self.push(codeshift_selectors::module(dotted_name))
    }

    pub fn select_class(&mut self, name: &str) -> &mut Self {
        self.push(codeshift_selectors::class(name))
    }

    pub fn select_subclass(&mut self, name: &str) -> &mut Self {
        self.push(codeshift_selectors::subclass(name))
    }

    pub fn select_attribute(&mut self, name: &str) -> &mut Self {
        self.push(codeshift_selectors::attribute(name))
    }

    pub fn select_method(&mut self, class_name: &str, method_name: &str) -> &mut Self {
        self.push(codeshift_selectors::method(class_name, method_name))
    }

    pub fn select_function(&mut self, name: &str) -> &mut Self {
        self.push(codeshift_selectors::function(name))
    }

    pub fn select_var(&mut self, name: &str) -> &mut Self {
        self.push(codeshift_selectors::var(name))
    }

    /// Raw pattern text, bypassing the selector templates entirely.
    pub fn select_pattern(&mut self, text: &str) -> &mut Self {
        self.push(codeshift_selectors::pattern(text))
    }

    fn current(&mut self) -> Result<&mut Transform, QueryError> {
        self.transforms.last_mut().ok_or(QueryError::NoActiveTransform)
    }

    /// Attaches a `ParameterList` descriptor to the current transform, standing in for Bowler's
    /// introspection of a live callable (ยง9 Open Question — resolved by requiring the caller to
    /// describe the signature explicitly).
    pub fn with_parameters(&mut self, params: ParameterList) -> &mut Self {
        if let Ok(t) = self.current() {
            t.parameters = Some(params);
        }
        self
    }

    pub fn filter(&mut self, f: impl Fn(&codeshift_cst::Tree, NodeId, &Captures, &Path) -> bool + Send + Sync + 'static) -> &mut Self {
        if let Ok(t) = self.current() {
            t.filters.push(Box::new(f));
        }
        self
    }

    pub fn is_call(&mut self) -> &mut Self {
        self.filter(filters::is_call)
    }

    pub fn is_def(&mut self) -> &mut Self {
        self.filter(filters::is_def)
    }

    pub fn in_class(&mut self, name: Option<&str>) -> &mut Self {
        let name = name.map(str::to_string);
        if let Ok(t) = self.current() {
            t.in_class = Some(name.clone());
        }
        self.filter(move |tree, node, _captures, _path| filters::in_class(tree, node, name.as_deref()))
    }

    pub fn missing_parameter(&mut self, name: &str) -> &mut Self {
        let name = name.to_string();
        self.filter(move |tree, node, _captures, _path| filters::missing_parameter(tree, node, &name))
    }

    pub fn callback(
        &mut self,
        f: impl Fn(&mut codeshift_cst::Tree, NodeId, &Captures, Option<&ParameterList>) -> Result<Option<NodeId>, QueryError>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        if let Ok(t) = self.current() {
            t.callbacks.push(Box::new(f));
        }
        self
    }

    pub fn rename(&mut self, new_name: &str) -> &mut Self {
        let new_name = new_name.to_string();
        self.callback(move |tree, node, captures, _parameters| callbacks::rename(tree, node, captures, &new_name))
    }

    pub fn add_argument(&mut self, name: &str, value: &str, positional: bool) -> &mut Self {
        let name = name.to_string();
        let value = value.to_string();
        self.callback(move |tree, node, captures, parameters| {
            callbacks::add_argument(tree, node, captures, parameters, &name, &value, positional)
        })
    }

    pub fn remove_argument(&mut self, name: &str) -> &mut Self {
        let name = name.to_string();
        self.callback(move |tree, node, captures, parameters| callbacks::remove_argument(tree, node, captures, parameters, &name))
    }

    pub fn modify_argument(
        &mut self,
        name: &str,
        new_name: Option<&str>,
        default_value: Option<&str>,
    ) -> &mut Self {
        let name = name.to_string();
        let new_name = new_name.map(str::to_string);
        let default_value = default_value.map(str::to_string);
        self.callback(move |tree, node, captures, _parameters| {
            callbacks::modify_argument(tree, node, captures, &name, new_name.as_deref(), default_value.as_deref())
        })
    }

    pub fn encapsulate(&mut self, internal_name: &str) -> &mut Self {
        if let Ok(t) = self.current() {
            t.requires_in_class = true;
        }
        let internal_name = internal_name.to_string();
        self.callback(move |tree, node, captures, _parameters| callbacks::encapsulate(tree, node, captures, &internal_name))
    }

    pub fn add_hunk_filter(&mut self, f: impl Fn(&Path, &str) -> bool + Send + Sync + 'static) -> &mut Self {
        self.hunk_filters.push(Box::new(f));
        self
    }

    pub fn hunk_filters(&self) -> &[Box<dyn Fn(&Path, &str) -> bool + Send + Sync>] {
        &self.hunk_filters
    }

    pub fn file_suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.file_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn matches_file(&self, path: &Path) -> bool {
        path.to_string_lossy().ends_with(self.file_suffix.as_str())
    }

    pub fn interactive(&mut self, value: bool) -> &mut Self {
        self.interactive = value;
        self
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn dry_run(&mut self, value: bool) -> &mut Self {
        self.dry_run = value;
        self
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Non-fatal exceptions accumulated by the driver while running this query's fixers.
    #[must_use]
    pub fn exceptions(&self) -> &[QueryError] {
        &self.exceptions
    }

    pub fn record_exception(&mut self, err: QueryError) {
        self.exceptions.push(err);
    }

    /// Resolves every accumulated transform into a compiled [`Fixer`], draining them from the
    /// query (a `Fixer` owns its callbacks, which aren't `Clone`).
    pub fn compile(&mut self) -> Result<Vec<Fixer>, QueryError> {
        std::mem::take(&mut self.transforms)
            .into_iter()
            .map(Transform::compile)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn selector_before_filter_is_required() {
        let mut q = Query::new();
        assert!(matches!(q.current(), Err(QueryError::NoActiveTransform)));
    }

    #[test]
    fn compile_resolves_one_fixer_per_transform() {
        let mut q = Query::new();
        q.select_function("f").rename("g");
        q.select_class("C");
        let fixers = q.compile().unwrap();
        assert_eq!(fixers.len(), 2);
    }
}
