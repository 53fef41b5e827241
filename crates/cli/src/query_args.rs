// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flags that assemble a [`codeshift_query::Query`] for the `do` subcommand, in lieu of embedding
//! a scripting-language callback (ยง6: `do`'s expression is pattern-DSL text plus flags, never
//! evaluated as target-language code).

use anyhow::{bail, Context, Result};
use clap::Args;
use codeshift_query::Query;

#[derive(Args)]
pub struct QueryArgs {
    /// Select a function/method definition or call site by name.
    #[arg(long)]
    function: Option<String>,
    /// Select a class definition by name.
    #[arg(long)]
    class: Option<String>,
    /// Select a method, given as `Class.method`.
    #[arg(long, value_name = "CLASS.METHOD")]
    method: Option<String>,
    /// Select an attribute by name, regardless of what object it's accessed on.
    #[arg(long)]
    attribute: Option<String>,
    /// Select a bare variable reference by name.
    #[arg(long)]
    var: Option<String>,
    /// Select a module import by dotted name.
    #[arg(long)]
    module: Option<String>,
    /// Raw pattern-DSL text, bypassing the named selectors above.
    #[arg(long, conflicts_with_all = ["function", "class", "method", "attribute", "var", "module"])]
    pattern: Option<String>,

    /// Keep only matches that are call sites.
    #[arg(long)]
    is_call: bool,
    /// Keep only matches that are definitions.
    #[arg(long, conflicts_with = "is_call")]
    is_def: bool,
    /// Keep only matches inside a class, any class unless a name is given.
    #[arg(long, value_name = "NAME", num_args = 0..=1, default_missing_value = "")]
    in_class: Option<String>,
    /// Keep only call sites missing a keyword argument of this name.
    #[arg(long)]
    missing_parameter: Option<String>,

    /// Rename the captured definition or reference to this name.
    #[arg(long)]
    rename: Option<String>,
    /// Add an argument, given as `name=value`.
    #[arg(long, value_name = "NAME=VALUE")]
    add_argument: Option<String>,
    /// Add the new argument positionally instead of as a keyword.
    #[arg(long)]
    positional: bool,
    /// Remove an existing argument by name.
    #[arg(long)]
    remove_argument: Option<String>,
    /// Rename an existing argument, given as `from=to`.
    #[arg(long, value_name = "FROM=TO")]
    rename_argument: Option<String>,
    /// Change an existing argument's default value, given as `name=value`.
    #[arg(long, value_name = "NAME=VALUE")]
    set_argument_default: Option<String>,
    /// Rename a method and add a same-named private wrapper delegating to it.
    #[arg(long, value_name = "INTERNAL_NAME")]
    encapsulate: Option<String>,
}

impl QueryArgs {
    pub fn build(self) -> Result<Query> {
        let mut query = Query::new();
        self.select(&mut query)?;
        self.apply_filters(&mut query);
        self.apply_callbacks(&mut query)?;
        Ok(query)
    }

    fn select(&self, query: &mut Query) -> Result<()> {
        if let Some(name) = &self.function {
            query.select_function(name);
        } else if let Some(name) = &self.class {
            query.select_class(name);
        } else if let Some(spec) = &self.method {
            let (class_name, method_name) = split_pair(spec, '.').context("--method wants CLASS.METHOD")?;
            query.select_method(class_name, method_name);
        } else if let Some(name) = &self.attribute {
            query.select_attribute(name);
        } else if let Some(name) = &self.var {
            query.select_var(name);
        } else if let Some(name) = &self.module {
            query.select_module(name);
        } else if let Some(text) = &self.pattern {
            query.select_pattern(text);
        } else {
            bail!("pass one of --function/--class/--method/--attribute/--var/--module/--pattern");
        }
        Ok(())
    }

    fn apply_filters(&self, query: &mut Query) {
        if self.is_call {
            query.is_call();
        }
        if self.is_def {
            query.is_def();
        }
        if let Some(name) = &self.in_class {
            query.in_class(if name.is_empty() { None } else { Some(name.as_str()) });
        }
        if let Some(name) = &self.missing_parameter {
            query.missing_parameter(name);
        }
    }

    fn apply_callbacks(&self, query: &mut Query) -> Result<()> {
        if let Some(name) = &self.rename {
            query.rename(name);
        }
        if let Some(spec) = &self.add_argument {
            let (name, value) = split_pair(spec, '=').context("--add-argument wants NAME=VALUE")?;
            query.add_argument(name, value, self.positional);
        }
        if let Some(name) = &self.remove_argument {
            query.remove_argument(name);
        }
        let rename_argument = self
            .rename_argument
            .as_deref()
            .map(|spec| split_pair(spec, '=').context("--rename-argument wants FROM=TO"))
            .transpose()?;
        let set_default = self
            .set_argument_default
            .as_deref()
            .map(|spec| split_pair(spec, '=').context("--set-argument-default wants NAME=VALUE"))
            .transpose()?;
        match (rename_argument, set_default) {
            (Some((from, to)), Some((name, value))) if from == name => {
                query.modify_argument(name, Some(to), Some(value));
            }
            (Some((from, to)), other) => {
                query.modify_argument(from, Some(to), other.map(|(_, v)| v));
            }
            (None, Some((name, value))) => {
                query.modify_argument(name, None, Some(value));
            }
            (None, None) => {}
        }
        if let Some(internal_name) = &self.encapsulate {
            query.encapsulate(internal_name);
        }
        Ok(())
    }
}

fn split_pair<'a>(text: &'a str, sep: char) -> Result<(&'a str, &'a str)> {
    text.split_once(sep).with_context(|| format!("expected a {sep:?}-separated pair, got {text:?}"))
}
