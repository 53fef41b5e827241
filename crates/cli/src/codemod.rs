// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in named codemods for `run`, standing in for Bowler's dynamically imported user module
//! (ยง6/ยง9): a `Codemod` trait object assembled ahead of time instead of loaded at runtime.

use codeshift_query::Query;

/// A reusable, named refactor. Each one builds the same [`Query`] a `do` invocation could
/// assemble by hand; `run` just saves re-typing the flags.
pub trait Codemod: Send + Sync {
    fn build(&self) -> Query;
}

struct Entry(fn() -> Query);

impl Codemod for Entry {
    fn build(&self) -> Query {
        (self.0)()
    }
}

const REGISTRY: &[(&str, Entry)] = &[
    ("rename-greet", Entry(rename_greet)),
    ("default-timeout", Entry(default_timeout)),
    ("backfill-missing-kwarg", Entry(backfill_missing_kwarg)),
];

#[must_use]
pub fn lookup(name: &str) -> Option<&'static dyn Codemod> {
    REGISTRY.iter().find(|(n, _)| *n == name).map(|(_, f)| f as &dyn Codemod)
}

/// Scenario 1: rename a function definition and every call site.
fn rename_greet() -> Query {
    let mut q = Query::new();
    q.select_function("greet").rename("say_hello");
    q
}

/// Scenario 3: add a keyword argument with a default value to a definition.
fn default_timeout() -> Query {
    let mut q = Query::new();
    q.select_function("connect").is_def().add_argument("timeout", "30", false);
    q
}

/// Scenario 4: add a keyword argument at call sites that don't already pass it.
fn backfill_missing_kwarg() -> Query {
    let mut q = Query::new();
    q.select_function("connect").is_call().missing_parameter("timeout").add_argument("timeout", "30", false);
    q
}
