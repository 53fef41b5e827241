// SPDX-License-Identifier: MIT OR Apache-2.0
//! codeshift - a safe, programmable source-code refactoring engine.
//!
//! This crate re-exports the workspace's component crates under one namespace: pattern matching
//! and the lossless tree (`cst`), the name/argument rewrite layer (`imr`), ready-made selectors
//! (`selectors`), the fluent query builder (`query`), and the per-file driver that reviews and
//! applies the result (`driver`).

pub use codeshift_cst as cst;
pub use codeshift_driver as driver;
pub use codeshift_imr as imr;
pub use codeshift_query as query;
pub use codeshift_selectors as selectors;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
