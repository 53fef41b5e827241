// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lossless concrete syntax tree arena and declarative tree-pattern matcher.
//!
//! This crate has two halves:
//!
//! - [`Tree`] / [`NodeId`] / [`TokenKind`] / [`NonterminalKind`] (this module and [`token`]): an
//!   arena-based CST where every leaf carries the exact whitespace/comment bytes that preceded it
//!   (its `prefix`), so that concatenating `prefix + value` across leaves in order reproduces the
//!   original source byte-for-byte.
//! - [`pattern`]: a small declarative pattern language over that tree (`funcdef< NAME=name ... >`,
//!   alternation, repetition, optional groups, wildcards, named captures) and a bottom-up matcher
//!   that evaluates it.
//!
//! Parsing source text into a [`Tree`] is deliberately out of scope here — the concrete grammar
//! is an external collaborator. `codeshift-fixture-lang` is a minimal stand-in used by this
//! workspace's own tests and demos.

mod token;
mod tree;

pub mod pattern;

pub use token::{NonterminalKind, TokenKind};
pub use tree::{NodeId, Tree};
