// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intermediate representation of a function signature's or call-site's argument list.
//!
//! [`explode`] reads a `typedargslist` or `arglist` node into an ordered [`Vec<Argument>`];
//! [`build`] renders a `Vec<Argument>` back into fresh CST children. The two are reversible:
//! `explode(&tree, build(&mut tree, kind, &args)) == args` for any `args` (ยง-level invariant
//! this crate exists to guarantee). A value is carried as its exact rendered text rather than a
//! re-parsed subtree — [`build`] splices it back in as a single [`codeshift_cst::TokenKind::Verbatim`]
//! leaf. That's fine because a rebuilt list is always a terminal edit: the fixer never re-matches
//! a subtree it just replaced (ยง5), so the value never needs to be anything more than its own
//! text again.

use codeshift_cst::{NodeId, NonterminalKind, TokenKind, Tree};

/// Whether an argument came from (or should be rendered as) a call-site `arglist` entry or a
/// `typedargslist` (function definition) entry — the two use different CST shapes for the same
/// logical argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `f(a, b=2, *c)` — entries are `argument` nodes.
    Call,
    /// `def f(a, b=2, *c):` — entries are `tname`/`star_expr` nodes.
    Def,
}

/// Whether an argument is splatted, and with one or two stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Star {
    #[default]
    None,
    Star,
    DoubleStar,
}

/// One entry in an argument list, independent of whether it came from a call site or a
/// definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    /// The keyword name (`greeting` in `greeting='hi'`) or parameter name (`greeting` in
    /// `def f(greeting):`). `None` for a positional call-site argument.
    pub name: Option<String>,
    /// The rendered value text: a call-site argument's expression, or a parameter's default
    /// expression. Empty for a parameter with no default.
    pub value: String,
    /// Reserved for a type annotation (`greeting: str`); always `None` today, since the fixture
    /// grammar this crate's tests run against doesn't parse annotations. A richer grammar would
    /// populate it without changing this type.
    pub annotation: Option<String>,
    /// `*`/`**` splat marker.
    pub star: Star,
    /// Whitespace (and any comments) immediately preceding this argument — the text between the
    /// previous comma (or the opening paren) and this argument's first token.
    pub prefix: String,
}

/// An argument list operation failed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ImrError {
    #[error("node is not an argument list (found {found})")]
    NotAnArgumentList { found: &'static str },
    #[error("cannot build an empty argument list")]
    EmptyArgumentList,
    #[error("unrecognized argument list entry of kind {kind}")]
    UnrecognizedEntry { kind: &'static str },
    #[error("a definition-list argument must have a name")]
    MissingParameterName,
}

/// Reads `list`'s entries into an ordered [`Vec<Argument>`]. `list` is ordinarily an `arglist` or
/// `typedargslist` node — these wrap even a single entry, by convention of the grammars this
/// crate has been run against — but a bare `argument`/`tname`/`star_expr` node is also accepted,
/// for grammars that unwrap a single-element list instead.
pub fn explode(tree: &Tree, list: NodeId) -> Result<Vec<Argument>, ImrError> {
    let kind = tree.node_kind(list);
    match kind {
        Some(NonterminalKind::Arglist | NonterminalKind::Typedargslist) => tree
            .children(list)
            .iter()
            .filter(|&&child| tree.token_kind(child) != Some(TokenKind::Comma))
            .map(|&child| explode_one(tree, child))
            .collect(),
        Some(NonterminalKind::Argument | NonterminalKind::Tname | NonterminalKind::StarExpr) => {
            Ok(vec![explode_one(tree, list)?])
        }
        _ => Err(ImrError::NotAnArgumentList {
            found: kind.map_or("leaf", NonterminalKind::as_str),
        }),
    }
}

fn first_leaf_prefix(tree: &Tree, id: NodeId) -> String {
    tree.leaves(id)
        .next()
        .and_then(|leaf| tree.prefix(leaf))
        .unwrap_or_default()
        .to_string()
}

/// Like [`Tree::text`], but the very first leaf's prefix is dropped — used to read a value or
/// default expression's text without the whitespace that precedes the *argument as a whole*
/// (which is tracked separately, in [`Argument::prefix`]).
fn inner_text(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    for (i, leaf) in tree.leaves(id).enumerate() {
        if i > 0 {
            if let Some(prefix) = tree.prefix(leaf) {
                out.push_str(prefix);
            }
        }
        if let Some(value) = tree.value(leaf) {
            out.push_str(value);
        }
    }
    out
}

fn explode_one(tree: &Tree, id: NodeId) -> Result<Argument, ImrError> {
    let prefix = first_leaf_prefix(tree, id);
    match tree.node_kind(id) {
        Some(NonterminalKind::Argument) => {
            let children = tree.children(id);
            match children {
                [value] => Ok(Argument {
                    value: inner_text(tree, *value),
                    prefix,
                    ..Argument::default()
                }),
                [op, value] => {
                    let star = star_from_op(tree, *op)?;
                    Ok(Argument {
                        value: inner_text(tree, *value),
                        star,
                        prefix,
                        ..Argument::default()
                    })
                }
                [name, _equal, value] => Ok(Argument {
                    name: tree.value(*name).map(str::to_string),
                    value: inner_text(tree, *value),
                    prefix,
                    ..Argument::default()
                }),
                _ => Err(ImrError::UnrecognizedEntry { kind: "argument" }),
            }
        }
        Some(NonterminalKind::Tname) => {
            let children = tree.children(id);
            match children {
                [name] => Ok(Argument {
                    name: tree.value(*name).map(str::to_string),
                    prefix,
                    ..Argument::default()
                }),
                [name, _equal, value] => Ok(Argument {
                    name: tree.value(*name).map(str::to_string),
                    value: inner_text(tree, *value),
                    prefix,
                    ..Argument::default()
                }),
                _ => Err(ImrError::UnrecognizedEntry { kind: "tname" }),
            }
        }
        Some(NonterminalKind::StarExpr) => {
            let children = tree.children(id);
            let [op, name] = children else {
                return Err(ImrError::UnrecognizedEntry { kind: "star_expr" });
            };
            Ok(Argument {
                name: tree.value(*name).map(str::to_string),
                star: star_from_op(tree, *op)?,
                prefix,
                ..Argument::default()
            })
        }
        _ => Err(ImrError::UnrecognizedEntry {
            kind: tree.node_kind(id).map_or("leaf", NonterminalKind::as_str),
        }),
    }
}

fn star_from_op(tree: &Tree, op: NodeId) -> Result<Star, ImrError> {
    match tree.token_kind(op) {
        Some(TokenKind::Star) => Ok(Star::Star),
        Some(TokenKind::DoubleStar) => Ok(Star::DoubleStar),
        _ => Err(ImrError::UnrecognizedEntry { kind: "star operator" }),
    }
}

/// Renders `args` as fresh CST children — an `argument` or `tname`/`star_expr` node per entry,
/// with `,` leaves interspersed — ready to hand to [`codeshift_cst::Tree::set_children`].
pub fn build(tree: &mut Tree, kind: ListKind, args: &[Argument]) -> Result<Vec<NodeId>, ImrError> {
    if args.is_empty() {
        return Err(ImrError::EmptyArgumentList);
    }
    let mut out = Vec::with_capacity(args.len() * 2 - 1);
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(tree.new_leaf(TokenKind::Comma, ",", ""));
        }
        out.push(build_one(tree, kind, arg)?);
    }
    Ok(out)
}

/// Builds a fresh list node (`arglist`/`typedargslist`) and attaches it via [`Tree::replace`] in
/// place of `list`. Convenience wrapper around [`build`] for the common case of rewriting an
/// existing argument list in place. Always wraps in a list node, even for a single argument,
/// matching the convention that `arglist`/`typedargslist` wrap regardless of entry count.
pub fn replace(tree: &mut Tree, list: NodeId, kind: ListKind, args: &[Argument]) -> Result<NodeId, ImrError> {
    let children = build(tree, kind, args)?;
    let list_kind = match kind {
        ListKind::Call => NonterminalKind::Arglist,
        ListKind::Def => NonterminalKind::Typedargslist,
    };
    let fresh = tree.new_node(list_kind, children);
    tree.replace(list, fresh);
    Ok(fresh)
}

fn build_one(tree: &mut Tree, kind: ListKind, arg: &Argument) -> Result<NodeId, ImrError> {
    match kind {
        ListKind::Call => build_call_argument(tree, arg),
        ListKind::Def => build_def_entry(tree, arg),
    }
}

fn build_call_argument(tree: &mut Tree, arg: &Argument) -> Result<NodeId, ImrError> {
    match arg.star {
        Star::Star | Star::DoubleStar => {
            let op = star_leaf(tree, arg.star, arg.prefix.clone());
            let value = tree.new_leaf(TokenKind::Verbatim, arg.value.clone(), "");
            Ok(tree.new_node(NonterminalKind::Argument, vec![op, value]))
        }
        Star::None => {
            if let Some(name) = &arg.name {
                let name_leaf = tree.new_leaf(TokenKind::Name, name.clone(), arg.prefix.clone());
                let equal = tree.new_leaf(TokenKind::Equal, "=", "");
                let value = tree.new_leaf(TokenKind::Verbatim, arg.value.clone(), "");
                Ok(tree.new_node(NonterminalKind::Argument, vec![name_leaf, equal, value]))
            } else {
                let value = tree.new_leaf(TokenKind::Verbatim, arg.value.clone(), arg.prefix.clone());
                Ok(tree.new_node(NonterminalKind::Argument, vec![value]))
            }
        }
    }
}

fn build_def_entry(tree: &mut Tree, arg: &Argument) -> Result<NodeId, ImrError> {
    let name = arg.name.clone().ok_or(ImrError::MissingParameterName)?;
    match arg.star {
        Star::Star | Star::DoubleStar => {
            let op = star_leaf(tree, arg.star, arg.prefix.clone());
            let name_leaf = tree.new_leaf(TokenKind::Name, name, "");
            Ok(tree.new_node(NonterminalKind::StarExpr, vec![op, name_leaf]))
        }
        Star::None => {
            let name_leaf = tree.new_leaf(TokenKind::Name, name, arg.prefix.clone());
            if arg.value.is_empty() {
                Ok(tree.new_node(NonterminalKind::Tname, vec![name_leaf]))
            } else {
                let equal = tree.new_leaf(TokenKind::Equal, "=", "");
                let value = tree.new_leaf(TokenKind::Verbatim, arg.value.clone(), "");
                Ok(tree.new_node(NonterminalKind::Tname, vec![name_leaf, equal, value]))
            }
        }
    }
}

fn star_leaf(tree: &mut Tree, star: Star, prefix: String) -> NodeId {
    match star {
        Star::Star => tree.new_leaf(TokenKind::Star, "*", prefix),
        Star::DoubleStar => tree.new_leaf(TokenKind::DoubleStar, "**", prefix),
        Star::None => unreachable!("star_leaf called with Star::None"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use codeshift_fixture_lang::parse;

    fn call_arglist(src_call: &str) -> (Tree, NodeId) {
        let tree = parse(&format!("f{src_call}\n")).unwrap();
        // file_input -> simple_stmt -> expr_stmt -> power -> [NAME, trailer]
        let stmt = tree.children(tree.root())[0];
        let expr_stmt = tree.children(stmt)[0];
        let power = tree.children(expr_stmt)[0];
        let trailer = tree.children(power)[1];
        let arglist = tree.children(trailer)[1];
        (tree, arglist)
    }

    #[test]
    fn explode_reads_positional_keyword_and_star_args() {
        let (tree, arglist) = call_arglist("(a, greeting='hi', *rest)");
        let args = explode(&tree, arglist).unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].value, "a");
        assert_eq!(args[0].name, None);
        assert_eq!(args[1].name.as_deref(), Some("greeting"));
        assert_eq!(args[1].value, "'hi'");
        assert_eq!(args[2].star, Star::Star);
        assert_eq!(args[2].value, "rest");
        assert_eq!(args[1].prefix, " ");
    }

    #[test]
    fn build_then_explode_round_trips() {
        let (mut tree, arglist) = call_arglist("(a, greeting='hi', *rest)");
        let original = explode(&tree, arglist).unwrap();

        let rebuilt = replace(&mut tree, arglist, ListKind::Call, &original).unwrap();
        let round_tripped = explode(&tree, rebuilt).unwrap();

        assert_eq!(original, round_tripped);
    }

    #[test]
    fn build_inserts_a_new_keyword_argument() {
        let (mut tree, arglist) = call_arglist("(a)");
        let mut args = explode(&tree, arglist).unwrap();
        args.push(Argument {
            name: Some("timeout".into()),
            value: "30".into(),
            prefix: " ".into(),
            ..Argument::default()
        });

        let rebuilt = replace(&mut tree, arglist, ListKind::Call, &args).unwrap();
        assert_eq!(tree.text(rebuilt), "a, timeout=30");
    }

    #[test]
    fn explode_rejects_non_argument_list_node() {
        let (tree, arglist) = call_arglist("(a)");
        let argument = tree.children(arglist)[0];
        // an `argument` node IS a valid single-entry explode target
        assert!(explode(&tree, argument).is_ok());
        // but its own value child is not
        let value = tree.children(argument)[0];
        assert!(explode(&tree, value).is_err());
    }
}
