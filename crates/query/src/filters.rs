// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in filters: predicates a match's root node and captures must satisfy before any callback
//! runs. All of these inspect the match root's own shape rather than anything recorded in
//! captures, since [`codeshift_cst::pattern::Pattern::Alternation`] doesn't tag which branch fired
//! (ยง4.2).

use std::path::Path;

use codeshift_cst::pattern::Captures;
use codeshift_cst::{NodeId, NonterminalKind, TokenKind, Tree};
use codeshift_imr::explode;

/// The match root's argument-list node and its [`codeshift_imr::ListKind`], regardless of whether
/// `node` is a `funcdef` or a call site. `None` if the definition/call takes no arguments.
pub(crate) fn list_and_kind(tree: &Tree, node: NodeId) -> Option<(NodeId, codeshift_imr::ListKind)> {
    if tree.node_kind(node) == Some(NonterminalKind::Funcdef) {
        let parameters = tree.children(node)[2];
        let children = tree.children(parameters);
        // parameters< '(' [typedargslist] ')' >
        (children.len() == 3).then(|| (children[1], codeshift_imr::ListKind::Def))
    } else {
        call_arglist(tree, node).map(|list| (list, codeshift_imr::ListKind::Call))
    }
}

/// True when the match root is a function/method definition (`funcdef`), as opposed to a call
/// site. Pair with [`super::Query::select_function`], whose pattern matches both shapes.
#[must_use]
pub fn is_def(tree: &Tree, node: NodeId, _captures: &Captures, _path: &Path) -> bool {
    tree.node_kind(node) == Some(NonterminalKind::Funcdef)
}

/// True when the match root is a call site (`power< name trailer< '(' ... ')' > >`), as opposed
/// to a definition.
#[must_use]
pub fn is_call(tree: &Tree, node: NodeId, _captures: &Captures, _path: &Path) -> bool {
    call_trailer(tree, node).is_some()
}

/// Finds the call-shaped `trailer` child of a `power` match root, if there is one.
pub(crate) fn call_trailer(tree: &Tree, node: NodeId) -> Option<NodeId> {
    if tree.node_kind(node) != Some(NonterminalKind::Power) {
        return None;
    }
    tree.children(node).iter().copied().find(|&child| {
        tree.node_kind(child) == Some(NonterminalKind::Trailer)
            && tree
                .children(child)
                .first()
                .is_some_and(|&first| tree.token_kind(first) == Some(TokenKind::LPar))
    })
}

/// The call site's argument list node (an `arglist`, a bare `argument`, or `None` for `f()`).
pub(crate) fn call_arglist(tree: &Tree, node: NodeId) -> Option<NodeId> {
    let trailer = call_trailer(tree, node)?;
    let children = tree.children(trailer);
    // '(' [arglist | argument] ')'
    if children.len() == 3 { Some(children[1]) } else { None }
}

/// True when `node` is a `funcdef`/`classdef` itself lexically nested inside a `classdef` body
/// (any depth), optionally requiring that enclosing class be named `name`.
#[must_use]
pub fn in_class(tree: &Tree, node: NodeId, name: Option<&str>) -> bool {
    tree.ancestors(node).any(|ancestor| {
        tree.node_kind(ancestor) == Some(NonterminalKind::Classdef)
            && name.is_none_or(|wanted| class_name(tree, ancestor).as_deref() == Some(wanted))
    })
}

fn class_name(tree: &Tree, classdef: NodeId) -> Option<String> {
    // classdef< 'class' NAME ... >
    tree.children(classdef)
        .get(1)
        .and_then(|&name| tree.value(name))
        .map(str::to_string)
}

/// True when the call site at `node` has no existing argument named `name` (positional or
/// keyword) — used to guard `add_argument` against clobbering a caller that already passes it.
#[must_use]
pub fn missing_parameter(tree: &Tree, node: NodeId, name: &str) -> bool {
    let Some(arglist) = call_arglist(tree, node) else {
        return true;
    };
    match explode(tree, arglist) {
        Ok(args) => !args.iter().any(|a| a.name.as_deref() == Some(name)),
        Err(_) => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use codeshift_cst::pattern::find_all;
    use codeshift_fixture_lang::parse;

    fn only_match(src: &str, name: &str) -> (Tree, NodeId) {
        let tree = parse(src).unwrap();
        let pattern = codeshift_selectors::function(name).unwrap();
        let matches = find_all(&tree, &pattern);
        assert_eq!(matches.len(), 1);
        let root = matches[0].root;
        (tree, root)
    }

    #[test]
    fn is_def_true_for_definition_false_for_call() {
        let (tree, root) = only_match("def greet(name):\n    pass\n", "greet");
        let captures = Captures::default();
        let path = Path::new("a.py");
        assert!(is_def(&tree, root, &captures, path));
        assert!(!is_call(&tree, root, &captures, path));
    }

    #[test]
    fn is_call_true_for_call_site() {
        let (tree, root) = only_match("greet(name)\n", "greet");
        let captures = Captures::default();
        let path = Path::new("a.py");
        assert!(is_call(&tree, root, &captures, path));
        assert!(!is_def(&tree, root, &captures, path));
    }

    #[test]
    fn in_class_finds_enclosing_class_by_name() {
        let tree = parse("class Dog:\n    def bark(self):\n        pass\n").unwrap();
        let pattern = codeshift_selectors::function("bark").unwrap();
        let root = find_all(&tree, &pattern)[0].root;
        assert!(in_class(&tree, root, Some("Dog")));
        assert!(!in_class(&tree, root, Some("Cat")));
        assert!(in_class(&tree, root, None));
    }

    #[test]
    fn missing_parameter_detects_existing_keyword() {
        let (tree, root) = only_match("greet(name, timeout=5)\n", "greet");
        assert!(!missing_parameter(&tree, root, "timeout"));
        assert!(missing_parameter(&tree, root, "retries"));
    }

    #[test]
    fn missing_parameter_true_for_no_args_call() {
        let (tree, root) = only_match("greet()\n", "greet");
        assert!(missing_parameter(&tree, root, "timeout"));
    }
}
