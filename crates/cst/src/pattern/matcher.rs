// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bottom-up matching engine.
//!
//! Matching walks the tree in post-order (every descendant visited before its parent) so that
//! the driver can apply a fixer's innermost matches first, matching the spec's requirement that
//! matching be deterministic and that a replaced subtree never gets re-matched within the same
//! pass (ยง5) — a caller that stops descending into a node once it has rewritten it simply never
//! reaches the now-orphaned children again, since [`crate::Tree::replace`] detaches them from the
//! walk.
//!
//! A named capture inside a [`Pattern::Repeat`] collects one entry per iteration and is reported
//! back as [`Matched::Many`] in iteration order; anywhere else a capture binds to exactly one
//! node ([`Matched::Single`]). [`Pattern::Repeat`]/[`Pattern::Optional`] nested inside another
//! `Repeat`'s body are not supported — the inner pattern's "arity" (how many sibling slots one
//! iteration consumes) must be fixed, and a variable-arity inner pattern makes that undefined.

use codeshift_utils::RapidMap;

use crate::tree::{NodeId, Tree};

use super::Pattern;

/// What a single capture name bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    /// Bound to exactly one node (the common case).
    Single(NodeId),
    /// Bound to a run of nodes gathered across a [`Pattern::Repeat`]'s iterations.
    Many(Vec<NodeId>),
}

impl Matched {
    /// The single node, if this capture bound to exactly one.
    #[must_use]
    pub const fn as_single(&self) -> Option<NodeId> {
        match self {
            Self::Single(id) => Some(*id),
            Self::Many(_) => None,
        }
    }

    /// The bound nodes as a slice, whichever variant this is.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        match self {
            Self::Single(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }
}

/// Named captures produced by a successful match.
pub type Captures = RapidMap<String, Matched>;

/// A successful match: the node the whole pattern matched against, plus any named captures.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub root: NodeId,
    pub captures: Captures,
}

/// Tests `pattern` against exactly one node, returning the capture bindings on success.
#[must_use]
pub fn match_node(tree: &Tree, pattern: &Pattern, id: NodeId) -> Option<MatchResult> {
    let mut captures = Captures::default();
    if match_single(tree, pattern, id, &mut captures) {
        Some(MatchResult { root: id, captures })
    } else {
        None
    }
}

/// Finds every node matching `pattern`, visiting descendants before their ancestors.
#[must_use]
pub fn find_all(tree: &Tree, pattern: &Pattern) -> Vec<MatchResult> {
    let order: Vec<NodeId> = tree.dfs(tree.root()).collect();
    order
        .into_iter()
        .rev()
        .filter_map(|id| match_node(tree, pattern, id))
        .collect()
}

fn match_single(tree: &Tree, pattern: &Pattern, id: NodeId, captures: &mut Captures) -> bool {
    match pattern {
        Pattern::WildcardAny => true,
        Pattern::Literal(lit) => tree.is_leaf(id) && tree.value(id) == Some(lit.as_str()),
        Pattern::TypeAtom(name) => tree.type_name(id) == name,
        Pattern::ChildrenAnchor { kind, children } => {
            !tree.is_leaf(id)
                && tree.type_name(id) == kind
                && match_seq(tree, children, tree.children(id), captures)
        }
        Pattern::Alternation(branches) => branches.iter().any(|branch| {
            let mut trial = captures.clone();
            if match_single(tree, branch, id, &mut trial) {
                *captures = trial;
                true
            } else {
                false
            }
        }),
        Pattern::Capture { name, inner } => {
            if match_single(tree, inner, id, captures) {
                captures.insert(name.clone(), Matched::Single(id));
                true
            } else {
                false
            }
        }
        Pattern::Sequence(_) | Pattern::Repeat(_) | Pattern::Optional(_) => false,
    }
}

/// Matches an ordered list of pattern terms against an ordered list of sibling nodes, requiring
/// every sibling to be consumed (an anchored match, ยง4.1's `<...>`).
fn match_seq(tree: &Tree, pats: &[Pattern], nodes: &[NodeId], captures: &mut Captures) -> bool {
    let Some((first, rest)) = pats.split_first() else {
        return nodes.is_empty();
    };
    match first {
        Pattern::Repeat(inner) => {
            for k in (0..=nodes.len()).rev() {
                let mut trial = captures.clone();
                if match_repeat_prefix(tree, inner, &nodes[..k], &mut trial)
                    && match_seq(tree, rest, &nodes[k..], &mut trial)
                {
                    *captures = trial;
                    return true;
                }
            }
            false
        }
        Pattern::Optional(inner) => {
            if let Some((&head, tail)) = nodes.split_first() {
                let mut trial = captures.clone();
                if match_single(tree, inner, head, &mut trial) && match_seq(tree, rest, tail, &mut trial) {
                    *captures = trial;
                    return true;
                }
            }
            match_seq(tree, rest, nodes, captures)
        }
        other => {
            let Some((&head, tail)) = nodes.split_first() else {
                return false;
            };
            let mut trial = captures.clone();
            match_single(tree, other, head, &mut trial) && match_seq(tree, rest, tail, &mut trial) && {
                *captures = trial;
                true
            }
        }
    }
}

/// Fixed number of sibling slots one iteration of `pattern` consumes, or `None` if it is
/// variable (nested repeat/optional).
fn pattern_arity(pattern: &Pattern) -> Option<usize> {
    match pattern {
        Pattern::WildcardAny | Pattern::Literal(_) | Pattern::TypeAtom(_) | Pattern::ChildrenAnchor { .. } => {
            Some(1)
        }
        Pattern::Capture { inner, .. } => pattern_arity(inner),
        Pattern::Alternation(branches) => {
            let mut arities = branches.iter().map(|b| pattern_arity(b));
            let first = arities.next()??;
            arities.all(|a| a == Some(first)).then_some(first)
        }
        Pattern::Sequence(children) => children
            .iter()
            .try_fold(0usize, |acc, p| pattern_arity(p).map(|a| acc + a)),
        Pattern::Repeat(_) | Pattern::Optional(_) => None,
    }
}

fn match_repeat_prefix(tree: &Tree, inner: &Pattern, nodes: &[NodeId], captures: &mut Captures) -> bool {
    let Some(arity) = pattern_arity(inner) else {
        return nodes.is_empty();
    };
    if arity == 0 {
        return nodes.is_empty();
    }
    if nodes.len() % arity != 0 {
        return false;
    }
    let mut chunks = Vec::new();
    for chunk in nodes.chunks(arity) {
        let mut chunk_captures = Captures::default();
        let matched = match inner {
            Pattern::Sequence(terms) => match_seq(tree, terms, chunk, &mut chunk_captures),
            single => match_single(tree, single, chunk[0], &mut chunk_captures),
        };
        if !matched {
            return false;
        }
        chunks.push(chunk_captures);
    }
    merge_repeat_captures(captures, chunks);
    true
}

fn merge_repeat_captures(into: &mut Captures, chunks: Vec<Captures>) {
    let mut acc: RapidMap<String, Vec<NodeId>> = RapidMap::default();
    for chunk in chunks {
        for (name, matched) in chunk {
            let entry = acc.entry(name).or_default();
            match matched {
                Matched::Single(id) => entry.push(id),
                Matched::Many(ids) => entry.extend(ids),
            }
        }
    }
    for (name, ids) in acc {
        into.insert(name, Matched::Many(ids));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pattern::compile;
    use crate::{NonterminalKind, TokenKind};

    fn sample_call() -> Tree {
        // power< NAME=name trailer< '(' arglist< NAME ',' NAME > ')' > >
        let mut tree = Tree::new(NonterminalKind::Power);
        let name = tree.new_leaf(TokenKind::Name, "old_name", "");
        let lpar = tree.new_leaf(TokenKind::LPar, "(", "");
        let a = tree.new_leaf(TokenKind::Name, "a", "");
        let comma = tree.new_leaf(TokenKind::Comma, ",", "");
        let b = tree.new_leaf(TokenKind::Name, "b", " ");
        let rpar = tree.new_leaf(TokenKind::RPar, ")", "");
        let arglist = tree.new_node(NonterminalKind::Arglist, vec![a, comma, b]);
        let trailer = tree.new_node(NonterminalKind::Trailer, vec![lpar, arglist, rpar]);
        let root = tree.root();
        tree.set_children(root, vec![name, trailer]);
        tree
    }

    #[test]
    fn matches_call_and_captures_name() {
        let tree = sample_call();
        let pattern = compile("power< name=NAME trailer >").unwrap();
        let result = match_node(&tree, &pattern, tree.root()).expect("should match");
        let bound = result.captures.get("name").unwrap();
        let id = bound.as_single().expect("single capture");
        assert_eq!(tree.value(id), Some("old_name"));
    }

    #[test]
    fn repeat_collects_many_captures() {
        let tree = sample_call();
        let arglist = tree.children(*tree.children(tree.root()).last().unwrap())[1];
        let pattern = compile("arglist< item=NAME (',' item=NAME)* >").unwrap();
        let result = match_node(&tree, &pattern, arglist).expect("should match");
        let items = result.captures.get("item").unwrap();
        let values: Vec<_> = items
            .as_slice()
            .iter()
            .map(|&id| tree.value(id).unwrap())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn find_all_is_bottom_up() {
        let tree = sample_call();
        let pattern = compile("any").unwrap();
        let results = find_all(&tree, &pattern);
        // the root must be last since it is the only ancestor of everything else
        assert_eq!(results.last().unwrap().root, tree.root());
        assert!(results.len() > 1);
    }

    #[test]
    fn literal_mismatch_fails() {
        let tree = sample_call();
        let pattern = compile("power< 'new_name' trailer >").unwrap();
        assert!(match_node(&tree, &pattern, tree.root()).is_none());
    }
}
