// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arena-backed lossless concrete syntax tree.
//!
//! A [`Tree`] owns every node; callers address nodes through [`NodeId`] handles rather than
//! borrowed references, so the matcher and the IMR can build, graft and orphan subtrees without
//! fighting the borrow checker. The round-trip invariant — `tree.text(tree.root()) == source`
//! for a freshly parsed tree — is the thing every other module in this crate is built to
//! preserve: every leaf carries its own `prefix`, the raw whitespace/comment bytes that preceded
//! it in the original source, so reassembling leaves in order reproduces the source exactly.

use crate::token::{NonterminalKind, TokenKind};

/// Opaque handle to a node in a [`Tree`]. Only meaningful paired with the `Tree` that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Leaf {
        kind: TokenKind,
        value: String,
        prefix: String,
    },
    Node {
        kind: NonterminalKind,
        children: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    payload: Payload,
}

/// A lossless concrete syntax tree.
///
/// Every node lives in a flat arena; `NodeId(0)` is minted for the root the first time one is
/// set via [`Tree::new`]. Orphaned subtrees (left behind after [`Tree::replace`]) stay in the
/// arena until the whole tree is dropped — there is no garbage collector, matching the
/// single-file, single-pass lifetime every `Tree` lives under in the driver pipeline.
#[derive(Debug, Clone)]
pub struct Tree {
    entries: Vec<Entry>,
    root: NodeId,
}

impl Tree {
    /// Builds a new tree whose root is the given nonterminal with no children yet.
    #[must_use]
    pub fn new(root_kind: NonterminalKind) -> Self {
        let entries = vec![Entry {
            parent: None,
            payload: Payload::Node {
                kind: root_kind,
                children: Vec::new(),
            },
        }];
        Self {
            entries,
            root: NodeId(0),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, payload: Payload, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(u32::try_from(self.entries.len()).expect("tree exceeds u32::MAX nodes"));
        self.entries.push(Entry { parent, payload });
        id
    }

    /// Allocates a new leaf, not yet attached to any parent. Attach it with
    /// [`Tree::append_child`] or hand it to [`Tree::set_children`].
    pub fn new_leaf(
        &mut self,
        kind: TokenKind,
        value: impl Into<String>,
        prefix: impl Into<String>,
    ) -> NodeId {
        self.push(
            Payload::Leaf {
                kind,
                value: value.into(),
                prefix: prefix.into(),
            },
            None,
        )
    }

    /// Allocates a new interior node with the given children, not yet attached to any parent.
    pub fn new_node(&mut self, kind: NonterminalKind, children: Vec<NodeId>) -> NodeId {
        let id = self.push(
            Payload::Node {
                kind,
                children: children.clone(),
            },
            None,
        );
        for child in children {
            self.entries[child.index()].parent = Some(id);
        }
        id
    }

    /// Appends `child` to `parent`'s children list, reparenting it.
    ///
    /// # Panics
    /// Panics if `parent` is a leaf.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.entries[child.index()].parent = Some(parent);
        match &mut self.entries[parent.index()].payload {
            Payload::Node { children, .. } => children.push(child),
            Payload::Leaf { .. } => panic!("cannot append a child to a leaf node"),
        }
    }

    /// Replaces `node`'s entire children list with `children`, reparenting each.
    ///
    /// Used by the IMR to rewrite an argument list in place without disturbing the parent's
    /// identity (captures and prior references to `node` stay valid).
    ///
    /// # Panics
    /// Panics if `node` is a leaf.
    pub fn set_children(&mut self, node: NodeId, children: Vec<NodeId>) {
        for child in &children {
            self.entries[child.index()].parent = Some(node);
        }
        match &mut self.entries[node.index()].payload {
            Payload::Node { children: slot, .. } => *slot = children,
            Payload::Leaf { .. } => panic!("cannot set children on a leaf node"),
        }
    }

    /// Replaces `target` with `replacement` inside `target`'s parent's children list.
    ///
    /// `target` must not be the tree root. `replacement` may be a leaf or an interior node, and
    /// may already live elsewhere in the same arena (no copy is made). The old subtree rooted at
    /// `target` is left in the arena, unreachable from the root — a transform callback must never
    /// revisit it, and the fixer's bottom-up walk never will, since it only walks from the root.
    ///
    /// # Panics
    /// Panics if `target` is the tree root, or if `target` has no recorded parent.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) {
        assert!(target != self.root, "cannot replace the tree root");
        let parent = self.entries[target.index()]
            .parent
            .expect("replace target has no parent");
        self.entries[replacement.index()].parent = Some(parent);
        match &mut self.entries[parent.index()].payload {
            Payload::Node { children, .. } => {
                for slot in children.iter_mut() {
                    if *slot == target {
                        *slot = replacement;
                    }
                }
            }
            Payload::Leaf { .. } => unreachable!("a leaf cannot be a parent"),
        }
    }

    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.entries[id.index()].payload, Payload::Leaf { .. })
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.index()].parent
    }

    /// The node's children, empty for leaves.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.entries[id.index()].payload {
            Payload::Node { children, .. } => children,
            Payload::Leaf { .. } => &[],
        }
    }

    /// The interior nonterminal kind, or `None` for a leaf.
    #[must_use]
    pub fn node_kind(&self, id: NodeId) -> Option<NonterminalKind> {
        match &self.entries[id.index()].payload {
            Payload::Node { kind, .. } => Some(*kind),
            Payload::Leaf { .. } => None,
        }
    }

    /// The leaf token kind, or `None` for an interior node.
    #[must_use]
    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        match &self.entries[id.index()].payload {
            Payload::Leaf { kind, .. } => Some(*kind),
            Payload::Node { .. } => None,
        }
    }

    /// The symbolic type name: a nonterminal's grammar name, or a leaf's token name.
    #[must_use]
    pub fn type_name(&self, id: NodeId) -> &'static str {
        match &self.entries[id.index()].payload {
            Payload::Node { kind, .. } => kind.as_str(),
            Payload::Leaf { kind, .. } => kind.as_str(),
        }
    }

    /// A leaf's literal text, or `None` for an interior node.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<&str> {
        match &self.entries[id.index()].payload {
            Payload::Leaf { value, .. } => Some(value),
            Payload::Node { .. } => None,
        }
    }

    /// A leaf's prefix (preceding whitespace/comments), or `None` for an interior node.
    #[must_use]
    pub fn prefix(&self, id: NodeId) -> Option<&str> {
        match &self.entries[id.index()].payload {
            Payload::Leaf { prefix, .. } => Some(prefix),
            Payload::Node { .. } => None,
        }
    }

    /// Overwrites a leaf's value in place, leaving its prefix untouched.
    ///
    /// # Panics
    /// Panics if `id` is not a leaf.
    pub fn set_value(&mut self, id: NodeId, new_value: impl Into<String>) {
        match &mut self.entries[id.index()].payload {
            Payload::Leaf { value, .. } => *value = new_value.into(),
            Payload::Node { .. } => panic!("cannot set a value on an interior node"),
        }
    }

    /// In-order iterator over the leaves of the subtree rooted at `id`.
    pub fn leaves(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        LeafIter {
            tree: self,
            stack: vec![StackFrame::Enter(id)],
        }
    }

    /// Pre-order depth-first iterator over every node (leaf and interior) of the subtree rooted
    /// at `id`, `id` itself included first.
    pub fn dfs(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        DfsIter {
            tree: self,
            stack: vec![id],
        }
    }

    /// Reconstructs the exact source text of the subtree rooted at `id` by concatenating
    /// `prefix + value` over its leaves in order. For `id == self.root()` on a freshly parsed
    /// tree this equals the original input byte-for-byte.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for leaf in self.leaves(id) {
            if let Some(prefix) = self.prefix(leaf) {
                out.push_str(prefix);
            }
            if let Some(value) = self.value(leaf) {
                out.push_str(value);
            }
        }
        out
    }

    /// Returns `id`'s position among its parent's children, or `None` if `id` is the root.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// The sibling immediately before `id`, if any.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.child_index(id)?;
        idx.checked_sub(1).map(|i| self.children(parent)[i])
    }

    /// The sibling immediately after `id`, if any.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.child_index(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    /// Iterator over `id`'s ancestors, nearest first, root last.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }
}

enum StackFrame {
    Enter(NodeId),
}

struct LeafIter<'t> {
    tree: &'t Tree,
    stack: Vec<StackFrame>,
}

impl Iterator for LeafIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(StackFrame::Enter(id)) = self.stack.pop() {
            if self.tree.is_leaf(id) {
                return Some(id);
            }
            for &child in self.tree.children(id).iter().rev() {
                self.stack.push(StackFrame::Enter(child));
            }
        }
        None
    }
}

struct DfsIter<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(tree: &mut Tree, kind: TokenKind, value: &str, prefix: &str) -> NodeId {
        tree.new_leaf(kind, value, prefix)
    }

    #[test]
    fn round_trip_preserves_whitespace() {
        let mut tree = Tree::new(NonterminalKind::ExprStmt);
        let name = leaf(&mut tree, TokenKind::Name, "x", "");
        let equal = leaf(&mut tree, TokenKind::Equal, "=", " ");
        let number = leaf(&mut tree, TokenKind::Number, "1", "  ");
        let root = tree.root();
        tree.set_children(root, vec![name, equal, number]);

        assert_eq!(tree.text(root), "x= 1");
    }

    #[test]
    fn replace_swaps_subtree_without_touching_siblings() {
        let mut tree = Tree::new(NonterminalKind::Testlist);
        let a = leaf(&mut tree, TokenKind::Name, "a", "");
        let comma = leaf(&mut tree, TokenKind::Comma, ",", "");
        let b = leaf(&mut tree, TokenKind::Name, "b", " ");
        let root = tree.root();
        tree.set_children(root, vec![a, comma, b]);

        let replacement = tree.new_leaf(TokenKind::Name, "renamed", "");
        tree.replace(a, replacement);

        assert_eq!(tree.text(root), "renamed, b");
        assert_eq!(tree.children(root)[0], replacement);
        assert_eq!(tree.parent(replacement), Some(root));
    }

    #[test]
    fn next_and_prev_sibling_walk_children_in_order() {
        let mut tree = Tree::new(NonterminalKind::Testlist);
        let a = leaf(&mut tree, TokenKind::Name, "a", "");
        let comma = leaf(&mut tree, TokenKind::Comma, ",", "");
        let b = leaf(&mut tree, TokenKind::Name, "b", " ");
        let root = tree.root();
        tree.set_children(root, vec![a, comma, b]);

        assert_eq!(tree.next_sibling(a), Some(comma));
        assert_eq!(tree.prev_sibling(b), Some(comma));
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.prev_sibling(a), None);
    }

    #[test]
    fn ancestors_walks_to_root() {
        let mut tree = Tree::new(NonterminalKind::FileInput);
        let inner = tree.new_node(NonterminalKind::ExprStmt, vec![]);
        let leaf_id = leaf(&mut tree, TokenKind::Name, "x", "");
        tree.append_child(inner, leaf_id);
        let root = tree.root();
        tree.append_child(root, inner);

        let chain: Vec<_> = tree.ancestors(leaf_id).collect();
        assert_eq!(chain, vec![inner, root]);
    }
}
