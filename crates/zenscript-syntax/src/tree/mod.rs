//! Immutable syntax tree snapshots.
//!
//! A [`Tree`] owns an arena of node records derived from the lossless green tree the parser
//! builds. Nodes are numbered in pre-order, so a node's id doubles as its descendant index
//! and its subtree occupies a contiguous id range. [`Node`] and [`TreeCursor`] are
//! `(tree, index)` handles into that arena.
//!
//! Trees never change after construction. [`Tree::edit`] returns a new snapshot whose
//! ranges are shifted to the edited source and which remembers the edit, so that the next
//! [`Parser::parse`](crate::Parser::parse) can reuse the parts the edit did not touch.

mod build;
mod changes;
mod cursor;
mod edit;
mod fields;
mod node;

#[cfg(test)]
mod changes_tests;
#[cfg(test)]
mod edit_tests;

pub use cursor::{FoundChild, TreeCursor};
pub use edit::InputEdit;
pub(crate) use edit::EditWindow;
pub use node::{Children, Node};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rowan::GreenNode;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::language::{Field, Language};
use crate::syntax::ast::ScriptFile;
use crate::syntax::reuse::ItemMeta;
use crate::syntax::{ParseOutput, PreviousParse, SyntaxKind, SyntaxNode, Token};

/// A 0-based row and byte column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// The point reached after `text` starting from `self`.
    pub(crate) fn advance(self, text: &str) -> Point {
        match text.rfind('\n') {
            Some(last) => Point {
                row: self.row + text.bytes().filter(|&b| b == b'\n').count() as u32,
                column: (text.len() - last - 1) as u32,
            },
            None => Point {
                row: self.row,
                column: self.column + text.len() as u32,
            },
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// A span in both byte and point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_byte: u32,
    pub end_byte: u32,
    pub start_point: Point,
    pub end_point: Point,
}

impl Range {
    /// Smallest range covering both.
    pub fn union(self, other: Range) -> Range {
        let (start_byte, start_point) = if other.start_byte < self.start_byte {
            (other.start_byte, other.start_point)
        } else {
            (self.start_byte, self.start_point)
        };
        let (end_byte, end_point) = if other.end_byte > self.end_byte {
            (other.end_byte, other.end_point)
        } else {
            (self.end_byte, self.end_point)
        };
        Range {
            start_byte,
            end_byte,
            start_point,
            end_point,
        }
    }
}

pub(crate) mod flags {
    pub const NAMED: u8 = 1 << 0;
    pub const EXTRA: u8 = 1 << 1;
    pub const ERROR: u8 = 1 << 2;
    pub const MISSING: u8 = 1 << 3;
    pub const HAS_ERROR: u8 = 1 << 4;
    pub const HAS_CHANGES: u8 = 1 << 5;
}

/// Sentinel parent of the root.
pub(crate) const NO_PARENT: u32 = u32::MAX;

/// One arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub kind: SyntaxKind,
    pub flags: u8,
    pub field: Option<Field>,
    pub start_byte: u32,
    pub end_byte: u32,
    pub start_point: Point,
    pub end_point: Point,
    pub parent: u32,
    pub index_in_parent: u32,
    /// Offset of the first child id in the tree's child table.
    pub children_start: u32,
    pub child_count: u32,
    pub named_child_count: u32,
    /// One past the last id in this node's subtree.
    pub subtree_end: u32,
}

impl NodeData {
    #[inline]
    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    pub fn range(&self) -> Range {
        Range {
            start_byte: self.start_byte,
            end_byte: self.end_byte,
            start_point: self.start_point,
            end_point: self.end_point,
        }
    }
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct TreeInner {
    id: u64,
    green: GreenNode,
    source: Arc<str>,
    nodes: Vec<NodeData>,
    children: Vec<u32>,
    tokens: Arc<[Token]>,
    items: Arc<[ItemMeta]>,
    diagnostics: Arc<Diagnostics>,
    /// Edits applied since the parse, merged into one window.
    edit: Option<EditWindow>,
}

/// A parsed ZenScript source. Cloning is O(1).
#[derive(Debug, Clone)]
pub struct Tree {
    inner: Arc<TreeInner>,
}

impl Tree {
    pub(crate) fn build(source: Arc<str>, output: ParseOutput) -> Tree {
        let (nodes, children) = build::build_arena(&output.green, &source);
        Tree::from_parts(TreeInner {
            id: 0,
            green: output.green,
            source,
            nodes,
            children,
            tokens: output.tokens.into(),
            items: output.items.into(),
            diagnostics: Arc::new(output.diagnostics),
            edit: None,
        })
    }

    fn from_parts(mut inner: TreeInner) -> Tree {
        inner.id = NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
        Tree {
            inner: Arc::new(inner),
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, 0)
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    /// The source this tree was parsed from.
    pub fn text(&self) -> &str {
        &self.inner.source
    }

    /// The shared source buffer. Every clone of this tree holds a reference to it.
    pub fn source_text(&self) -> &Arc<str> {
        &self.inner.source
    }

    pub fn language(&self) -> &'static Language {
        Language::zenscript()
    }

    /// Syntax errors found while parsing, in source order of discovery.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    /// Typed view of the lossless tree, trivia included.
    pub fn syntax(&self) -> ScriptFile {
        let root = SyntaxNode::new_root(self.inner.green.clone());
        ScriptFile::cast(root).expect("the parser always produces a script_file root")
    }

    /// Returns a copy of this tree with node ranges moved to match the edited source.
    ///
    /// Nodes that overlap the edit are flagged as changed. Pass the result to
    /// [`Parser::parse`](crate::Parser::parse) together with the new source to reparse
    /// incrementally. Several edits may be applied in sequence before reparsing.
    pub fn edit(&self, edit: &InputEdit) -> Tree {
        let edit = edit.normalized();
        let window = EditWindow::from_edit(&edit);
        let merged = match self.inner.edit {
            Some(previous) => previous.merge(window),
            None => window,
        };

        let nodes = self
            .inner
            .nodes
            .iter()
            .map(|node| edit.apply(node))
            .collect();

        Tree::from_parts(TreeInner {
            id: 0,
            green: self.inner.green.clone(),
            source: self.inner.source.clone(),
            nodes,
            children: self.inner.children.clone(),
            tokens: self.inner.tokens.clone(),
            items: self.inner.items.clone(),
            diagnostics: self.inner.diagnostics.clone(),
            edit: Some(merged),
        })
    }

    /// Ranges whose syntactic structure differs between `self` and `other`.
    ///
    /// `self` is normally an [edited](Tree::edit) tree and `other` the result of reparsing
    /// it. The ranges are disjoint, sorted, and in `other`'s coordinates.
    pub fn changed_ranges(&self, other: &Tree) -> Vec<Range> {
        changes::changed_ranges(self, other)
    }

    /// Parse state needed to reparse after an edit. `None` until the tree is edited.
    pub(crate) fn previous_parse(&self) -> Option<PreviousParse<'_>> {
        let window = self.inner.edit?;
        Some(PreviousParse {
            green: &self.inner.green,
            tokens: &self.inner.tokens,
            items: &self.inner.items,
            diagnostics: &self.inner.diagnostics,
            source_len: u32::from(self.inner.green.text_len()),
            window,
        })
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.inner.id
    }

    #[inline]
    pub(crate) fn node_data(&self, id: u32) -> &NodeData {
        &self.inner.nodes[id as usize]
    }

    pub(crate) fn node_count(&self) -> u32 {
        self.inner.nodes.len() as u32
    }

    /// Child ids of `id`, in order.
    pub(crate) fn child_ids(&self, id: u32) -> &[u32] {
        let data = self.node_data(id);
        let start = data.children_start as usize;
        &self.inner.children[start..start + data.child_count as usize]
    }

    pub(crate) fn same_snapshot(&self, other: &Tree) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
