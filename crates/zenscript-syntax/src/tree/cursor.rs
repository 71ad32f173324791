//! Stateful tree navigation.
//!
//! A cursor walks the subtree of the node it was created from. Because node ids are
//! pre-order indices and every node records its parent and position among its siblings,
//! each move is O(1) except sibling scans and [`TreeCursor::goto_descendant`].

use crate::language::Field;

use super::{Node, Point, Tree, flags};

/// The child a directed descent moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundChild {
    pub index: usize,
    pub field_id: Option<u16>,
}

#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    root: u32,
    current: u32,
    depth: u32,
}

impl<'tree> TreeCursor<'tree> {
    pub(crate) fn new(tree: &'tree Tree, root: u32) -> Self {
        Self {
            tree,
            root,
            current: root,
            depth: 0,
        }
    }

    pub fn node(&self) -> Node<'tree> {
        Node::new(self.tree, self.current)
    }

    /// Depth below the node the cursor was created or reset at.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The current node's field. `None` at the cursor's root, whatever its parent.
    pub fn field_id(&self) -> Option<u16> {
        self.field().map(Field::id)
    }

    pub fn field_name(&self) -> Option<&'static str> {
        self.field().map(Field::name)
    }

    fn field(&self) -> Option<Field> {
        if self.current == self.root {
            return None;
        }
        self.tree.node_data(self.current).field
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.tree.child_ids(self.current).first() {
            Some(&child) => self.descend_to(child),
            None => false,
        }
    }

    pub fn goto_last_child(&mut self) -> bool {
        match self.tree.child_ids(self.current).last() {
            Some(&child) => self.descend_to(child),
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        self.current = self.tree.node_data(self.current).parent;
        self.depth -= 1;
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        self.goto_sibling(1)
    }

    pub fn goto_previous_sibling(&mut self) -> bool {
        self.goto_sibling(-1)
    }

    fn goto_sibling(&mut self, step: i64) -> bool {
        if self.current == self.root {
            return false;
        }
        let data = self.tree.node_data(self.current);
        let index = i64::from(data.index_in_parent) + step;
        let siblings = self.tree.child_ids(data.parent);
        match usize::try_from(index).ok().and_then(|i| siblings.get(i)) {
            Some(&sibling) => {
                self.current = sibling;
                true
            }
            None => false,
        }
    }

    fn descend_to(&mut self, child: u32) -> bool {
        self.current = child;
        self.depth += 1;
        true
    }

    /// Moves to the first child that extends past `byte`.
    pub fn goto_first_child_for_byte(&mut self, byte: u32) -> Option<FoundChild> {
        self.goto_first_child_where(|n| n.end_byte() > byte)
    }

    /// Moves to the first child that extends past `point`.
    pub fn goto_first_child_for_point(&mut self, point: Point) -> Option<FoundChild> {
        self.goto_first_child_where(|n| n.end_position() > point)
    }

    fn goto_first_child_where(&mut self, past: impl Fn(&Node<'tree>) -> bool) -> Option<FoundChild> {
        let index = self.node().children().position(|c| past(&c))?;
        let child = self.tree.child_ids(self.current)[index];
        self.descend_to(child);
        Some(FoundChild {
            index,
            field_id: self.field_id(),
        })
    }

    /// Pre-order index of the current node relative to the cursor's root.
    pub fn descendant_index(&self) -> u32 {
        self.current - self.root
    }

    /// Moves to the node with the given pre-order index relative to the cursor's root.
    pub fn goto_descendant(&mut self, index: u32) -> bool {
        let target = self.root.saturating_add(index);
        if target >= self.tree.node_data(self.root).subtree_end {
            return false;
        }
        let mut depth = 0;
        let mut node = target;
        while node != self.root {
            node = self.tree.node_data(node).parent;
            depth += 1;
        }
        self.current = target;
        self.depth = depth;
        true
    }

    /// Restarts the cursor at `node`, which becomes its new root.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree();
        self.root = node.id();
        self.current = self.root;
        self.depth = 0;
    }

    /// Copies the position of `other`, including its root.
    pub fn reset_to(&mut self, other: &TreeCursor<'tree>) {
        *self = other.clone();
    }

    /// Moves into the subtree of the current node in pre-order, skipping children when
    /// `descend` is false. Returns false once the root's subtree is exhausted.
    pub(crate) fn goto_next_preorder(&mut self, descend: bool) -> bool {
        if descend && self.goto_first_child() {
            return true;
        }
        loop {
            if self.goto_next_sibling() {
                return true;
            }
            if !self.goto_parent() {
                return false;
            }
        }
    }

    pub(crate) fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub(crate) fn is_extra(&self) -> bool {
        self.tree.node_data(self.current).has(flags::EXTRA)
    }
}
