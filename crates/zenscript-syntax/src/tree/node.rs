//! Node handles.

use std::hash::{Hash, Hasher};

use crate::language::Field;
use crate::syntax::SyntaxKind;

use super::{NO_PARENT, NodeData, Point, Range, Tree, TreeCursor, flags};

/// A node of one [`Tree`] snapshot.
///
/// Two nodes are equal when they denote the same position in the same snapshot; an
/// edited copy of a tree is a different snapshot.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    id: u32,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, id: u32) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn data(&self) -> &'tree NodeData {
        self.tree.node_data(self.id)
    }

    #[inline]
    fn at(&self, id: u32) -> Node<'tree> {
        Node::new(self.tree, id)
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    /// Pre-order index of this node within its tree.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.data().kind.name()
    }

    pub fn kind_id(&self) -> u16 {
        self.data().kind as u16
    }

    pub fn syntax_kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn is_named(&self) -> bool {
        self.data().has(flags::NAMED)
    }

    /// Comments and preprocessor lines.
    pub fn is_extra(&self) -> bool {
        self.data().has(flags::EXTRA)
    }

    pub fn is_error(&self) -> bool {
        self.data().has(flags::ERROR)
    }

    /// A zero-width placeholder for something the parser expected but did not find.
    pub fn is_missing(&self) -> bool {
        self.data().has(flags::MISSING)
    }

    /// This node or a descendant is an `ERROR` or `MISSING` node.
    pub fn has_error(&self) -> bool {
        self.data().has(flags::HAS_ERROR)
    }

    /// The node overlapped an edit applied to its tree.
    pub fn has_changes(&self) -> bool {
        self.data().has(flags::HAS_CHANGES)
    }

    pub fn start_byte(&self) -> u32 {
        self.data().start_byte
    }

    pub fn end_byte(&self) -> u32 {
        self.data().end_byte
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte() as usize..self.end_byte() as usize
    }

    pub fn start_position(&self) -> Point {
        self.data().start_point
    }

    pub fn end_position(&self) -> Point {
        self.data().end_point
    }

    pub fn range(&self) -> Range {
        self.data().range()
    }

    /// The node's text in the tree's source. Empty when the range no longer fits the
    /// source, as after an edit.
    pub fn text(&self) -> &'tree str {
        self.tree.text().get(self.byte_range()).unwrap_or_default()
    }

    /// The node's text in `source`, which should be the text the tree describes.
    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(&source[self.byte_range()])
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        let parent = self.data().parent;
        (parent != NO_PARENT).then(|| self.at(parent))
    }

    pub fn child_count(&self) -> usize {
        self.data().child_count as usize
    }

    pub fn named_child_count(&self) -> usize {
        self.data().named_child_count as usize
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.tree
            .child_ids(self.id)
            .get(index)
            .map(|&id| self.at(id))
    }

    pub fn children(&self) -> Children<'tree> {
        Children {
            tree: self.tree,
            ids: self.tree.child_ids(self.id).iter(),
        }
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + 'tree {
        self.children().filter(Node::is_named)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.named_children().nth(index)
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        parent.child(self.data().index_in_parent as usize + 1)
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let index = (self.data().index_in_parent as usize).checked_sub(1)?;
        parent.child(index)
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        let mut node = self.next_sibling()?;
        while !node.is_named() {
            node = node.next_sibling()?;
        }
        Some(node)
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        let mut node = self.prev_sibling()?;
        while !node.is_named() {
            node = node.prev_sibling()?;
        }
        Some(node)
    }

    /// The field this node fills in its parent.
    pub fn field(&self) -> Option<Field> {
        self.data().field
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        let field = Field::from_name(name)?;
        self.children().find(|c| c.field() == Some(field))
    }

    pub fn child_by_field_id(&self, id: u16) -> Option<Node<'tree>> {
        let field = Field::from_id(id)?;
        self.children().find(|c| c.field() == Some(field))
    }

    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + 'tree {
        let field = Field::from_name(name);
        self.children()
            .filter(move |c| field.is_some() && c.field() == field)
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<&'static str> {
        self.child(index)?.field().map(Field::name)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn descendant_count(&self) -> usize {
        (self.data().subtree_end - self.id) as usize
    }

    /// Smallest node in this subtree that spans `start..end`.
    pub fn descendant_for_byte_range(&self, start: u32, end: u32) -> Option<Node<'tree>> {
        self.descend(|n| n.start_byte() <= start && end <= n.end_byte(), false)
    }

    /// Smallest named node in this subtree that spans `start..end`.
    pub fn named_descendant_for_byte_range(&self, start: u32, end: u32) -> Option<Node<'tree>> {
        self.descend(|n| n.start_byte() <= start && end <= n.end_byte(), true)
    }

    pub fn descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descend(
            |n| n.start_position() <= start && end <= n.end_position(),
            false,
        )
    }

    pub fn named_descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descend(
            |n| n.start_position() <= start && end <= n.end_position(),
            true,
        )
    }

    fn descend(&self, covers: impl Fn(&Node<'tree>) -> bool, named: bool) -> Option<Node<'tree>> {
        if !covers(self) {
            return None;
        }
        let mut node = *self;
        let mut last_named = self.is_named().then_some(*self);
        // Of two children touching an empty range, the later one wins.
        while let Some(child) = node.children().rev().find(|c| covers(c)) {
            node = child;
            if node.is_named() {
                last_named = Some(node);
            }
        }
        if named { last_named } else { Some(node) }
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(self.tree, self.id)
    }

    /// S-expression of the named nodes of this subtree, with field labels.
    ///
    /// Missing nodes print as `(MISSING kind)`; anonymous ones have their kind quoted.
    pub fn to_sexp(&self) -> String {
        enum Step<'t> {
            Enter(Node<'t>),
            Exit,
        }

        let mut out = String::new();
        let mut steps = vec![Step::Enter(*self)];
        while let Some(step) = steps.pop() {
            let node = match step {
                Step::Exit => {
                    out.push(')');
                    continue;
                }
                Step::Enter(node) => node,
            };
            let root = node == *self;
            if !root && !node.is_named() && !node.is_missing() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            if let Some(field) = node.field().filter(|_| !root) {
                out.push_str(field.name());
                out.push_str(": ");
            }
            if node.is_missing() {
                if node.is_named() {
                    out.push_str(&format!("(MISSING {}", node.kind()));
                } else {
                    out.push_str(&format!("(MISSING {:?}", node.kind()));
                }
            } else {
                out.push('(');
                out.push_str(node.kind());
            }
            steps.push(Step::Exit);
            let children: Vec<_> = node.children().collect();
            steps.extend(children.into_iter().rev().map(Step::Enter));
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tree.id() == other.tree.id()
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.id().hash(state);
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{Node {} {}..{}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

/// Iterator over a node's children.
#[derive(Clone)]
pub struct Children<'tree> {
    tree: &'tree Tree,
    ids: std::slice::Iter<'tree, u32>,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        self.ids.next().map(|&id| Node::new(self.tree, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| Node::new(self.tree, id))
    }
}

impl ExactSizeIterator for Children<'_> {}
