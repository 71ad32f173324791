//! Derives the node arena from a green tree.
//!
//! Whitespace is dropped, hidden kinds are spliced into their parent, and leaf rules such
//! as `simple_name` are not descended into. A node's range runs from its first to its last
//! non-whitespace byte; the root always spans the whole source. Ids are assigned in
//! pre-order.

use rowan::{GreenNodeData, GreenTokenData, Language, NodeOrToken};

use crate::syntax::{SyntaxKind, ZsLang};

use super::{NO_PARENT, NodeData, Point, fields, flags};

type GreenElement<'g> = NodeOrToken<&'g GreenNodeData, &'g GreenTokenData>;

enum Event<'g> {
    Element(GreenElement<'g>),
    /// End of a green node; `true` when it opened an arena node.
    Close(bool),
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    byte: u32,
    point: Point,
}

#[derive(Debug)]
struct Open {
    id: u32,
    child_base: usize,
    opened_at: Mark,
    start: Option<Mark>,
    end: Option<Mark>,
}

struct ArenaBuilder {
    nodes: Vec<NodeData>,
    children: Vec<u32>,
    child_stack: Vec<u32>,
    open: Vec<Open>,
    cursor: Mark,
}

pub(super) fn build_arena(green: &GreenNodeData, source: &str) -> (Vec<NodeData>, Vec<u32>) {
    let mut builder = ArenaBuilder {
        nodes: Vec::with_capacity(source.len() / 3),
        children: Vec::with_capacity(source.len() / 3),
        child_stack: Vec::new(),
        open: Vec::new(),
        cursor: Mark {
            byte: 0,
            point: Point::default(),
        },
    };

    builder.open_node(ZsLang::kind_from_raw(green.kind()));
    let mut events = vec![Event::Close(true)];
    push_children(&mut events, green);

    while let Some(event) = events.pop() {
        match event {
            Event::Close(true) => builder.close_node(),
            Event::Close(false) => {}
            Event::Element(NodeOrToken::Token(token)) => {
                builder.token(ZsLang::kind_from_raw(token.kind()), token.text());
            }
            Event::Element(NodeOrToken::Node(node)) => {
                let kind = ZsLang::kind_from_raw(node.kind());
                if kind == SyntaxKind::Missing {
                    builder.missing(expected_kind(node));
                } else if kind.is_leaf_node() {
                    builder.leaf(kind, node);
                } else {
                    let public = !kind.is_hidden();
                    if public {
                        builder.open_node(kind);
                    }
                    events.push(Event::Close(public));
                    push_children(&mut events, node);
                }
            }
        }
    }

    let end = builder.cursor;
    let root = &mut builder.nodes[0];
    root.start_byte = 0;
    root.start_point = Point::default();
    root.end_byte = end.byte;
    root.end_point = end.point;

    (builder.nodes, builder.children)
}

fn push_children<'g>(events: &mut Vec<Event<'g>>, node: &'g GreenNodeData) {
    let children: Vec<GreenElement<'g>> = node.children().collect();
    events.extend(children.into_iter().rev().map(Event::Element));
}

/// Kind of the placeholder token a `Missing` node wraps.
fn expected_kind(node: &GreenNodeData) -> SyntaxKind {
    let raw = match node.children().next() {
        Some(NodeOrToken::Token(token)) => token.kind(),
        Some(NodeOrToken::Node(inner)) => inner.kind(),
        None => return SyntaxKind::SimpleName,
    };
    let kind = ZsLang::kind_from_raw(raw);
    if kind == SyntaxKind::Ident {
        SyntaxKind::SimpleName
    } else {
        kind
    }
}

fn base_flags(kind: SyntaxKind) -> u8 {
    let mut bits = 0;
    if kind.is_named() {
        bits |= flags::NAMED;
    }
    if kind.is_extra() {
        bits |= flags::EXTRA;
    }
    if kind == SyntaxKind::Error {
        bits |= flags::ERROR | flags::HAS_ERROR;
    } else if kind.is_error() {
        // Lexical error tokens always sit inside an `ERROR` node.
        bits |= flags::HAS_ERROR;
    }
    bits
}

impl ArenaBuilder {
    fn advance(&mut self, text: &str) -> (Mark, Mark) {
        let start = self.cursor;
        self.cursor = Mark {
            byte: start.byte + text.len() as u32,
            point: start.point.advance(text),
        };
        (start, self.cursor)
    }

    /// Registers a new arena node as the next child of the innermost open node.
    fn push_node(&mut self, kind: SyntaxKind, bits: u8, start: Mark, end: Mark) -> u32 {
        let id = self.nodes.len() as u32;
        let (parent, index_in_parent) = match self.open.last() {
            Some(open) => (open.id, (self.child_stack.len() - open.child_base) as u32),
            None => (NO_PARENT, 0),
        };
        if parent != NO_PARENT {
            self.child_stack.push(id);
        }
        self.nodes.push(NodeData {
            kind,
            flags: bits,
            field: None,
            start_byte: start.byte,
            end_byte: end.byte,
            start_point: start.point,
            end_point: end.point,
            parent,
            index_in_parent,
            children_start: 0,
            child_count: 0,
            named_child_count: 0,
            subtree_end: id + 1,
        });
        id
    }

    /// Extends the open nodes over `start..end`.
    fn content(&mut self, start: Mark, end: Mark) {
        for open in self.open.iter_mut().rev() {
            if open.start.is_some() {
                break;
            }
            open.start = Some(start);
        }
        if let Some(open) = self.open.last_mut() {
            open.end = Some(end);
        }
    }

    fn open_node(&mut self, kind: SyntaxKind) {
        let id = self.push_node(kind, base_flags(kind), self.cursor, self.cursor);
        self.open.push(Open {
            id,
            child_base: self.child_stack.len(),
            opened_at: self.cursor,
            start: None,
            end: None,
        });
    }

    fn close_node(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };

        let children_start = self.children.len();
        self.children.extend(self.child_stack.drain(open.child_base..));
        let child_ids = &self.children[children_start..];

        let mut named = 0;
        let mut child_error = false;
        for &child in child_ids {
            let child = &self.nodes[child as usize];
            named += u32::from(child.has(flags::NAMED));
            child_error |= child.has(flags::HAS_ERROR);
        }

        let start = open.start.unwrap_or(open.opened_at);
        let end = open.end.unwrap_or(start);
        let subtree_end = self.nodes.len() as u32;
        let node = &mut self.nodes[open.id as usize];
        node.start_byte = start.byte;
        node.start_point = start.point;
        node.end_byte = end.byte;
        node.end_point = end.point;
        node.children_start = children_start as u32;
        node.child_count = child_ids.len() as u32;
        node.named_child_count = named;
        node.subtree_end = subtree_end;
        if child_error {
            node.flags |= flags::HAS_ERROR;
        }
        let kind = node.kind;

        fields::assign_fields(kind, child_ids, &mut self.nodes);

        if let (Some(end), Some(parent)) = (open.end, self.open.last_mut()) {
            parent.end = Some(end);
        }
    }

    fn token(&mut self, kind: SyntaxKind, text: &str) {
        let (start, end) = self.advance(text);
        if kind == SyntaxKind::Whitespace {
            return;
        }
        self.content(start, end);
        if !kind.is_hidden() {
            self.push_node(kind, base_flags(kind), start, end);
        }
    }

    fn missing(&mut self, kind: SyntaxKind) {
        let mut bits = flags::MISSING | flags::HAS_ERROR;
        if kind.is_named() {
            bits |= flags::NAMED;
        }
        let at = self.cursor;
        self.content(at, at);
        self.push_node(kind, bits, at, at);
    }

    /// A rule exposed without children; its range covers its non-whitespace tokens.
    fn leaf(&mut self, kind: SyntaxKind, node: &GreenNodeData) {
        let mut first = None;
        let mut last = self.cursor;
        for child in node.children() {
            let NodeOrToken::Token(token) = child else {
                continue;
            };
            let (start, end) = self.advance(token.text());
            if ZsLang::kind_from_raw(token.kind()) != SyntaxKind::Whitespace {
                first.get_or_insert(start);
                last = end;
            }
        }
        let start = first.unwrap_or(last);
        self.content(start, last);
        self.push_node(kind, base_flags(kind), start, last);
    }
}
