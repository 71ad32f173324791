//! Running a [`Query`] over a tree.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use serde::Serialize;

use super::Query;
use super::matcher::Matcher;
use crate::tree::{Node, Point, TreeCursor};

/// Solutions kept per pattern attempt unless changed with
/// [`QueryCursor::set_match_limit`].
pub const DEFAULT_MATCH_LIMIT: u32 = 64;

/// One node bound to a capture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    /// Index into [`Query::capture_names`].
    pub index: u32,
}

/// One successful match of one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    /// Captures in document order.
    pub captures: Vec<QueryCapture<'tree>>,
    /// The node the match started at.
    root: Node<'tree>,
}

impl<'tree> QueryMatch<'tree> {
    /// Nodes bound to capture `index`.
    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |c| c.index == index)
            .map(|c| c.node)
    }
}

/// Flattened capture for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureRecord {
    pub pattern: usize,
    pub capture: String,
    pub kind: &'static str,
    pub start_byte: u32,
    pub end_byte: u32,
    pub start: Point,
    pub end: Point,
    pub text: String,
}

impl CaptureRecord {
    pub fn new(query: &Query, pattern: usize, capture: &QueryCapture<'_>) -> Self {
        let node = capture.node;
        Self {
            pattern,
            capture: query.capture_name(capture.index).unwrap_or_default().to_string(),
            kind: node.kind(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start: node.start_position(),
            end: node.end_position(),
            text: node.text().to_string(),
        }
    }
}

/// Execution state for running queries. Reusable across queries and trees.
#[derive(Debug, Clone)]
pub struct QueryCursor {
    byte_range: std::ops::Range<u32>,
    point_range: std::ops::Range<Point>,
    match_limit: u32,
    exceeded: bool,
}

impl Default for QueryCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCursor {
    pub fn new() -> Self {
        Self {
            byte_range: 0..u32::MAX,
            point_range: Point::new(0, 0)..Point::new(u32::MAX, u32::MAX),
            match_limit: DEFAULT_MATCH_LIMIT,
            exceeded: false,
        }
    }

    /// Only report matches whose root intersects `range`.
    pub fn set_byte_range(&mut self, range: std::ops::Range<u32>) -> &mut Self {
        self.byte_range = range;
        self
    }

    pub fn set_point_range(&mut self, range: std::ops::Range<Point>) -> &mut Self {
        self.point_range = range;
        self
    }

    pub fn match_limit(&self) -> u32 {
        self.match_limit
    }

    pub fn set_match_limit(&mut self, limit: u32) -> &mut Self {
        self.match_limit = limit.max(1);
        self
    }

    /// Whether the last run dropped solutions because of the match limit.
    pub fn did_exceed_match_limit(&self) -> bool {
        self.exceeded
    }

    /// Lazily yields matches of every enabled pattern within `node`, in document order.
    pub fn matches<'c, 'q, 'tree>(
        &'c mut self,
        query: &'q Query,
        node: Node<'tree>,
    ) -> QueryMatches<'c, 'q, 'tree> {
        self.exceeded = false;
        let matcher = Matcher::new(node.tree(), self.match_limit as usize);
        QueryMatches {
            cursor: self,
            query,
            walk: Some(node.walk()),
            matcher,
            pending: VecDeque::new(),
        }
    }

    /// Lazily yields individual captures in document order, each with the match it
    /// belongs to and its position within [`QueryMatch::captures`].
    pub fn captures<'c, 'q, 'tree>(
        &'c mut self,
        query: &'q Query,
        node: Node<'tree>,
    ) -> QueryCaptures<'c, 'q, 'tree> {
        QueryCaptures {
            matches: self.matches(query, node),
            buffered: HashMap::new(),
            heap: BinaryHeap::new(),
            watermark: 0,
            seq: 0,
            next_slot: 0,
        }
    }

    fn intersects(&self, node: &Node<'_>) -> bool {
        overlaps(node.start_byte(), node.end_byte(), &self.byte_range)
            && overlaps(node.start_position(), node.end_position(), &self.point_range)
    }
}

/// Half-open overlap; an empty node counts when it sits inside the range.
fn overlaps<T: Ord>(start: T, end: T, range: &std::ops::Range<T>) -> bool {
    if start == end {
        return range.start <= start && start < range.end;
    }
    end > range.start && start < range.end
}

/// Iterator returned by [`QueryCursor::matches`].
pub struct QueryMatches<'c, 'q, 'tree> {
    cursor: &'c mut QueryCursor,
    query: &'q Query,
    walk: Option<TreeCursor<'tree>>,
    matcher: Matcher<'tree>,
    pending: VecDeque<QueryMatch<'tree>>,
}

impl<'tree> QueryMatches<'_, '_, 'tree> {
    fn visit(&mut self, node: Node<'tree>) {
        let tree = node.tree();
        for (pattern_index, pattern) in self.query.enabled_patterns() {
            for solution in self.matcher.match_at(&pattern.root, node.id()) {
                let captures = solution
                    .into_iter()
                    .filter(|(id, _)| !self.query.is_capture_disabled(*id))
                    .map(|(index, id)| QueryCapture {
                        node: Node::new(tree, id),
                        index,
                    })
                    .collect();
                self.pending.push_back(QueryMatch {
                    pattern_index,
                    captures,
                    root: node,
                });
            }
        }
        self.cursor.exceeded |= self.matcher.exceeded();
    }
}

impl<'tree> Iterator for QueryMatches<'_, '_, 'tree> {
    type Item = QueryMatch<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.pending.pop_front() {
                return Some(found);
            }
            let walk = self.walk.as_mut()?;
            let node = walk.node();
            let inside = self.cursor.intersects(&node);
            if !walk.goto_next_preorder(inside) {
                self.walk = None;
            }
            if inside {
                self.visit(node);
            }
        }
    }
}

/// Iterator returned by [`QueryCursor::captures`].
pub struct QueryCaptures<'c, 'q, 'tree> {
    matches: QueryMatches<'c, 'q, 'tree>,
    /// Matches with captures still in the heap, by slot, with how many remain.
    buffered: HashMap<u64, (QueryMatch<'tree>, usize)>,
    /// `(node id, arrival, match slot, capture slot)`
    heap: BinaryHeap<Reverse<(u32, u64, u64, usize)>>,
    /// Id of the latest match root; no later capture can precede it.
    watermark: u32,
    seq: u64,
    next_slot: u64,
}

impl<'tree> QueryCaptures<'_, '_, 'tree> {
    /// Hands out the match behind a popped capture, dropping it after its last capture.
    fn take(&mut self, slot: u64, index: usize) -> Option<(QueryMatch<'tree>, usize)> {
        let (found, remaining) = self.buffered.get_mut(&slot)?;
        *remaining -= 1;
        if *remaining > 0 {
            return Some((found.clone(), index));
        }
        self.buffered.remove(&slot).map(|(found, _)| (found, index))
    }
}

impl<'tree> Iterator for QueryCaptures<'_, '_, 'tree> {
    type Item = (QueryMatch<'tree>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(Reverse((node, _, slot, index))) = self.heap.peek().copied() {
                if node <= self.watermark {
                    self.heap.pop();
                    return self.take(slot, index);
                }
            }
            match self.matches.next() {
                Some(found) => {
                    self.watermark = found.root.id();
                    if found.captures.is_empty() {
                        continue;
                    }
                    let slot = self.next_slot;
                    self.next_slot += 1;
                    for (index, capture) in found.captures.iter().enumerate() {
                        self.heap.push(Reverse((capture.node.id(), self.seq, slot, index)));
                        self.seq += 1;
                    }
                    let count = found.captures.len();
                    self.buffered.insert(slot, (found, count));
                }
                None => {
                    let Reverse((_, _, slot, index)) = self.heap.pop()?;
                    return self.take(slot, index);
                }
            }
        }
    }
}

#[cfg(test)]
impl QueryCaptures<'_, '_, '_> {
    pub(crate) fn buffered_len(&self) -> usize {
        self.buffered.len()
    }
}
