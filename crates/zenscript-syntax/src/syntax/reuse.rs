//! Bookkeeping that lets a re-parse adopt unchanged top-level items of the previous tree.
//!
//! Every top-level element of a script is recorded as an [`ItemMeta`]: its span, how far
//! past its end the parser looked while building it, and the parser state it started in.
//! After an edit, leading items whose lookahead ends before the edit are kept verbatim, and
//! the parse stops as soon as it reaches the start of an old item past the edit in the same
//! state that item was originally parsed in. The green subtrees of both runs are spliced
//! into a new root, which is then identical to what a full parse would produce.

use rowan::{GreenNode, NodeOrToken, TextSize};
use rowan::{GreenNodeData, GreenToken, GreenTokenData};

use super::cst::SyntaxKind;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::tree::EditWindow;

/// Whether import declarations are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Imports,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemMeta {
    pub start: u32,
    pub end: u32,
    /// Furthest byte (exclusive bound) the item's parse depended on. May exceed the source length.
    pub lookahead_end: u32,
    pub phase_before: Phase,
    pub phase_after: Phase,
    /// The item began on a token the lexer produced, not one the parser re-tokenized.
    pub clean_start: bool,
    /// The previous diagnostic was reported exactly at `start`, so a new one there is deduplicated.
    pub dedupe_at_start: bool,
    /// Last diagnostic position when the item ended, if it lies inside the item or after it.
    pub last_diagnostic_after: Option<u32>,
    /// Indices of this item's diagnostics in the tree's diagnostic list.
    pub diagnostics: std::ops::Range<usize>,
}

impl ItemMeta {
    fn shifted(&self, delta: i64, diagnostics: std::ops::Range<usize>) -> ItemMeta {
        let shift = |v: u32| (i64::from(v) + delta) as u32;
        ItemMeta {
            start: shift(self.start),
            end: shift(self.end),
            lookahead_end: shift(self.lookahead_end),
            phase_before: self.phase_before,
            phase_after: self.phase_after,
            clean_start: self.clean_start,
            dedupe_at_start: self.dedupe_at_start,
            last_diagnostic_after: self.last_diagnostic_after.map(shift),
            diagnostics,
        }
    }
}

/// Old items past the edit, in old coordinates, that a re-parse may stop at.
#[derive(Debug, Clone)]
pub(crate) struct SuffixCandidates {
    pub items: Vec<ItemMeta>,
    pub window: EditWindow,
}

impl SuffixCandidates {
    /// Index of the old item that a fresh item at `start` (new coordinates) may be replaced by.
    pub fn lookup(&self, start: u32, phase: Phase, dedupe_at_start: bool) -> Option<usize> {
        if start < self.window.new_end {
            return None;
        }
        let old_start = (i64::from(start) - self.window.delta()) as u32;
        let index = self
            .items
            .binary_search_by_key(&old_start, |item| item.start)
            .ok()?;
        let item = &self.items[index];
        (item.clean_start && item.phase_before == phase && item.dedupe_at_start == dedupe_at_start)
            .then_some(index)
    }
}

/// How much of an old parse survives an edit at its head.
#[derive(Debug)]
pub(crate) struct ReusePlan {
    /// Number of leading old items kept verbatim.
    pub prefix_items: usize,
    /// End of the last kept item, or 0.
    pub prefix_end: u32,
    pub phase: Phase,
    pub last_diagnostic_pos: Option<TextSize>,
}

impl ReusePlan {
    pub fn new(items: &[ItemMeta], window: &EditWindow) -> Self {
        let prefix_items = items
            .iter()
            .take_while(|item| item.lookahead_end <= window.start)
            .count();
        let last = prefix_items.checked_sub(1).map(|i| &items[i]);
        ReusePlan {
            prefix_items,
            prefix_end: last.map_or(0, |item| item.end),
            phase: last.map_or(Phase::Imports, |item| item.phase_after),
            last_diagnostic_pos: last
                .and_then(|item| item.last_diagnostic_after)
                .map(TextSize::from),
        }
    }
}

/// Splices kept old root children around a freshly parsed middle section.
///
/// `fresh` is a `ScriptFile` node whose children replace everything between the end of the
/// kept prefix and the start of the adopted suffix.
pub(crate) fn stitch_root(
    old_root: &GreenNode,
    prefix_end: u32,
    fresh: &GreenNode,
    suffix_start: Option<u32>,
) -> GreenNode {
    let mut children = Vec::new();
    let mut suffix = Vec::new();
    let mut offset = 0u32;

    for child in old_root.children() {
        let len = match child {
            NodeOrToken::Node(node) => u32::from(node.text_len()),
            NodeOrToken::Token(token) => u32::from(token.text_len()),
        };
        let (start, end) = (offset, offset + len);
        offset = end;
        if end <= prefix_end && start < prefix_end {
            children.push(owned(child));
        } else if suffix_start.is_some_and(|s| start >= s) {
            suffix.push(owned(child));
        }
    }

    children.extend(fresh.children().map(owned));
    children.extend(suffix);

    GreenNode::new(SyntaxKind::ScriptFile.into(), children)
}

fn owned(child: NodeOrToken<&GreenNodeData, &GreenTokenData>) -> NodeOrToken<GreenNode, GreenToken> {
    match child {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
    }
}

/// Diagnostics and item metadata of the new tree, assembled from kept, fresh and adopted parts.
pub(crate) fn stitch_items(
    old_items: &[ItemMeta],
    old_diagnostics: &Diagnostics,
    plan: &ReusePlan,
    fresh_items: Vec<ItemMeta>,
    fresh_diagnostics: Diagnostics,
    suffix: Option<(usize, &EditWindow)>,
    lengths: (u32, u32),
) -> (Vec<ItemMeta>, Diagnostics) {
    let old: Vec<&Diagnostic> = old_diagnostics.iter().collect();
    let (old_len, new_len) = lengths;
    let mut items = Vec::with_capacity(old_items.len() + fresh_items.len());
    let mut diagnostics = Diagnostics::new();

    for item in &old_items[..plan.prefix_items] {
        let first = diagnostics.len();
        for diag in &old[item.diagnostics.clone()] {
            diagnostics.push(rebase_suppression(diag, old_len, new_len));
        }
        let mut item = item.clone();
        item.diagnostics = first..diagnostics.len();
        items.push(item);
    }

    let base = diagnostics.len();
    diagnostics.extend(fresh_diagnostics.iter().cloned());
    items.extend(fresh_items.into_iter().map(|mut item| {
        item.diagnostics = item.diagnostics.start + base..item.diagnostics.end + base;
        item
    }));

    if let Some((from, window)) = suffix {
        let delta = window.delta();
        for item in &old_items[from..] {
            let first = diagnostics.len();
            for diag in &old[item.diagnostics.clone()] {
                diagnostics.push(diag.shifted(delta));
            }
            items.push(item.shifted(delta, first..diagnostics.len()));
        }
    }

    (items, diagnostics)
}

/// Suppression ranges of diagnostics inside open delimiters run to the end of the source.
fn rebase_suppression(diag: &Diagnostic, old_len: u32, new_len: u32) -> Diagnostic {
    let mut diag = diag.clone();
    if u32::from(diag.suppression_range.end()) == old_len {
        diag.suppression_range = rowan::TextRange::new(
            diag.suppression_range.start(),
            TextSize::from(new_len),
        );
    }
    diag
}
