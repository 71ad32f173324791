//! Backtracking matcher for compiled patterns.
//!
//! Child items match an ordered, not necessarily contiguous, run of siblings. A plain item
//! yields every way it can match; a quantified item is greedy and keeps only the longest
//! run for which the rest of the sequence still matches.

use super::compile::{NodeTest, Sequence, Step, StepKind};
use super::quantifier::Repeat;
use crate::tree::{NO_PARENT, Tree, flags};

/// `(capture id, node id)` pairs of one solution.
pub(crate) type Captures = Vec<(u32, u32)>;

#[derive(Debug, Clone, Default)]
struct Partial {
    captures: Captures,
    /// Sibling index after the last consumed node.
    end: usize,
}

impl Partial {
    fn empty(end: usize) -> Self {
        Self {
            captures: Vec::new(),
            end,
        }
    }

    fn then(&self, rest: Partial) -> Partial {
        let mut captures = self.captures.clone();
        captures.extend(rest.captures);
        Partial {
            captures,
            end: rest.end,
        }
    }
}

pub(crate) struct Matcher<'t> {
    tree: &'t Tree,
    limit: usize,
    exceeded: bool,
}

impl<'t> Matcher<'t> {
    pub fn new(tree: &'t Tree, limit: usize) -> Self {
        Self {
            tree,
            limit: limit.max(1),
            exceeded: false,
        }
    }

    /// Whether some attempt was cut short by the solution limit.
    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    /// All solutions of `root` whose first matched node is `node`.
    pub fn match_at(&mut self, root: &Step, node: u32) -> Vec<Captures> {
        let tree = self.tree;
        let data = tree.node_data(node);
        let single = [node];
        let (siblings, pos): (&[u32], usize) = if data.parent == NO_PARENT {
            (&single, 0)
        } else {
            (tree.child_ids(data.parent), data.index_in_parent as usize)
        };

        self.ways(root, siblings, pos, true)
            .into_iter()
            .filter(|partial| partial.end > pos)
            .take(self.limit)
            .map(|mut partial| {
                partial.captures.sort_by_key(|&(_, node)| node);
                partial.captures
            })
            .collect()
    }

    fn over_limit(&mut self, found: usize) -> bool {
        if found > self.limit {
            self.exceeded = true;
            return true;
        }
        false
    }

    /// Every way `items` can match, searching from `siblings[pos]` on.
    fn seq(&mut self, items: &[Step], siblings: &[u32], pos: usize, pinned: bool) -> Vec<Partial> {
        let Some((first, rest)) = items.split_first() else {
            return vec![Partial::empty(pos)];
        };

        let mut out = Vec::new();
        for way in self.ways(first, siblings, pos, pinned) {
            for tail in self.seq(rest, siblings, way.end, false) {
                out.push(way.then(tail));
                if self.over_limit(out.len()) {
                    return out;
                }
            }
            if first.repeat != Repeat::One && !out.is_empty() {
                break;
            }
        }
        out
    }

    /// Ways to match `step` with its quantifier, most preferred first.
    fn ways(&mut self, step: &Step, siblings: &[u32], pos: usize, pinned: bool) -> Vec<Partial> {
        if step.repeat == Repeat::One {
            return self.once(step, siblings, pos, pinned);
        }
        let (min, max) = (step.repeat.min(), step.repeat.max());

        let mut chain: Vec<Partial> = Vec::new();
        let mut at = pos;
        while max.is_none_or(|max| chain.len() < max) {
            let next = self
                .once(step, siblings, at, pinned && chain.is_empty())
                .into_iter()
                .next();
            match next {
                Some(partial) if partial.end > at => {
                    at = partial.end;
                    chain.push(partial);
                }
                _ => break,
            }
        }

        let mut out = Vec::new();
        for taken in (min..=chain.len()).rev() {
            let mut acc = Partial::empty(pos);
            for partial in &chain[..taken] {
                acc = acc.then(partial.clone());
            }
            out.push(acc);
        }
        out
    }

    /// Ways to match one occurrence of `step`.
    fn once(&mut self, step: &Step, siblings: &[u32], pos: usize, pinned: bool) -> Vec<Partial> {
        if let StepKind::Group(sequence) = &step.kind {
            return self.seq(&sequence.items, siblings, pos, pinned);
        }

        let candidates = if pinned {
            pos..(pos + 1).min(siblings.len())
        } else if step.immediate {
            pos..(self.immediate_limit(siblings, pos) + 1).min(siblings.len())
        } else {
            pos..siblings.len()
        };

        let mut out = Vec::new();
        for index in candidates {
            for partial in self.starting_at(step, siblings, index) {
                out.push(partial);
                if self.over_limit(out.len()) {
                    return out;
                }
            }
        }
        out
    }

    /// Ways to match `step` with its first node at `siblings[index]`.
    fn starting_at(&mut self, step: &Step, siblings: &[u32], index: usize) -> Vec<Partial> {
        let node = siblings[index];
        let StepKind::Alternation(branches) = &step.kind else {
            return self.single(step, node, index);
        };
        if !branches.iter().any(spans_siblings) {
            return self.single(step, node, index);
        }
        if step.field.is_some() && self.tree.node_data(node).field != step.field {
            return Vec::new();
        }

        let mut out = Vec::new();
        for branch in branches {
            let found = if spans_siblings(branch) {
                self.ways(branch, siblings, index, true)
            } else {
                self.single(branch, node, index)
            };
            out.extend(found.into_iter().filter(|p| p.end > index));
        }
        for partial in &mut out {
            partial.captures.extend(step.captures.iter().map(|&id| (id, node)));
        }
        out
    }

    fn single(&mut self, step: &Step, node: u32, index: usize) -> Vec<Partial> {
        self.match_node(step, node)
            .into_iter()
            .map(|captures| Partial {
                captures,
                end: index + 1,
            })
            .collect()
    }

    /// Index of the first named, non-extra sibling at or after `pos`, or the last index.
    fn immediate_limit(&self, siblings: &[u32], pos: usize) -> usize {
        (pos..siblings.len())
            .find(|&i| self.is_significant(siblings[i]))
            .unwrap_or(siblings.len().saturating_sub(1))
    }

    fn is_significant(&self, node: u32) -> bool {
        let data = self.tree.node_data(node);
        data.has(flags::NAMED) && !data.has(flags::EXTRA)
    }

    fn match_node(&mut self, step: &Step, node: u32) -> Vec<Captures> {
        let tree = self.tree;
        let data = tree.node_data(node);
        if step.field.is_some() && data.field != step.field {
            return Vec::new();
        }

        let mut out: Vec<Captures> = match &step.kind {
            StepKind::Node {
                test,
                children,
                negated,
            } => {
                if !self.test(*test, node) {
                    return Vec::new();
                }
                let kids = tree.child_ids(node);
                if negated
                    .iter()
                    .any(|f| kids.iter().any(|&k| tree.node_data(k).field == Some(*f)))
                {
                    return Vec::new();
                }
                self.match_children(children, kids)
            }
            StepKind::Alternation(branches) => {
                let mut out = Vec::new();
                for branch in branches {
                    out.extend(self.match_node(branch, node));
                    if self.over_limit(out.len()) {
                        break;
                    }
                }
                out
            }
            StepKind::Group(_) => Vec::new(),
        };

        if !step.captures.is_empty() {
            for captures in &mut out {
                captures.extend(step.captures.iter().map(|&id| (id, node)));
            }
        }
        out
    }

    fn match_children(&mut self, children: &Sequence, kids: &[u32]) -> Vec<Captures> {
        if children.items.is_empty() {
            return vec![Vec::new()];
        }
        self.seq(&children.items, kids, 0, false)
            .into_iter()
            .filter(|p| !children.anchored_end || !kids[p.end..].iter().any(|&k| self.is_significant(k)))
            .map(|p| p.captures)
            .collect()
    }

    fn test(&self, test: NodeTest, node: u32) -> bool {
        let data = self.tree.node_data(node);
        match test {
            NodeTest::Kind(kind) => data.kind == kind,
            NodeTest::AnyNamed => data.has(flags::NAMED),
            NodeTest::Any => true,
            NodeTest::Error => data.has(flags::ERROR),
            NodeTest::Missing(kind) => {
                data.has(flags::MISSING) && kind.is_none_or(|kind| data.kind == kind)
            }
        }
    }
}

/// Groups and quantified items can consume more than one sibling.
fn spans_siblings(step: &Step) -> bool {
    match &step.kind {
        StepKind::Group(_) => true,
        StepKind::Alternation(branches) => step.repeat != Repeat::One || branches.iter().any(spans_siblings),
        StepKind::Node { .. } => step.repeat != Repeat::One,
    }
}
