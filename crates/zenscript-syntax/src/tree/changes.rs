//! Structural difference between two snapshots of one source.

use super::{NodeData, Range, Tree, flags};

/// Flags that describe structure; `HAS_CHANGES` only records that an edit touched a node.
const STRUCTURAL: u8 = flags::NAMED | flags::EXTRA | flags::ERROR | flags::MISSING;

pub(super) fn changed_ranges(old: &Tree, new: &Tree) -> Vec<Range> {
    if old.same_snapshot(new) {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut pairs = vec![(0u32, 0u32)];
    while let Some((a, b)) = pairs.pop() {
        let (x, y) = (old.node_data(a), new.node_data(b));
        if !same_shape(x, y) {
            ranges.push(x.range().union(y.range()));
            continue;
        }

        let (left, right) = (old.child_ids(a), new.child_ids(b));
        if left.is_empty() && right.is_empty() {
            if x.has(flags::HAS_CHANGES) {
                ranges.push(y.range());
            }
            continue;
        }

        // Pair children from both ends while they keep their shape; whatever is left in the
        // middle changed as a whole.
        let matches = |i: usize, j: usize| {
            same_shape(old.node_data(left[i]), new.node_data(right[j]))
        };
        let mut head = 0;
        while head < left.len() && head < right.len() && matches(head, head) {
            head += 1;
        }
        let mut tail = 0;
        while tail < left.len() - head
            && tail < right.len() - head
            && matches(left.len() - 1 - tail, right.len() - 1 - tail)
        {
            tail += 1;
        }

        for i in 0..head {
            pairs.push((left[i], right[i]));
        }
        for k in 0..tail {
            pairs.push((left[left.len() - 1 - k], right[right.len() - 1 - k]));
        }

        let middle_old = &left[head..left.len() - tail];
        let middle_new = &right[head..right.len() - tail];
        let spans = middle_old
            .iter()
            .map(|&id| old.node_data(id).range())
            .chain(middle_new.iter().map(|&id| new.node_data(id).range()));
        if let Some(span) = spans.reduce(Range::union) {
            ranges.push(span);
        }
    }

    normalize(ranges)
}

fn same_shape(x: &NodeData, y: &NodeData) -> bool {
    x.kind == y.kind
        && x.flags & STRUCTURAL == y.flags & STRUCTURAL
        && x.start_byte == y.start_byte
        && x.end_byte == y.end_byte
}

/// Sorts and merges overlapping or touching ranges.
fn normalize(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_by_key(|r| (r.start_byte, r.end_byte));
    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start_byte <= last.end_byte => *last = last.union(range),
            _ => merged.push(range),
        }
    }
    merged
}
