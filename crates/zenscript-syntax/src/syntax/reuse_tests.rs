use super::reuse::{ItemMeta, Phase, ReusePlan, SuffixCandidates};
use crate::tree::EditWindow;

fn item(start: u32, end: u32, lookahead_end: u32) -> ItemMeta {
    ItemMeta {
        start,
        end,
        lookahead_end,
        phase_before: Phase::Body,
        phase_after: Phase::Body,
        clean_start: true,
        dedupe_at_start: false,
        last_diagnostic_after: None,
        diagnostics: 0..0,
    }
}

fn window(start: u32, old_end: u32, new_end: u32) -> EditWindow {
    EditWindow {
        start,
        old_end,
        new_end,
    }
}

#[test]
fn plan_keeps_items_whose_lookahead_ends_before_edit() {
    let items = [item(0, 10, 12), item(11, 21, 23), item(22, 32, 33)];

    let plan = ReusePlan::new(&items, &window(23, 24, 25));
    assert_eq!(plan.prefix_items, 2);
    assert_eq!(plan.prefix_end, 21);
    assert_eq!(plan.phase, Phase::Body);

    // lookahead reaching past the edit start forfeits the item
    let plan = ReusePlan::new(&items, &window(22, 22, 23));
    assert_eq!(plan.prefix_items, 1);
    assert_eq!(plan.prefix_end, 10);
}

#[test]
fn plan_from_nothing_starts_in_import_phase() {
    let plan = ReusePlan::new(&[item(0, 10, 12)], &window(0, 1, 1));
    assert_eq!(plan.prefix_items, 0);
    assert_eq!(plan.prefix_end, 0);
    assert_eq!(plan.phase, Phase::Imports);
    assert_eq!(plan.last_diagnostic_pos, None);
}

#[test]
fn suffix_lookup_maps_new_offsets_to_old_items() {
    let suffix = SuffixCandidates {
        items: vec![item(20, 30, 31), item(31, 40, 41)],
        window: window(5, 8, 11),
    };

    // three bytes were inserted, so new 23 is old 20
    assert_eq!(suffix.lookup(23, Phase::Body, false), Some(0));
    assert_eq!(suffix.lookup(34, Phase::Body, false), Some(1));
    assert_eq!(suffix.lookup(24, Phase::Body, false), None);
}

#[test]
fn suffix_lookup_requires_same_state() {
    let mut dirty = item(20, 30, 31);
    dirty.clean_start = false;
    let suffix = SuffixCandidates {
        items: vec![item(10, 19, 20), dirty],
        window: window(0, 2, 2),
    };

    assert_eq!(suffix.lookup(10, Phase::Imports, false), None);
    assert_eq!(suffix.lookup(10, Phase::Body, true), None);
    assert_eq!(suffix.lookup(10, Phase::Body, false), Some(0));
    assert_eq!(suffix.lookup(20, Phase::Body, false), None);
}

#[test]
fn suffix_lookup_ignores_offsets_inside_edit() {
    let suffix = SuffixCandidates {
        items: vec![item(10, 19, 20)],
        window: window(0, 5, 15),
    };
    // new 10 lies inside the inserted text
    assert_eq!(suffix.lookup(10, Phase::Body, false), None);
}
