use crate::{InputEdit, Parser, Point, Range, Tree};

fn reparse(source: &str, edit: InputEdit, text: &str) -> (Tree, Tree) {
    let mut parser = Parser::new();
    let old = parser.parse(source, None).unwrap();
    let edited = old.edit(&edit);
    let new = parser.parse(text, Some(&edited)).unwrap();
    (edited, new)
}

fn bytes(ranges: &[Range]) -> Vec<(u32, u32)> {
    ranges.iter().map(|r| (r.start_byte, r.end_byte)).collect()
}

#[test]
fn same_snapshot_has_no_changes() {
    let tree = Parser::new().parse("val a = 1;", None).unwrap();
    assert!(tree.changed_ranges(&tree.clone()).is_empty());
}

#[test]
fn renamed_leaf() {
    let edit = InputEdit {
        start_byte: 4,
        old_end_byte: 5,
        new_end_byte: 7,
        start_point: Point::new(0, 4),
        old_end_point: Point::new(0, 5),
        new_end_point: Point::new(0, 7),
    };
    let (edited, new) = reparse("val a = 1;\nval b = 2;", edit, "val abc = 1;\nval b = 2;");

    let ranges = edited.changed_ranges(&new);
    assert_eq!(bytes(&ranges), [(4, 7)]);
    assert_eq!(ranges[0].start_point, Point::new(0, 4));
    assert_eq!(ranges[0].end_point, Point::new(0, 7));
}

#[test]
fn new_binary_expression() {
    let edit = InputEdit {
        start_byte: 9,
        old_end_byte: 9,
        new_end_byte: 13,
        start_point: Point::new(0, 9),
        old_end_point: Point::new(0, 9),
        new_end_point: Point::new(0, 13),
    };
    let (edited, new) = reparse("val a = 1;\nval b = 2;", edit, "val a = 1 + 2;\nval b = 2;");

    assert_eq!(bytes(&edited.changed_ranges(&new)), [(8, 14)]);
}

#[test]
fn deleted_value_becomes_missing() {
    let edit = InputEdit {
        start_byte: 8,
        old_end_byte: 9,
        new_end_byte: 8,
        start_point: Point::new(0, 8),
        old_end_point: Point::new(0, 9),
        new_end_point: Point::new(0, 8),
    };
    let (edited, new) = reparse("val a = 1;", edit, "val a = ;");
    assert!(new.root_node().has_error());

    let ranges = edited.changed_ranges(&new);
    assert_eq!(ranges.len(), 1);
    assert!(ranges[0].start_byte <= 7 && ranges[0].end_byte >= 8);
}

#[test]
fn ranges_are_sorted_and_disjoint() {
    let source = "val a = 1;\nval b = 2;\nval c = 3;";
    let mut parser = Parser::new();
    let old = parser.parse(source, None).unwrap();

    // `1` -> `1 + 1`, then `3` -> `3 + 3` in the intermediate text
    let first = InputEdit {
        start_byte: 9,
        old_end_byte: 9,
        new_end_byte: 13,
        start_point: Point::new(0, 9),
        old_end_point: Point::new(0, 9),
        new_end_point: Point::new(0, 13),
    };
    let second = InputEdit {
        start_byte: 35,
        old_end_byte: 35,
        new_end_byte: 39,
        start_point: Point::new(2, 9),
        old_end_point: Point::new(2, 9),
        new_end_point: Point::new(2, 13),
    };
    let edited = old.edit(&first).edit(&second);
    let text = "val a = 1 + 1;\nval b = 2;\nval c = 3 + 3;";
    let new = parser.parse(text, Some(&edited)).unwrap();

    let ranges = bytes(&edited.changed_ranges(&new));
    assert_eq!(ranges, [(8, 14), (34, 40)]);
}
