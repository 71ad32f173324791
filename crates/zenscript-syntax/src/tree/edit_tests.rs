use super::EditWindow;
use crate::{InputEdit, Parser, Point};

/// `"val a = 1;\nval b = 2;"` with `a` renamed to `abc`.
fn rename() -> InputEdit {
    InputEdit {
        start_byte: 4,
        old_end_byte: 5,
        new_end_byte: 7,
        start_point: Point::new(0, 4),
        old_end_point: Point::new(0, 5),
        new_end_point: Point::new(0, 7),
    }
}

#[test]
fn map_byte_and_point() {
    let edit = rename();
    assert_eq!(edit.map_byte(2), 2);
    assert_eq!(edit.map_byte(4), 4);
    assert_eq!(edit.map_byte(5), 7);
    assert_eq!(edit.map_byte(11), 13);

    assert_eq!(edit.map_point(Point::new(0, 6)), Point::new(0, 8));
    // later rows keep their columns
    assert_eq!(edit.map_point(Point::new(1, 4)), Point::new(1, 4));
}

#[test]
fn map_inside_deleted_range() {
    let edit = InputEdit {
        start_byte: 2,
        old_end_byte: 10,
        new_end_byte: 3,
        start_point: Point::new(0, 2),
        old_end_point: Point::new(1, 3),
        new_end_point: Point::new(0, 3),
    };
    assert_eq!(edit.map_byte(5), 3);
    assert_eq!(edit.map_byte(12), 5);
    assert_eq!(edit.map_point(Point::new(1, 0)), Point::new(0, 3));
    assert_eq!(edit.map_point(Point::new(1, 5)), Point::new(0, 5));
    assert_eq!(edit.map_point(Point::new(2, 1)), Point::new(1, 1));
}

#[test]
fn edit_shifts_nodes_and_flags_changes() {
    let tree = Parser::new().parse("val a = 1;\nval b = 2;", None).unwrap();
    let edited = tree.edit(&rename());

    let first = edited.root_node().child(0).unwrap();
    let second = edited.root_node().child(1).unwrap();
    assert_eq!(first.byte_range(), 0..12);
    assert_eq!(second.byte_range(), 13..23);
    assert_eq!(second.start_position(), Point::new(1, 0));

    assert!(edited.root_node().has_changes());
    assert!(first.has_changes());
    assert!(first.child(1).unwrap().has_changes());
    assert!(!first.child(0).unwrap().has_changes());
    assert!(!second.has_changes());

    // the original snapshot is untouched
    assert_eq!(tree.root_node().child(1).unwrap().byte_range(), 11..21);
    assert!(!tree.root_node().has_changes());
    assert_eq!(edited.text(), tree.text());
}

#[test]
fn reversed_edit_ends_are_clamped() {
    let tree = Parser::new().parse("val a = 1;", None).unwrap();
    let edited = tree.edit(&InputEdit {
        start_byte: 4,
        old_end_byte: 2,
        new_end_byte: 4,
        start_point: Point::new(0, 4),
        old_end_point: Point::new(0, 2),
        new_end_point: Point::new(0, 4),
    });
    assert_eq!(edited.root_node().byte_range(), 0..10);
}

#[test]
fn windows_merge_in_sequence() {
    // insert 3 bytes at 10, then delete 2 bytes at 4
    let first = EditWindow {
        start: 10,
        old_end: 10,
        new_end: 13,
    };
    let second = EditWindow {
        start: 4,
        old_end: 6,
        new_end: 4,
    };
    let merged = first.merge(second);
    assert_eq!(merged.start, 4);
    assert_eq!(merged.old_end, 10);
    assert_eq!(merged.new_end, 11);
    assert_eq!(merged.delta(), 1);
}

#[test]
fn window_from_edit() {
    let window = EditWindow::from_edit(&rename());
    assert_eq!(window.start, 4);
    assert_eq!(window.old_end, 5);
    assert_eq!(window.new_end, 7);
    assert_eq!(window.delta(), 2);
}
