//! Edit descriptors and how they move positions.

use serde::{Deserialize, Serialize};

use super::{NodeData, Point, flags};

/// One contiguous replacement: bytes `start_byte..old_end_byte` of the old source became
/// `start_byte..new_end_byte` of the new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEdit {
    pub start_byte: u32,
    pub old_end_byte: u32,
    pub new_end_byte: u32,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl InputEdit {
    /// Ends never precede the start.
    pub(crate) fn normalized(&self) -> InputEdit {
        InputEdit {
            old_end_byte: self.old_end_byte.max(self.start_byte),
            new_end_byte: self.new_end_byte.max(self.start_byte),
            old_end_point: self.old_end_point.max(self.start_point),
            new_end_point: self.new_end_point.max(self.start_point),
            ..*self
        }
    }

    /// Where an old byte offset lands in the new source.
    pub fn map_byte(&self, byte: u32) -> u32 {
        if byte >= self.old_end_byte {
            (i64::from(byte) + i64::from(self.new_end_byte) - i64::from(self.old_end_byte)) as u32
        } else if byte > self.start_byte {
            self.new_end_byte
        } else {
            byte
        }
    }

    /// Where an old point lands in the new source.
    pub fn map_point(&self, point: Point) -> Point {
        if point >= self.old_end_point {
            if point.row == self.old_end_point.row {
                Point::new(
                    self.new_end_point.row,
                    self.new_end_point.column + (point.column - self.old_end_point.column),
                )
            } else {
                Point::new(
                    point.row - self.old_end_point.row + self.new_end_point.row,
                    point.column,
                )
            }
        } else if point > self.start_point {
            self.new_end_point
        } else {
            point
        }
    }

    pub(crate) fn apply(&self, node: &NodeData) -> NodeData {
        let mut node = node.clone();
        if node.start_byte <= self.old_end_byte && node.end_byte >= self.start_byte {
            node.flags |= flags::HAS_CHANGES;
        }
        node.start_byte = self.map_byte(node.start_byte);
        node.end_byte = self.map_byte(node.end_byte).max(node.start_byte);
        node.start_point = self.map_point(node.start_point);
        node.end_point = self.map_point(node.end_point).max(node.start_point);
        node
    }
}

/// The byte extent of one or more merged edits, in old and new coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EditWindow {
    pub start: u32,
    pub old_end: u32,
    pub new_end: u32,
}

impl EditWindow {
    pub fn from_edit(edit: &InputEdit) -> Self {
        Self {
            start: edit.start_byte,
            old_end: edit.old_end_byte.max(edit.start_byte),
            new_end: edit.new_end_byte.max(edit.start_byte),
        }
    }

    /// Length change of the source.
    pub fn delta(&self) -> i64 {
        i64::from(self.new_end) - i64::from(self.old_end)
    }

    /// The window covering `self` followed by `next`, which is expressed in the
    /// coordinates `self` produced.
    pub fn merge(self, next: EditWindow) -> EditWindow {
        let start = self.start.min(next.start);
        let covered = i64::from(self.new_end.max(next.old_end));
        EditWindow {
            start,
            old_end: (covered - self.delta()) as u32,
            new_end: (covered + next.delta()) as u32,
        }
    }
}
