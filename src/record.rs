//! Typed records decoded from reply frames.
//!
//! Every reply record carries five 16-bit fields. The summary record opens a
//! request cycle; each following record is either a box or an arrow.

use serde::{Deserialize, Serialize};

use crate::protocol::Command;

/// Summary opening every request cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Number of box/arrow records that follow.
    pub count: u16,
    /// Number of ids the current algorithm has learned.
    pub learned_ids: u16,
    /// Third field; device frame counter on current firmware.
    pub frame_number: u16,
    /// Fields with no defined meaning.
    pub reserved: [u16; 2],
}

impl SummaryRecord {
    /// Build from the five wire fields in order.
    #[must_use]
    pub const fn from_fields(fields: [u16; 5]) -> Self {
        Self {
            count: fields[0],
            learned_ids: fields[1],
            frame_number: fields[2],
            reserved: [fields[3], fields[4]],
        }
    }

    /// The five wire fields in order.
    #[must_use]
    pub const fn fields(&self) -> [u16; 5] {
        [
            self.count,
            self.learned_ids,
            self.frame_number,
            self.reserved[0],
            self.reserved[1],
        ]
    }
}

/// Kind of detection record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Rectangular detection (`RETURN_BLOCK`).
    Box,
    /// Directional detection (`RETURN_ARROW`).
    Arrow,
}

impl RecordKind {
    /// Reply command carrying records of this kind.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::Box => Command::RETURN_BLOCK,
            Self::Arrow => Command::RETURN_ARROW,
        }
    }
}

/// Rectangular detection result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRecord {
    /// Centre x coordinate.
    pub x_center: u16,
    /// Centre y coordinate.
    pub y_center: u16,
    /// Box width.
    pub width: u16,
    /// Box height.
    pub height: u16,
    /// Learned id, or 0 for unlearned objects.
    pub id: u16,
}

impl BoxRecord {
    /// Build from the five wire fields in order.
    #[must_use]
    pub const fn from_fields(fields: [u16; 5]) -> Self {
        Self {
            x_center: fields[0],
            y_center: fields[1],
            width: fields[2],
            height: fields[3],
            id: fields[4],
        }
    }

    /// The five wire fields in order.
    #[must_use]
    pub const fn fields(&self) -> [u16; 5] {
        [self.x_center, self.y_center, self.width, self.height, self.id]
    }

    /// Read one field.
    #[must_use]
    pub const fn get(&self, field: BoxField) -> u16 {
        match field {
            BoxField::XCenter => self.x_center,
            BoxField::YCenter => self.y_center,
            BoxField::Width => self.width,
            BoxField::Height => self.height,
            BoxField::Id => self.id,
        }
    }
}

/// Directional detection result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowRecord {
    /// Tail x coordinate.
    pub x_origin: u16,
    /// Tail y coordinate.
    pub y_origin: u16,
    /// Head x coordinate.
    pub x_target: u16,
    /// Head y coordinate.
    pub y_target: u16,
    /// Learned id, or 0 for unlearned objects.
    pub id: u16,
}

impl ArrowRecord {
    /// Build from the five wire fields in order.
    #[must_use]
    pub const fn from_fields(fields: [u16; 5]) -> Self {
        Self {
            x_origin: fields[0],
            y_origin: fields[1],
            x_target: fields[2],
            y_target: fields[3],
            id: fields[4],
        }
    }

    /// The five wire fields in order.
    #[must_use]
    pub const fn fields(&self) -> [u16; 5] {
        [self.x_origin, self.y_origin, self.x_target, self.y_target, self.id]
    }

    /// Read one field.
    #[must_use]
    pub const fn get(&self, field: ArrowField) -> u16 {
        match field {
            ArrowField::XOrigin => self.x_origin,
            ArrowField::YOrigin => self.y_origin,
            ArrowField::XTarget => self.x_target,
            ArrowField::YTarget => self.y_target,
            ArrowField::Id => self.id,
        }
    }
}

/// A box or arrow from the current batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailRecord {
    /// Rectangular detection.
    Box(BoxRecord),
    /// Directional detection.
    Arrow(ArrowRecord),
}

impl DetailRecord {
    /// Kind tag of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Box(_) => RecordKind::Box,
            Self::Arrow(_) => RecordKind::Arrow,
        }
    }

    /// Learned id carried in the fifth field.
    #[must_use]
    pub const fn id(&self) -> u16 {
        match self {
            Self::Box(record) => record.id,
            Self::Arrow(record) => record.id,
        }
    }

    /// First two fields: the box centre or the arrow origin.
    #[must_use]
    pub const fn anchor(&self) -> (u16, u16) {
        match self {
            Self::Box(record) => (record.x_center, record.y_center),
            Self::Arrow(record) => (record.x_origin, record.y_origin),
        }
    }

    /// Box payload, if this is a box.
    #[must_use]
    pub const fn as_box(&self) -> Option<&BoxRecord> {
        match self {
            Self::Box(record) => Some(record),
            Self::Arrow(_) => None,
        }
    }

    /// Arrow payload, if this is an arrow.
    #[must_use]
    pub const fn as_arrow(&self) -> Option<&ArrowRecord> {
        match self {
            Self::Arrow(record) => Some(record),
            Self::Box(_) => None,
        }
    }

    /// Read a field through a kind-specific selector.
    ///
    /// Returns `None` if the selector belongs to the other kind.
    #[must_use]
    pub fn get<F: RecordField>(&self, field: F) -> Option<u16> { field.read(self) }
}

/// Field of a [`BoxRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxField {
    /// Centre x coordinate.
    XCenter,
    /// Centre y coordinate.
    YCenter,
    /// Width.
    Width,
    /// Height.
    Height,
    /// Learned id.
    Id,
}

/// Field of an [`ArrowRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowField {
    /// Tail x coordinate.
    XOrigin,
    /// Tail y coordinate.
    YOrigin,
    /// Head x coordinate.
    XTarget,
    /// Head y coordinate.
    YTarget,
    /// Learned id.
    Id,
}

/// Selector for one field of one record kind.
///
/// Lets queries be written once for both kinds: the selector type fixes the
/// kind being queried.
pub trait RecordField: Copy {
    /// Kind of record this selector reads.
    const KIND: RecordKind;

    /// Read the field, or `None` for a record of the other kind.
    fn read(self, record: &DetailRecord) -> Option<u16>;
}

impl RecordField for BoxField {
    const KIND: RecordKind = RecordKind::Box;

    fn read(self, record: &DetailRecord) -> Option<u16> { record.as_box().map(|b| b.get(self)) }
}

impl RecordField for ArrowField {
    const KIND: RecordKind = RecordKind::Arrow;

    fn read(self, record: &DetailRecord) -> Option<u16> {
        record.as_arrow().map(|a| a.get(self))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn box_fields_keep_wire_order() {
        let record = BoxRecord::from_fields([100, 50, 20, 30, 3]);
        assert_eq!(record.x_center, 100);
        assert_eq!(record.y_center, 50);
        assert_eq!(record.width, 20);
        assert_eq!(record.height, 30);
        assert_eq!(record.id, 3);
        assert_eq!(record.fields(), [100, 50, 20, 30, 3]);
    }

    #[test]
    fn summary_fields_keep_wire_order() {
        let summary = SummaryRecord::from_fields([2, 4, 900, 0, 0]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.learned_ids, 4);
        assert_eq!(summary.fields(), [2, 4, 900, 0, 0]);
    }

    #[rstest]
    #[case(BoxField::XCenter, 1)]
    #[case(BoxField::YCenter, 2)]
    #[case(BoxField::Width, 3)]
    #[case(BoxField::Height, 4)]
    #[case(BoxField::Id, 5)]
    fn box_selector_reads_field(#[case] field: BoxField, #[case] expected: u16) {
        let record = DetailRecord::Box(BoxRecord::from_fields([1, 2, 3, 4, 5]));
        assert_eq!(record.get(field), Some(expected));
    }

    #[test]
    fn selector_of_other_kind_reads_nothing() {
        let arrow = DetailRecord::Arrow(ArrowRecord::from_fields([1, 2, 3, 4, 5]));
        assert_eq!(arrow.get(BoxField::Width), None);
        assert_eq!(arrow.get(ArrowField::XTarget), Some(3));
        assert_eq!(arrow.anchor(), (1, 2));
        assert_eq!(arrow.kind(), RecordKind::Arrow);
    }
}
