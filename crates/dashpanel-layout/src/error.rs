use std::fmt;

use dashpanel_core::PanelError;

use crate::coverage::Axis;
use crate::tree::SlotId;

/// Reasons a layout or pane mapping is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The slot sequence ran out before every branch was resolved.
    MissingElement,
    TrailingElements {
        extra: usize,
    },
    UnitOutOfRange {
        slot: SlotId,
        width: i32,
        height: i32,
    },
    DuplicateSlot {
        slot: SlotId,
    },
    SlotOutsideGrid {
        slot: SlotId,
    },
    CoverageGap {
        axis: Axis,
        start: u8,
        end: u8,
        total: i32,
    },
    UnknownPane {
        pane: String,
    },
    UnknownSlot {
        pane: String,
        slot: SlotId,
    },
    ConflictingAssignment {
        slot: SlotId,
        first: String,
        second: String,
    },
    UnfilledSlot {
        slot: SlotId,
    },
    /// The cell mapping leaves `slot` without room for its delimiters.
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        slot: SlotId,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement => {
                write!(f, "Invalid \"slots\", missing element (probably an empty entry)")
            }
            Self::TrailingElements { extra } => {
                write!(f, "Invalid \"slots\", {extra} element(s) after the last slot")
            }
            Self::UnitOutOfRange {
                slot,
                width,
                height,
            } => write!(
                f,
                "Invalid slot config [{slot}, {width}, {height}], width/height must be in range (0, 10]"
            ),
            Self::DuplicateSlot { slot } => write!(f, "slot index {slot} declared twice"),
            Self::SlotOutsideGrid { slot } => {
                write!(f, "slot {slot} extends beyond the 10x10 grid")
            }
            Self::CoverageGap {
                axis: Axis::Rows,
                start,
                end,
                total,
            } => write!(
                f,
                "height range (starts from terminal top) [{start}, {end}] with width {total}"
            ),
            Self::CoverageGap {
                axis: Axis::Columns,
                start,
                end,
                total,
            } => write!(
                f,
                "width range (starts from terminal left) [{start}, {end}] with height {total}"
            ),
            Self::UnknownPane { pane } => write!(f, "pane {pane} not defined."),
            Self::UnknownSlot { pane, slot } => {
                write!(f, "pane {pane} with invalid slot index {slot}.")
            }
            Self::ConflictingAssignment {
                slot,
                first,
                second,
            } => write!(
                f,
                "pane {second} and {first} with conflict slot index {slot}."
            ),
            Self::UnfilledSlot { slot } => write!(f, "slot {slot} has no pane assigned."),
            Self::TerminalTooSmall { cols, rows, slot } => {
                write!(f, "terminal {cols}x{rows} leaves no room for slot {slot}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<LayoutError> for PanelError {
    fn from(err: LayoutError) -> Self {
        PanelError::config("Layout", err.to_string())
    }
}
