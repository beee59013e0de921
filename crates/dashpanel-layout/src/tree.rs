//! Slot arena: decoding, coverage, pixel mapping, and pane assignment.

use std::collections::{BTreeMap, BTreeSet};

use dashpanel_core::{Rect, Size};

use crate::GRID_UNITS;
use crate::config::{LayoutConfig, SlotEntry};
use crate::coverage::{Axis, CoverageAccumulator};
use crate::error::LayoutError;

/// Identifier a layout config gives to a slot.
pub type SlotId = u32;

/// Position of a pane in the dashboard's pane registry.
pub type PaneIndex = usize;

/// Edges of a slot on the unit grid. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRect {
    pub left: u8,
    pub right: u8,
    pub top: u8,
    pub bottom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub units: UnitRect,
    /// Content area in cells, excluding the delimiter column and row.
    pub rect: Rect,
    /// Pad lines to full width. Off for slots touching the right edge.
    pub padding: bool,
    pub pane: Option<PaneIndex>,
    /// Arena index of the right sibling (same top edge).
    pub right: Option<usize>,
    /// Arena index of the below sibling (same left edge).
    pub below: Option<usize>,
}

/// Outcome of moving a pane into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    /// Pane that previously occupied the target slot.
    pub displaced: Option<PaneIndex>,
    /// Slot the pane left, now holding the displaced pane.
    pub vacated: Option<SlotId>,
}

/// Layout tree built from a validated [`LayoutConfig`] for one terminal size.
///
/// The tree owns its slots; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    area: Size,
}

struct Decoder<'a> {
    entries: &'a [SlotEntry],
    cursor: usize,
    slots: Vec<Slot>,
}

impl Decoder<'_> {
    /// Decode the node at the cursor whose top-left corner is `(left, top)`.
    fn node(&mut self, left: u8, top: u8) -> Result<Option<usize>, LayoutError> {
        let entry = self
            .entries
            .get(self.cursor)
            .ok_or(LayoutError::MissingElement)?;
        self.cursor += 1;
        let Some(spec) = entry.0 else {
            return Ok(None);
        };

        let (width, height) = spec.units()?;
        if self.slots.iter().any(|slot| slot.id == spec.id) {
            return Err(LayoutError::DuplicateSlot { slot: spec.id });
        }
        let units = UnitRect {
            left,
            right: left + width,
            top,
            bottom: top + height,
        };
        if units.right > GRID_UNITS || units.bottom > GRID_UNITS {
            return Err(LayoutError::SlotOutsideGrid { slot: spec.id });
        }

        let idx = self.slots.len();
        self.slots.push(Slot {
            id: spec.id,
            units,
            rect: Rect::default(),
            padding: units.right < GRID_UNITS,
            pane: None,
            right: None,
            below: None,
        });
        let right = self.node(units.right, top)?;
        let below = self.node(left, units.bottom)?;
        self.slots[idx].right = right;
        self.slots[idx].below = below;
        Ok(Some(idx))
    }
}

fn check_coverage(slots: &[Slot]) -> Result<(), LayoutError> {
    let mut rows = CoverageAccumulator::new(Axis::Rows);
    let mut columns = CoverageAccumulator::new(Axis::Columns);
    for slot in slots {
        let u = slot.units;
        rows.add(u.top, u.bottom, i32::from(u.right - u.left));
        columns.add(u.left, u.right, i32::from(u.bottom - u.top));
    }
    rows.check()?;
    columns.check()
}

/// Map each unit boundary to a cell offset.
///
/// Offsets accumulate `ceil(delta * cells / 10)` over the sorted boundaries,
/// so a boundary shared by several slots resolves to one offset. The far
/// edge is left to the caller's sentinel.
fn boundary_cells(boundaries: &BTreeSet<u8>, cells: u16) -> BTreeMap<u8, i32> {
    let sorted: Vec<u8> = boundaries.iter().copied().collect();
    let mut offsets = BTreeMap::from([(0, 0)]);
    let mut offset = 0i32;
    for pair in sorted.windows(2).take(sorted.len().saturating_sub(2)) {
        let delta = i32::from(pair[1] - pair[0]) * i32::from(cells);
        offset += (delta + i32::from(GRID_UNITS) - 1) / i32::from(GRID_UNITS);
        offsets.insert(pair[1], offset);
    }
    offsets
}

fn map_pixels(slots: &mut [Slot], area: Size) -> Result<(), LayoutError> {
    let mut xs = BTreeSet::new();
    let mut ys = BTreeSet::new();
    for slot in slots.iter() {
        xs.extend([slot.units.left, slot.units.right]);
        ys.extend([slot.units.top, slot.units.bottom]);
    }

    let mut real_x = boundary_cells(&xs, area.cols);
    let mut real_y = boundary_cells(&ys, area.rows);
    // Left slots have no spacer column; edge slots have no closing delimiter.
    real_x.insert(0, -1);
    real_x.insert(GRID_UNITS, i32::from(area.cols) + 1);
    real_y.insert(GRID_UNITS, i32::from(area.rows) + 1);

    let at = |map: &BTreeMap<u8, i32>, unit: u8| map.get(&unit).copied().unwrap_or_default();

    for slot in slots.iter_mut() {
        let (u, id) = (slot.units, slot.id);
        let too_small = |_| LayoutError::TerminalTooSmall {
            cols: area.cols,
            rows: area.rows,
            slot: id,
        };
        let (left, right) = (at(&real_x, u.left), at(&real_x, u.right));
        let (top, bottom) = (at(&real_y, u.top), at(&real_y, u.bottom));
        // One spacer cell on the left and one delimiter cell on the right.
        let width = u16::try_from(right - left - 2).map_err(too_small)?;
        // One delimiter row below.
        let height = u16::try_from(bottom - top - 1).map_err(too_small)?;
        let x = u16::try_from(left + 1).map_err(too_small)?;
        let y = u16::try_from(top).map_err(too_small)?;
        slot.rect = Rect::new(x, y, width, height);
    }
    Ok(())
}

impl LayoutTree {
    /// Decode, check, and map `config.slots` onto a content area of `area` cells.
    ///
    /// Panes are not bound; see [`bind`](Self::bind).
    pub fn build(config: &LayoutConfig, area: Size) -> Result<Self, LayoutError> {
        let mut decoder = Decoder {
            entries: &config.slots,
            cursor: 0,
            slots: Vec::new(),
        };
        decoder.node(0, 0)?;
        let extra = config.slots.len() - decoder.cursor;
        if extra > 0 {
            return Err(LayoutError::TrailingElements { extra });
        }

        let mut slots = decoder.slots;
        check_coverage(&slots)?;
        map_pixels(&mut slots, area)?;
        Ok(Self { slots, area })
    }

    /// Attach panes per `config.panes`, resolving names against `pane_names`.
    ///
    /// The mapping is validated in full before any slot is touched.
    pub fn bind(&mut self, config: &LayoutConfig, pane_names: &[&str]) -> Result<(), LayoutError> {
        config.validate(pane_names)?;
        for slot in &mut self.slots {
            slot.pane = None;
        }
        for (name, &id) in &config.panes {
            let pane = pane_names.iter().position(|known| *known == name.as_str());
            if let Some(idx) = self.index_of(id) {
                self.slots[idx].pane = pane;
            }
        }
        Ok(())
    }

    /// Move `pane` into slot `id`.
    ///
    /// If the pane was visible elsewhere, the target's occupant takes its old
    /// slot. If the pane was hidden, the occupant becomes hidden. Returns
    /// `None` when no slot has that id.
    pub fn assign(&mut self, pane: PaneIndex, id: SlotId) -> Option<Reassignment> {
        let target = self.index_of(id)?;
        let source = self.slots.iter().position(|slot| slot.pane == Some(pane));
        if source == Some(target) {
            return Some(Reassignment {
                displaced: None,
                vacated: None,
            });
        }

        let displaced = self.slots[target].pane.replace(pane);
        let vacated = source.map(|idx| {
            self.slots[idx].pane = displaced;
            self.slots[idx].id
        });
        Some(Reassignment { displaced, vacated })
    }

    pub fn root(&self) -> Option<&Slot> {
        self.slots.first()
    }

    /// Slot by arena index.
    pub fn get(&self, idx: usize) -> Option<&Slot> {
        self.slots.get(idx)
    }

    /// Slot by config id.
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.index_of(id).map(|idx| &self.slots[idx])
    }

    fn index_of(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    /// Slot currently showing `pane`.
    pub fn slot_of(&self, pane: PaneIndex) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|slot| slot.pane == Some(pane))
            .map(|slot| slot.id)
    }

    /// Cells spanned by the slot at `idx` and its chain of right siblings,
    /// delimiters included.
    pub fn row_width(&self, idx: usize) -> u16 {
        let Some(slot) = self.slots.get(idx) else {
            return 0;
        };
        let rest = slot
            .right
            .map_or(0, |right| self.row_width(right).saturating_add(2));
        slot.rect.width.saturating_add(rest)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Content area the tree was mapped onto.
    pub fn area(&self) -> Size {
        self.area
    }
}
