//! Full-coverage check for the unit grid.
//!
//! Two accumulators run side by side. The row accumulator is keyed by
//! vertical position and sums slot widths; the column accumulator is keyed by
//! horizontal position and sums slot heights. A tiling is complete when every
//! maintained interval totals exactly [`GRID_UNITS`].

use crate::GRID_UNITS;
use crate::error::LayoutError;

/// Which cross-sections an accumulator measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal cross-sections, keyed by unit row.
    Rows,
    /// Vertical cross-sections, keyed by unit column.
    Columns,
}

/// Half-open unit interval with the total accumulated across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u8,
    end: u8,
    total: i32,
}

/// Piecewise-constant sum over `[0, 10)`.
#[derive(Debug, Clone)]
pub struct CoverageAccumulator {
    axis: Axis,
    spans: Vec<Span>,
}

impl CoverageAccumulator {
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            spans: vec![Span {
                start: 0,
                end: GRID_UNITS,
                total: 0,
            }],
        }
    }

    /// Add `value` across `[start, end)`, splitting spans at the new edges.
    pub fn add(&mut self, start: u8, end: u8, value: i32) {
        let mut next = Vec::with_capacity(self.spans.len() + 2);
        for span in &self.spans {
            if span.start >= end || span.end <= start {
                next.push(*span);
                continue;
            }
            if span.start < start {
                next.push(Span {
                    end: start,
                    ..*span
                });
            }
            next.push(Span {
                start: span.start.max(start),
                end: span.end.min(end),
                total: span.total + value,
            });
            if span.end > end {
                next.push(Span {
                    start: end,
                    ..*span
                });
            }
        }
        self.spans = next;
    }

    /// First interval whose total is not exactly the grid size.
    pub fn check(&self) -> Result<(), LayoutError> {
        match self.spans.iter().find(|span| span.total != i32::from(GRID_UNITS)) {
            Some(span) => Err(LayoutError::CoverageGap {
                axis: self.axis,
                start: span.start,
                end: span.end,
                total: span.total,
            }),
            None => Ok(()),
        }
    }

    /// Current intervals as `(start, end, total)`.
    pub fn spans(&self) -> impl Iterator<Item = (u8, u8, i32)> + '_ {
        self.spans.iter().map(|s| (s.start, s.end, s.total))
    }
}
