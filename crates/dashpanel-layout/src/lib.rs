#![forbid(unsafe_code)]

//! Layout tree for dashpanel.
//!
//! A layout is declared on an abstract 10×10 unit grid as a flattened
//! pre-order binary tree: every node is `[id, width, height]` or empty, and the
//! traversal visits a node, then its whole right subtree, then its whole below
//! subtree. A right child shares its parent's top edge and starts at the
//! parent's right edge; a below child shares the parent's left edge and starts
//! at the parent's bottom edge.
//!
//! [`LayoutTree::build`] decodes the tree into an arena of [`Slot`]s, checks
//! that every cross-section of the grid sums to exactly 10 units, then maps
//! unit boundaries to terminal cells with ceiling arithmetic so that slots
//! sharing a unit boundary share the same cell column or row.
//!
//! # Example
//! ```
//! use dashpanel_core::Size;
//! use dashpanel_layout::{LayoutConfig, LayoutTree, SlotSpec};
//!
//! let config = LayoutConfig::new([
//!     Some(SlotSpec::new(0, 6, 8)),
//!     Some(SlotSpec::new(1, 4, 6)),
//!     None,
//!     Some(SlotSpec::new(2, 4, 4)),
//!     None,
//!     None,
//!     Some(SlotSpec::new(3, 6, 2)),
//!     None,
//!     None,
//! ]);
//! let tree = LayoutTree::build(&config, Size::new(80, 22)).unwrap();
//! assert_eq!(tree.len(), 4);
//! assert_eq!(tree.slot(0).unwrap().rect.width, 47);
//! ```

pub mod config;
pub mod coverage;
pub mod error;
pub mod tree;

pub use config::{LayoutConfig, SlotEntry, SlotSpec};
pub use coverage::{Axis, CoverageAccumulator};
pub use error::LayoutError;
pub use tree::{LayoutTree, PaneIndex, Reassignment, Slot, SlotId, UnitRect};

/// Side of the unit grid.
pub const GRID_UNITS: u8 = 10;
