#![forbid(unsafe_code)]

//! Pane rendering and slot composition.
//!
//! # Role in dashpanel
//! A [`Pane`] turns session data into lines for a fixed rectangle. The
//! [`compose`] walk visits the layout tree depth first, asks every occupied
//! slot's pane for exactly `height` lines of `width` cells, and stitches the
//! results together with delimiters from a [`BorderStyle`]. The
//! [`Presenter`] writes the finished frame to the terminal.
//!
//! # Widths
//! Composition never measures escape sequences: styled lines are fitted by
//! visible width before they are joined, so a composed line is as wide as the
//! slots and delimiters it spans.

pub mod compose;
pub mod line;
pub mod pane;
pub mod present;
pub mod style;

pub use compose::compose;
pub use line::Line;
pub use pane::{Pane, PaneContext, blank_line};
pub use present::Presenter;
pub use style::{BorderStyle, StyleConfig};
