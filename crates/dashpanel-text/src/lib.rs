#![forbid(unsafe_code)]

//! Text primitives for dashpanel.
//!
//! [`StyledLine`] decodes a string carrying foreground-color escapes into runs
//! of visible text, then fits it to an exact cell width without ever cutting
//! an escape sequence in half. The [`width`] helpers measure visible text by
//! grapheme cluster.
//!
//! # Example
//! ```
//! use dashpanel_text::StyledLine;
//!
//! let mut line = StyledLine::decode("  12 \x1b[38;5;214mfoo()\x1b[39m");
//! assert_eq!(line.width(), 10);
//! assert_eq!(line.fit(6, false), "  12 \x1b[38;5;214mf\x1b[39m");
//! ```

pub mod styled;
pub mod width;

pub use styled::{StyledLine, Template};
pub use width::{display_width, truncate_to_width};
