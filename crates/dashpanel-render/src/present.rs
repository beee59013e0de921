//! Terminal output for one composed frame.

use std::io::{self, Write};

/// Cursor home followed by erase-display.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";
/// Erase the scrollback buffer.
pub const CLEAR_SCROLLBACK: &str = "\x1b[3J";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presenter {
    discard_scrollback: bool,
}

impl Presenter {
    #[must_use]
    pub const fn new(discard_scrollback: bool) -> Self {
        Self { discard_scrollback }
    }

    /// Clear the screen, then write `lines` and the closing `border` line.
    pub fn present<W: Write + ?Sized>(
        &self,
        out: &mut W,
        lines: &[String],
        border: &str,
    ) -> io::Result<()> {
        out.write_all(CLEAR_SCREEN.as_bytes())?;
        if self.discard_scrollback {
            out.write_all(CLEAR_SCROLLBACK.as_bytes())?;
        }
        for line in lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.write_all(border.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
