#![forbid(unsafe_code)]

//! Visible width of terminal text.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width of a single grapheme cluster in cells.
#[inline]
#[must_use]
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_ascii() {
        // Control bytes occupy no cells.
        return grapheme.bytes().filter(|b| (0x20..0x7f).contains(b)).count();
    }
    grapheme.width()
}

/// Calculate the display width of text in cells.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    if text.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        return text.len();
    }
    text.graphemes(true).map(grapheme_width).sum()
}

/// Longest prefix of `text` that fits in `max_width` cells, with its width.
///
/// A wide grapheme that would straddle the limit is dropped whole, so the
/// returned width may fall one cell short.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> (&str, usize) {
    let mut byte_end = 0;
    let mut current_width = 0;

    for (offset, grapheme) in text.grapheme_indices(true) {
        let width = grapheme_width(grapheme);
        if current_width + width > max_width {
            break;
        }
        current_width += width;
        byte_end = offset + grapheme.len();
    }

    (&text[..byte_end], current_width)
}
