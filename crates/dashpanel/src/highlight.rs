use std::path::Path;

/// Syntax highlighting for the source pane.
///
/// Output must keep the input's line structure and may only color text
/// with `ESC[38;…m … ESC[39m` runs; anything else is shown verbatim.
pub trait Highlighter {
    fn highlight(&self, path: &Path, source: &str) -> String;
}

/// Leaves source text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Highlighter for PlainText {
    fn highlight(&self, _path: &Path, source: &str) -> String {
        source.to_owned()
    }
}
