//! Built-in panes.

mod breakpoints;
mod history;
mod locals;
mod log;
mod source;
mod stack;
mod threads;
mod watch;

use std::path::{Component, Path};

use dashpanel_core::ValueText;

pub use breakpoints::BreakpointsPane;
pub use history::ValueHistoryPane;
pub use locals::LocalsPane;
pub use log::LogPane;
pub use source::SourcePane;
pub use stack::StackPane;
pub use threads::ThreadsPane;
pub use watch::WatchPane;

const VALUE_INDENT: &str = "    ";
/// Body lines kept from a multi-line value.
const VALUE_BODY_LINES: usize = 3;

/// Condense a printed value for a narrow pane.
///
/// Single-line values are indented. Multi-line values keep their header, with
/// `" = {"` replaced by `" :"` (or the element count when known), and at most
/// three body lines; a cut-off trailing comma becomes `" ..."`.
pub fn shrink_value_string(value: &ValueText) -> Vec<String> {
    if !value.text.contains('\n') {
        return vec![format!("{VALUE_INDENT}{}", value.text)];
    }

    let mut lines = value.text.trim().split('\n');
    let header = lines.next().unwrap_or_default();
    let marker = match value.elements {
        Some(n) => format!(" with {n} element{} :", if n > 1 { "s" } else { "" }),
        None => " :".to_owned(),
    };
    let mut out = vec![format!("{VALUE_INDENT}{}", header.replace(" = {", &marker))];
    out.extend(
        lines
            .take(VALUE_BODY_LINES)
            .filter(|line| line.trim() != "}")
            .map(|line| format!("{VALUE_INDENT}{line}")),
    );

    if let Some(last) = out.last_mut() {
        if let Some(stripped) = last.strip_suffix(',') {
            *last = format!("{stripped} ...");
        }
    }
    out
}

/// Last two components of `path`, as shown in location listings.
pub(crate) fn short_path(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    let keep = parts.len().saturating_sub(2);
    parts[keep..].join("/")
}

/// Holds a session flag seen on any cycle until the pane next refreshes.
///
/// The session clears its per-cycle flags whether or not the dashboard drew,
/// so a pane that was skipped or hidden would otherwise miss the change.
#[derive(Debug)]
pub(crate) struct RefreshLatch(bool);

impl Default for RefreshLatch {
    /// Raised: a new pane has nothing cached.
    fn default() -> Self {
        Self(true)
    }
}

impl RefreshLatch {
    pub(crate) fn raise_if(&mut self, flag: bool) {
        self.0 |= flag;
    }

    /// Whether to recompute now, given the current value of the flag.
    pub(crate) fn take(&mut self, flag: bool) -> bool {
        std::mem::take(&mut self.0) | flag
    }
}
