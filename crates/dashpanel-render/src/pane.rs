use dashpanel_core::{DebugHost, SessionState};

use crate::line::Line;
use crate::style::StyleConfig;

/// What a pane may read and mutate while it refreshes.
pub struct PaneContext<'a> {
    pub session: &'a mut SessionState,
    pub host: &'a mut dyn DebugHost,
    pub style: &'a StyleConfig,
}

impl<'a> PaneContext<'a> {
    pub fn new(
        session: &'a mut SessionState,
        host: &'a mut dyn DebugHost,
        style: &'a StyleConfig,
    ) -> Self {
        Self {
            session,
            host,
            style,
        }
    }
}

/// Blank line for a slot `width` cells wide.
pub fn blank_line(width: usize, padding: bool) -> String {
    if padding {
        " ".repeat(width)
    } else {
        String::new()
    }
}

/// A fixed-shape leaf renderer.
pub trait Pane {
    /// Produce content for a slot `height` lines tall.
    ///
    /// Implementations gate recomputation on session flags and otherwise
    /// return their cached lines. Extra lines are dropped and missing lines
    /// are filled blank by [`render`](Self::render).
    fn refresh_content(&mut self, height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line>;

    /// Exactly `height` lines, each `width` cells, or ragged on the right
    /// when `padding` is off.
    fn render(
        &mut self,
        width: usize,
        height: usize,
        padding: bool,
        ctx: &mut PaneContext<'_>,
    ) -> Vec<String> {
        let mut content: Vec<String> = self
            .refresh_content(height, ctx)
            .into_iter()
            .take(height)
            .map(|mut line| line.fit(width, padding))
            .collect();
        content.resize_with(height, || blank_line(width, padding));
        content
    }

    /// Called once per refresh cycle, whether or not the pane is visible or
    /// the dashboard renders.
    fn observe_cycle(&mut self, _ctx: &mut PaneContext<'_>) {}
}
