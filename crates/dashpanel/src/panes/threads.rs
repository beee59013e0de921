use dashpanel_render::{Line, Pane, PaneContext};
use dashpanel_text::StyledLine;

use super::{RefreshLatch, short_path};

/// Threads of the debugged program; the selected one is starred.
#[derive(Debug, Default)]
pub struct ThreadsPane {
    content: Vec<StyledLine>,
    stale: RefreshLatch,
}

impl ThreadsPane {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pane for ThreadsPane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        self.stale.raise_if(ctx.session.location_stale());
    }

    fn refresh_content(&mut self, _height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        if self.stale.take(ctx.session.location_stale()) {
            let style = ctx.style;
            self.content = ctx
                .host
                .threads()
                .into_iter()
                .map(|thread| {
                    let marker = if thread.selected { '*' } else { ' ' };
                    let mut line = StyledLine::new();
                    line.push_plain(&format!("{marker}{:>3} ", thread.id));
                    if let Some(name) = &thread.name {
                        line.push_plain(&format!("{name} "));
                    }
                    if let Some(location) = &thread.location {
                        line.push_plain("at ")
                            .push_styled(&short_path(&location.file), style.filename())
                            .push_plain(&format!(":{}", location.line));
                        if let Some(function) = &location.function {
                            line.push_plain(" in ").push_styled(function, style.function());
                        }
                    }
                    line
                })
                .collect();
        }
        if self.content.is_empty() {
            return vec![Line::from("No threads.")];
        }
        self.content.iter().cloned().map(Line::from).collect()
    }
}
