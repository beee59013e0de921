use dashpanel_render::{Line, Pane, PaneContext};
use tracing::trace;

use super::{RefreshLatch, shrink_value_string};

/// Watch expressions with their values at the last stop.
#[derive(Debug, Default)]
pub struct WatchPane {
    content: Vec<String>,
    stale: RefreshLatch,
}

impl WatchPane {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pane for WatchPane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        self.stale.raise_if(ctx.session.watch_refresh_requested());
    }

    fn refresh_content(&mut self, height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        if self.stale.take(ctx.session.watch_refresh_requested()) {
            self.content.clear();
            for (idx, expression) in ctx.session.watch_expressions().iter().enumerate() {
                self.content.push(format!("{idx:<3} {expression} :"));
                match ctx.host.evaluate(expression) {
                    Ok(value) => self.content.extend(shrink_value_string(&value)),
                    Err(err) => {
                        trace!(%expression, error = %err, "watch evaluation failed");
                        self.content
                            .push(format!("    No symbol \"{expression}\" in current context."));
                    }
                }
            }
        }
        self.content
            .iter()
            .take(height)
            .map(|line| Line::from(line.as_str()))
            .collect()
    }
}
