use dashpanel_render::{Line, Pane, PaneContext};

use super::{RefreshLatch, shrink_value_string};

/// Local variables of the selected frame.
#[derive(Debug, Default)]
pub struct LocalsPane {
    content: Vec<String>,
    stale: RefreshLatch,
}

impl LocalsPane {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pane for LocalsPane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        self.stale.raise_if(ctx.session.location_stale());
    }

    fn refresh_content(&mut self, height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        if self.stale.take(ctx.session.location_stale()) {
            self.content.clear();
            for variable in ctx.host.local_variables() {
                self.content.push(format!("{} :", variable.name));
                self.content.extend(shrink_value_string(&variable.value));
            }
        }
        if self.content.is_empty() {
            return vec![Line::from("No locals.")];
        }
        self.content
            .iter()
            .take(height)
            .map(|line| Line::from(line.as_str()))
            .collect()
    }
}
