use dashpanel_relay::{LogRing, SharedRing};
use dashpanel_render::{Line, Pane, PaneContext};

/// Most recent lines relayed from the child's stdout.
#[derive(Debug, Default)]
pub struct LogPane {
    ring: Option<SharedRing>,
}

impl LogPane {
    pub fn new(ring: Option<SharedRing>) -> Self {
        Self { ring }
    }
}

impl Pane for LogPane {
    fn refresh_content(&mut self, height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        match &self.ring {
            Some(ring) if ctx.session.relay_active() => {
                LogRing::lock(ring).tail(height).into_iter().map(Line::from).collect()
            }
            _ => vec![Line::from("Panel logger is not enabled.")],
        }
    }
}
