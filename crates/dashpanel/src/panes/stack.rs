use dashpanel_core::Frame;
use dashpanel_render::{Line, Pane, PaneContext};
use dashpanel_text::StyledLine;

use super::{RefreshLatch, short_path};

/// Call stack of the selected thread, innermost frame first.
#[derive(Debug, Default)]
pub struct StackPane {
    content: Vec<StyledLine>,
    stale: RefreshLatch,
}

impl StackPane {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pane for StackPane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        self.stale.raise_if(ctx.session.location_stale());
    }

    fn refresh_content(&mut self, _height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        if self.stale.take(ctx.session.location_stale()) {
            let style = ctx.style;
            self.content = ctx
                .host
                .stack_frames()
                .into_iter()
                .map(|frame| {
                    let mut line = StyledLine::new();
                    match frame {
                        Frame::Source { level, location } => {
                            line.push_plain(&format!("{level:>2} "))
                                .push_styled(&short_path(&location.file), style.filename())
                                .push_plain(&format!(":{} in ", location.line))
                                .push_styled(
                                    location.function.as_deref().unwrap_or("??"),
                                    style.function(),
                                );
                        }
                        Frame::DummyCall => {
                            line.push_styled("<Gdb Function Call>", style.abnormal_frame());
                        }
                        Frame::SignalHandler => {
                            line.push_styled("<OS Signal Handler>", style.abnormal_frame());
                        }
                    }
                    line
                })
                .collect();
        }
        self.content.iter().cloned().map(Line::from).collect()
    }
}
