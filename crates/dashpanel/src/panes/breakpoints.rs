use dashpanel_core::{Breakpoint, BreakpointKind};
use dashpanel_render::{Line, Pane, PaneContext, StyleConfig};
use dashpanel_text::StyledLine;

use super::short_path;

/// Breakpoint and watchpoint listing with live hit counts.
#[derive(Debug, Default)]
pub struct BreakpointsPane {
    /// Text between the number and the hit count, per breakpoint number.
    bodies: Vec<(u32, StyledLine)>,
}

impl BreakpointsPane {
    pub fn new() -> Self {
        Self::default()
    }

    fn body(breakpoint: &Breakpoint, style: &StyleConfig) -> StyledLine {
        let mut line = StyledLine::new();
        match &breakpoint.kind {
            BreakpointKind::Watch { expression } => {
                line.push_plain(&format!(" watch \"{expression}\" "));
            }
            BreakpointKind::Location(location) => {
                line.push_plain(" break ")
                    .push_styled(&short_path(&location.file), style.filename())
                    .push_plain(&format!(":{} in ", location.line))
                    .push_styled(location.function.as_deref().unwrap_or("??"), style.function())
                    .push_plain("() ");
                if let Some(condition) = &breakpoint.condition {
                    line.push_plain(&format!("[if {condition}] "));
                }
            }
        }
        line
    }
}

impl Pane for BreakpointsPane {
    fn refresh_content(&mut self, _height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        if ctx.session.take_breakpoints_changed() {
            self.bodies = ctx
                .session
                .breakpoints()
                .iter()
                .map(|bp| (bp.number, Self::body(bp, ctx.style)))
                .collect();
        }

        let hit = ctx.session.hit_breakpoint();
        let breakpoints = ctx.session.breakpoints();
        self.bodies
            .iter()
            .filter_map(|(number, body)| {
                let bp = breakpoints.iter().find(|bp| bp.number == *number)?;
                let label = format!("{number:>3}");
                let mut line = StyledLine::new();
                if hit == Some(*number) {
                    line.push_styled(&label, ctx.style.breakpoint());
                } else {
                    line.push_plain(&label);
                }
                line.append(body);
                // Hit counts change without a list change, so they are never cached.
                line.push_plain(&match bp.kind {
                    BreakpointKind::Watch { .. } => format!("hit {} times", bp.hit_count),
                    BreakpointKind::Location(_) => format!("hit {:>2} times", bp.hit_count),
                });
                if !bp.enabled {
                    line.stage(ctx.style.disabled());
                }
                Some(Line::from(line))
            })
            .collect()
    }
}
