use dashpanel_render::{Line, Pane, PaneContext};

use super::shrink_value_string;

const PRINT_PREFIXES: [&str; 4] = ["p ", "pp ", "print ", "panel print "];

/// Printed values in command order, newest at the bottom.
///
/// Recording happens every cycle, visible or not.
#[derive(Debug, Default)]
pub struct ValueHistoryPane {
    entries: Vec<String>,
}

impl ValueHistoryPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_print_command(command: &str) -> bool {
        PRINT_PREFIXES.iter().any(|prefix| command.starts_with(prefix))
    }
}

impl Pane for ValueHistoryPane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        if !ctx.session.history_grew() {
            return;
        }
        let Some(command) = ctx.session.last_command().filter(|c| Self::is_print_command(c)) else {
            return;
        };
        let header = format!("{:<3} {command}", ctx.session.history_count());
        let Some(value) = ctx.host.newest_value() else {
            return;
        };
        self.entries.push(header);
        self.entries.extend(shrink_value_string(&value));
    }

    fn refresh_content(&mut self, height: usize, _ctx: &mut PaneContext<'_>) -> Vec<Line> {
        let first = self.entries.len().saturating_sub(height);
        self.entries[first..]
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect()
    }
}
