//! Depth-first slot composition.
//!
//! A slot's own lines come first. Its right subtree is joined line by line
//! behind a vertical delimiter. Its below subtree goes under a horizontal rule
//! as wide as the below subtree's row. When the right column is taller than
//! the slot, the rule and the below lines are spliced in from the bottom
//! beside the right column instead of appended.

use dashpanel_layout::LayoutTree;
use tracing::{debug_span, trace};

use crate::pane::{Pane, PaneContext, blank_line};
use crate::style::BorderStyle;

struct Compositor<'t, 'p, 'c, 'ctx> {
    tree: &'t LayoutTree,
    panes: &'p mut [Box<dyn Pane>],
    ctx: &'c mut PaneContext<'ctx>,
    border: &'t BorderStyle,
}

impl Compositor<'_, '_, '_, '_> {
    fn slot(&mut self, idx: usize) -> Vec<String> {
        let tree = self.tree;
        let Some(slot) = tree.get(idx) else {
            return Vec::new();
        };
        let (right, below) = (slot.right, slot.below);
        let width = usize::from(slot.rect.width);
        let height = usize::from(slot.rect.height);
        let padding = slot.padding;

        let mut content = match slot.pane.and_then(|pane| self.panes.get_mut(pane)) {
            Some(pane) => pane.render(width, height, padding, self.ctx),
            None => vec![blank_line(width, padding); height],
        };

        let mut taller_right = false;
        if let Some(right) = right {
            let mut column = self.slot(right);
            taller_right = column.len() > content.len();
            if column.len() < content.len() {
                let right_width = usize::from(tree.row_width(right));
                let right_padding = tree.get(right).is_some_and(|s| s.padding);
                column.resize_with(content.len(), || blank_line(right_width, right_padding));
            }
            for (line, right_line) in content.iter().zip(column.iter_mut()) {
                *right_line = format!("{line}{}{right_line}", self.border.vertical());
            }
            content = column;
        }

        if let Some(below) = below {
            let below_content = self.slot(below);
            let rule = self.border.horizontal(usize::from(tree.row_width(below)));
            let splice_at = content.len().checked_sub(below_content.len() + 1);
            match splice_at {
                Some(end) if taller_right => {
                    trace!(slot = slot.id, end, "splicing below beside taller right column");
                    let vertical = self.border.vertical();
                    content[end] = format!("{rule}{vertical}{}", content[end]);
                    for (line, target) in below_content.iter().zip(&mut content[end + 1..]) {
                        *target = format!("{line}{vertical}{target}");
                    }
                }
                _ => {
                    content.push(rule);
                    content.extend(below_content);
                }
            }
        }
        content
    }
}

/// Render every slot of `tree` into one frame of lines.
///
/// `panes` is indexed by each slot's pane index. The caller appends the
/// closing border line.
pub fn compose(
    tree: &LayoutTree,
    panes: &mut [Box<dyn Pane>],
    ctx: &mut PaneContext<'_>,
    border: &BorderStyle,
) -> Vec<String> {
    let area = tree.area();
    let _span = debug_span!(
        "compose",
        slots = tree.len(),
        w = area.cols,
        h = area.rows
    )
    .entered();

    if tree.is_empty() {
        return Vec::new();
    }
    let mut compositor = Compositor {
        tree,
        panes,
        ctx,
        border,
    };
    compositor.slot(0)
}
