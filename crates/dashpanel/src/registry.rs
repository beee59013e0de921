//! Ordered table of the built-in panes.

use std::rc::Rc;

use dashpanel_layout::PaneIndex;
use dashpanel_relay::SharedRing;
use dashpanel_render::Pane;

use crate::highlight::Highlighter;
use crate::panes::{
    BreakpointsPane, LocalsPane, LogPane, SourcePane, StackPane, ThreadsPane, ValueHistoryPane,
    WatchPane,
};

/// Shared resources handed to pane constructors.
pub struct PaneSeed {
    pub ring: Option<SharedRing>,
    pub highlighter: Rc<dyn Highlighter>,
}

pub type PaneConstructor = fn(&PaneSeed) -> Box<dyn Pane>;

/// Built-in panes in registry order. A pane's position is its [`PaneIndex`].
pub const BUILTIN_PANES: [(&str, PaneConstructor); 8] = [
    ("Source", source),
    ("Breakpoints", |_| Box::new(BreakpointsPane::new())),
    ("Watch", |_| Box::new(WatchPane::new())),
    ("ValueHistory", |_| Box::new(ValueHistoryPane::new())),
    ("Stack", |_| Box::new(StackPane::new())),
    ("Log", log),
    ("Threads", |_| Box::new(ThreadsPane::new())),
    ("Locals", |_| Box::new(LocalsPane::new())),
];

fn source(seed: &PaneSeed) -> Box<dyn Pane> {
    Box::new(SourcePane::new(Rc::clone(&seed.highlighter)))
}

fn log(seed: &PaneSeed) -> Box<dyn Pane> {
    Box::new(LogPane::new(seed.ring.clone()))
}

/// Names of [`BUILTIN_PANES`], in order.
pub const PANE_NAMES: &[&str] = &[
    "Source",
    "Breakpoints",
    "Watch",
    "ValueHistory",
    "Stack",
    "Log",
    "Threads",
    "Locals",
];

/// Instantiated panes, indexed like [`PANE_NAMES`].
pub struct PaneRegistry {
    panes: Vec<Box<dyn Pane>>,
}

impl PaneRegistry {
    pub fn builtin(seed: &PaneSeed) -> Self {
        Self {
            panes: BUILTIN_PANES
                .iter()
                .map(|(_, construct)| construct(seed))
                .collect(),
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        PANE_NAMES
    }

    pub fn index_of(&self, name: &str) -> Option<PaneIndex> {
        PANE_NAMES.iter().position(|known| *known == name)
    }

    pub fn panes_mut(&mut self) -> &mut [Box<dyn Pane>] {
        &mut self.panes
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }
}
