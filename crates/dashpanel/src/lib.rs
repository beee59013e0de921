#![forbid(unsafe_code)]

//! Multi-pane status dashboard for an interactive debugger session.
//!
//! A [`Dashboard`] owns the session state, the layout tree, the built-in
//! panes, and an optional output relay. The debugger integration implements
//! [`DebugHost`](dashpanel_core::DebugHost) and drives the dashboard:
//!
//! - [`Dashboard::refresh_hook`] before every prompt decides whether to draw
//!   and redraws the panes whose inputs changed;
//! - [`Dashboard::execute`] runs `panel ...` operator commands;
//! - the observer methods (`on_continue`, `on_stop`, `on_exit`,
//!   `breakpoint_created`, ...) keep the session flags current.
//!
//! # Example
//!
//! ```no_run
//! use dashpanel::{Dashboard, PanelConfig};
//! # fn demo(host: &mut dyn dashpanel_core::DebugHost) -> dashpanel_core::Result<()> {
//! let mut dashboard = Dashboard::new(PanelConfig::default());
//! dashboard.start(host)?;
//! let mut stdout = std::io::stdout();
//! dashboard.execute("watch counter", host, &mut stdout)?;
//! dashboard.refresh_hook(host, &mut stdout)?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod dashboard;
pub mod highlight;
pub mod panes;
pub mod registry;

pub use command::{Command, split_args};
pub use config::{ConfigError, PanelConfig, default_layout};
pub use dashboard::Dashboard;
pub use highlight::{Highlighter, PlainText};
pub use panes::shrink_value_string;
pub use registry::{BUILTIN_PANES, PANE_NAMES, PaneConstructor, PaneRegistry, PaneSeed};
