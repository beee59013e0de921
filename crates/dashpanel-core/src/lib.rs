#![forbid(unsafe_code)]

//! Core: session state, host interface, geometry, and errors.
//!
//! # Role in dashpanel
//! `dashpanel-core` is the boundary layer. It owns the dirty flags that the
//! debugger integration sets and the render pass consumes, the [`DebugHost`]
//! trait through which panes read debugger data, and the user-visible
//! [`PanelError`] kinds.
//!
//! # How it fits in the system
//! The layout engine (`dashpanel-layout`) and text primitive
//! (`dashpanel-text`) are pure and independent of the host. The render crate
//! hands each pane a [`SessionState`] and a `&mut dyn DebugHost` per refresh,
//! so no pane reaches for global state.

pub mod error;
pub mod geometry;
pub mod host;
pub mod session;

pub use error::{HostError, PanelError, Result};
pub use geometry::{Rect, Size};
pub use host::{
    Breakpoint, BreakpointKind, DebugHost, Frame, SourceLocation, ThreadInfo, ValueText, Variable,
};
pub use session::{SessionState, StopReason};
