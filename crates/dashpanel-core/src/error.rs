//! User-visible error kinds.
//!
//! Config, syntax, and runtime errors abort only the current operator
//! command and suppress one render cycle. Host and I/O failures are not
//! specific to the dashboard and are handed back to the host's own handler.

use std::io;

use thiserror::Error;

/// Failure reported by the debugger integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PanelError {
    /// Invalid layout, pane mapping, or configuration file.
    #[error("Invalid {domain} config: {cause}")]
    Config { domain: &'static str, cause: String },
    /// Malformed operator command.
    #[error("Invalid syntax of \"{command}\"\n\n{usage}\n")]
    Syntax { command: String, usage: String },
    /// Well-formed command that cannot be applied (unknown pane, index out of range).
    #[error("{0}")]
    Runtime(String),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PanelError {
    pub fn config(domain: &'static str, cause: impl Into<String>) -> Self {
        Self::Config {
            domain,
            cause: cause.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// True for the kinds recovered at the command boundary.
    #[must_use]
    pub fn is_panel_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Syntax { .. } | Self::Runtime(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
