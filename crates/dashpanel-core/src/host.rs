#![forbid(unsafe_code)]

//! The debugger integration boundary.
//!
//! Everything the panes know about the debugged program arrives through
//! [`DebugHost`]. The trait is object safe; panes receive `&mut dyn DebugHost`
//! for the duration of one refresh.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::HostError;
use crate::geometry::Size;

/// A resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
    pub function: Option<String>,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            function: None,
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Final path component, as shown in compact listings.
    pub fn file_name(&self) -> &str {
        self.file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointKind {
    Location(SourceLocation),
    Watch { expression: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub number: u32,
    pub kind: BreakpointKind,
    pub condition: Option<String>,
    pub enabled: bool,
    pub hit_count: u32,
}

impl Breakpoint {
    /// Source location for code breakpoints; `None` for watchpoints.
    pub fn location(&self) -> Option<&SourceLocation> {
        match &self.kind {
            BreakpointKind::Location(location) => Some(location),
            BreakpointKind::Watch { .. } => None,
        }
    }
}

/// One entry of the call stack, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Source { level: u32, location: SourceLocation },
    /// A function call injected by the debugger.
    DummyCall,
    SignalHandler,
}

/// A value as printed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueText {
    pub text: String,
    /// Element count when the value is an array or container.
    pub elements: Option<usize>,
}

impl ValueText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            elements: None,
        }
    }

    #[must_use]
    pub fn with_elements(mut self, elements: usize) -> Self {
        self.elements = Some(elements);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: ValueText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: u32,
    pub name: Option<String>,
    pub location: Option<SourceLocation>,
    pub selected: bool,
}

pub trait DebugHost {
    fn terminal_size(&self) -> io::Result<Size>;

    /// Text of the most recent operator command, without its history number.
    fn last_command(&mut self) -> Option<String>;

    /// Length of the value history.
    fn history_count(&mut self) -> usize;

    /// Most recent value-history entry.
    fn newest_value(&mut self) -> Option<ValueText>;

    /// Location of the selected frame.
    fn selected_location(&mut self) -> Option<SourceLocation>;

    fn stack_frames(&mut self) -> Vec<Frame>;

    fn evaluate(&mut self, expression: &str) -> Result<ValueText, HostError>;

    fn local_variables(&mut self) -> Vec<Variable> {
        Vec::new()
    }

    fn threads(&mut self) -> Vec<ThreadInfo> {
        Vec::new()
    }

    /// Run a host command on the operator's behalf.
    fn execute(&mut self, command: &str) -> Result<(), HostError>;

    /// Toggle discarding of the host's own output.
    fn set_output_suppressed(&mut self, suppressed: bool);

    /// Modification time of the debugged binary.
    fn objfile_build_time(&self) -> Option<SystemTime> {
        None
    }
}
