//! Dashboard configuration and its loaders.

use std::io;
use std::path::Path;

use dashpanel_core::{PanelError, Size};
use dashpanel_layout::{LayoutConfig, LayoutTree, SlotSpec};
use dashpanel_relay::RelayConfig;
use dashpanel_render::StyleConfig;
use dashpanel_text::display_width;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::PANE_NAMES;

/// Area used to check coverage and mapping when a config is loaded.
const VALIDATION_AREA: Size = Size::new(200, 100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Layout applied at start.
    pub layout: LayoutConfig,
    /// Layouts selectable with `layout N`.
    pub alternate_layouts: Vec<LayoutConfig>,
    pub style: StyleConfig,
    /// Render after every host command unless a command says otherwise.
    pub auto_render: bool,
    /// Create an output relay so `run` can capture the child's stdout.
    pub redirect_inferior_logs: bool,
    /// Keep the host's own output off the terminal between renders.
    pub discard_host_output: bool,
    /// Erase the scrollback buffer on every render.
    pub discard_scrollback: bool,
    pub relay: RelayConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            alternate_layouts: Vec::new(),
            style: StyleConfig::default(),
            auto_render: true,
            redirect_inferior_logs: true,
            discard_host_output: true,
            discard_scrollback: false,
            relay: RelayConfig::default(),
        }
    }
}

/// Source on the left, value history and stack stacked on the right,
/// breakpoints under the source.
pub fn default_layout() -> LayoutConfig {
    LayoutConfig::new([
        Some(SlotSpec::new(0, 6, 8)),
        Some(SlotSpec::new(1, 4, 6)),
        None,
        Some(SlotSpec::new(2, 4, 4)),
        None,
        None,
        Some(SlotSpec::new(3, 6, 2)),
        None,
        None,
    ])
    .with_pane("Source", 0)
    .with_pane("ValueHistory", 1)
    .with_pane("Stack", 2)
    .with_pane("Breakpoints", 3)
}

impl PanelConfig {
    /// Parse TOML and validate the result.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse JSON and validate the result.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Every problem found, or an empty list when the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(err) = check_layout(&self.layout) {
            errors.push(format!("layout: {err}"));
        }
        for (idx, layout) in self.alternate_layouts.iter().enumerate() {
            if let Err(err) = check_layout(layout) {
                errors.push(format!("alternate_layouts[{idx}]: {err}"));
            }
        }

        for (field, ch) in [
            ("style.delimiter_horizontal", self.style.delimiter_horizontal),
            ("style.delimiter_vertical", self.style.delimiter_vertical),
        ] {
            let width = display_width(ch.encode_utf8(&mut [0; 4]));
            if width != 1 {
                errors.push(format!("{field} must be one cell wide, got {ch:?}"));
            }
        }

        if self.relay.capacity == 0 {
            errors.push("relay.capacity must be > 0".into());
        }
        if self.relay.poll_timeout_ms == 0 {
            errors.push("relay.poll_timeout_ms must be > 0".into());
        }
        errors
    }
}

fn check_layout(layout: &LayoutConfig) -> Result<(), dashpanel_layout::LayoutError> {
    layout.validate(PANE_NAMES)?;
    LayoutTree::build(layout, VALIDATION_AREA).map(drop)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl From<ConfigError> for PanelError {
    fn from(err: ConfigError) -> Self {
        PanelError::config("Panel", err.to_string())
    }
}
