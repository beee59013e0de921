//! Colors and delimiters.

use dashpanel_text::Template;
use serde::{Deserialize, Serialize};

/// Appearance settings shared by the delimiters and the built-in panes.
///
/// Colors are 256-color palette indices; the `*_sgr` fields are plain SGR
/// attribute codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub delimiter_horizontal: char,
    pub delimiter_vertical: char,
    pub delimiter_color: u8,
    pub breakpoint_color: u8,
    pub filename_color: u8,
    pub function_color: u8,
    /// Debugger-injected calls and signal handler frames.
    pub abnormal_frame_color: u8,
    /// Strikethrough by default.
    pub disabled_breakpoint_sgr: u8,
    /// Underline by default.
    pub current_line_sgr: u8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            delimiter_horizontal: '-',
            delimiter_vertical: '|',
            delimiter_color: 220,
            breakpoint_color: 196,
            filename_color: 35,
            function_color: 214,
            abnormal_frame_color: 20,
            disabled_breakpoint_sgr: 9,
            current_line_sgr: 4,
        }
    }
}

impl StyleConfig {
    pub fn border(&self) -> BorderStyle {
        BorderStyle::new(
            self.delimiter_horizontal,
            self.delimiter_vertical,
            self.delimiter_color,
        )
    }

    pub fn breakpoint(&self) -> Template {
        Template::fg(self.breakpoint_color)
    }

    pub fn filename(&self) -> Template {
        Template::fg(self.filename_color)
    }

    pub fn function(&self) -> Template {
        Template::fg(self.function_color)
    }

    pub fn abnormal_frame(&self) -> Template {
        Template::fg(self.abnormal_frame_color)
    }

    pub fn disabled(&self) -> Template {
        Template::sgr(self.disabled_breakpoint_sgr)
    }

    pub fn current_line(&self) -> Template {
        Template::sgr(self.current_line_sgr)
    }
}

/// Rendered delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderStyle {
    horizontal: char,
    color: Template,
    vertical: String,
}

impl BorderStyle {
    pub fn new(horizontal: char, vertical: char, color: u8) -> Self {
        let color = Template::fg(color);
        // The column after the bar is the right-hand slot's spacer.
        let vertical = format!("{} ", color.wrap(&vertical.to_string()));
        Self {
            horizontal,
            color,
            vertical,
        }
    }

    /// Two-cell column separator.
    pub fn vertical(&self) -> &str {
        &self.vertical
    }

    /// Horizontal rule `width` cells long.
    pub fn horizontal(&self, width: usize) -> String {
        let rule: String = std::iter::repeat_n(self.horizontal, width).collect();
        self.color.wrap(&rule)
    }
}

impl Default for BorderStyle {
    fn default() -> Self {
        StyleConfig::default().border()
    }
}
