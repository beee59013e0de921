#![forbid(unsafe_code)]

//! Styled lines: visible text runs with optional color templates.
//!
//! A [`StyledLine`] is an ordered sequence of runs. Each run stores the
//! cumulative visible width up to and including itself, the raw visible text,
//! and an optional [`Template`] that wraps it on output. Fitting never splits
//! an escape sequence: a truncated run keeps its template around the retained
//! slice only.
//!
//! Only one grammar is decoded: a foreground-set sequence (`ESC[38...m`)
//! followed by text and a foreground reset (`ESC[39...m`). Anything else is
//! literal text.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::trace;

use crate::width::{display_width, truncate_to_width};

static COLOR_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[38[^m]*m(.*?)\x1b\[39[^m]*m").expect("color run regex")
});

/// Prefix and suffix emitted around a run of visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    suffix: String,
}

impl Template {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// 256-color foreground.
    #[must_use]
    pub fn fg(code: u8) -> Self {
        Self::new(format!("\x1b[38;5;{code}m"), "\x1b[39m")
    }

    /// Plain SGR attribute with a full reset (`4` underline, `9` strikethrough).
    #[must_use]
    pub fn sgr(code: u8) -> Self {
        Self::new(format!("\x1b[{code}m"), "\x1b[m")
    }

    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(body);
        out.push_str(&self.suffix);
        out
    }

    fn write_to(&self, out: &mut String, body: &str) {
        out.push_str(&self.prefix);
        out.push_str(body);
        out.push_str(&self.suffix);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
    /// Cumulative visible width through the end of this run.
    end: usize,
    width: usize,
    text: String,
    template: Option<Template>,
}

impl Run {
    fn write_to(&self, out: &mut String) {
        match &self.template {
            Some(template) => template.write_to(out, &self.text),
            None => out.push_str(&self.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    runs: Vec<Run>,
    decoration: Option<Template>,
}

impl StyledLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a string with embedded foreground-color runs.
    ///
    /// Text outside a color run, including any trailing remainder, becomes a
    /// literal run. Decoding is a single left-to-right scan.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let mut line = Self::new();
        let mut prev_end = 0;

        for caps in COLOR_RUN.captures_iter(encoded) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            line.push_plain(&encoded[prev_end..whole.start()]);
            let template = Template::new(
                &encoded[whole.start()..body.start()],
                &encoded[body.end()..whole.end()],
            );
            line.push_styled(body.as_str(), template);
            prev_end = whole.end();
        }
        line.push_plain(&encoded[prev_end..]);

        trace!(runs = line.runs.len(), width = line.width(), "decoded styled line");
        line
    }

    /// Append literal text. Empty text adds nothing.
    pub fn push_plain(&mut self, text: &str) -> &mut Self {
        self.push_run(text, None)
    }

    pub fn push_styled(&mut self, text: &str, template: Template) -> &mut Self {
        self.push_run(text, Some(template))
    }

    /// Append the runs of `other`, keeping their templates. Its staged
    /// decoration is not carried over.
    pub fn append(&mut self, other: &StyledLine) -> &mut Self {
        for run in &other.runs {
            self.push_run(&run.text, run.template.clone());
        }
        self
    }

    fn push_run(&mut self, text: &str, template: Option<Template>) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        let width = display_width(text);
        self.runs.push(Run {
            end: self.width() + width,
            width,
            text: text.to_owned(),
            template,
        });
        self
    }

    /// Visible width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.runs.last().map_or(0, |run| run.end)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Visible text without any escape sequences.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Stage a decoration that wraps the next [`fit`](Self::fit) result once.
    pub fn stage(&mut self, decoration: Template) {
        self.decoration = Some(decoration);
    }

    #[must_use]
    pub fn has_staged(&self) -> bool {
        self.decoration.is_some()
    }

    /// Render to exactly `width` visible cells when `padding` is set, or at
    /// most `width` cells otherwise. Consumes the staged decoration.
    pub fn fit(&mut self, width: usize, padding: bool) -> String {
        let (mut line, visible) = if self.width() > width {
            self.truncated(width)
        } else {
            (self.to_string(), self.width())
        };

        if padding && visible < width {
            line.extend(std::iter::repeat_n(' ', width - visible));
        }

        match self.decoration.take() {
            Some(decoration) => decoration.wrap(&line),
            None => line,
        }
    }

    /// Output truncated to `width` cells along with its visible width.
    ///
    /// Requires `width < self.width()`.
    fn truncated(&self, width: usize) -> (String, usize) {
        let mut out = String::new();
        let Some(idx) = self.runs.iter().position(|run| run.end >= width) else {
            return (self.to_string(), self.width());
        };

        for run in &self.runs[..idx] {
            run.write_to(&mut out);
        }

        let last = &self.runs[idx];
        let start = last.end - last.width;
        let (kept, kept_width) = truncate_to_width(&last.text, width - start);
        if !kept.is_empty() {
            match &last.template {
                Some(template) => template.write_to(&mut out, kept),
                None => out.push_str(kept),
            }
        }
        (out, start + kept_width)
    }
}

impl fmt::Display for StyledLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for run in &self.runs {
            run.write_to(&mut out);
        }
        f.write_str(&out)
    }
}

impl From<&str> for StyledLine {
    fn from(encoded: &str) -> Self {
        Self::decode(encoded)
    }
}
