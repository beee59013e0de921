use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use dashpanel_render::{Line, Pane, PaneContext};
use dashpanel_text::StyledLine;
use tracing::{debug, warn};

use super::RefreshLatch;
use crate::highlight::Highlighter;

/// Source text around the current line, numbered and highlighted.
pub struct SourcePane {
    highlighter: Rc<dyn Highlighter>,
    file: Option<PathBuf>,
    /// 1-based line of the selected frame.
    line: u32,
    cache: HashMap<PathBuf, Vec<StyledLine>>,
    warning: Option<String>,
    stale: RefreshLatch,
}

impl SourcePane {
    pub fn new(highlighter: Rc<dyn Highlighter>) -> Self {
        Self {
            highlighter,
            file: None,
            line: 0,
            cache: HashMap::new(),
            warning: None,
            stale: RefreshLatch::default(),
        }
    }

    /// File and 0-based line to center on.
    ///
    /// A just-created breakpoint wins for one refresh without moving the
    /// remembered frame location.
    fn target(&mut self, ctx: &mut PaneContext<'_>) -> Option<(PathBuf, usize)> {
        if let Some(location) = ctx.session.take_breakpoint_created().and_then(|bp| bp.location()) {
            return Some((location.file.clone(), zero_based(location.line)));
        }
        if self.stale.take(ctx.session.location_stale()) {
            match ctx.host.selected_location() {
                Some(location) => {
                    self.file = Some(location.file);
                    self.line = location.line;
                }
                None => self.file = None,
            }
        }
        self.file.clone().map(|file| (file, zero_based(self.line)))
    }

    /// Load, number, and highlight `path`. Returns false when it cannot be read.
    fn cache_file(&mut self, path: &Path, ctx: &PaneContext<'_>) -> bool {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read source file");
                return false;
            }
        };

        let edited = std::fs::metadata(path).and_then(|meta| meta.modified()).ok();
        if let (Some(edited), Some(built)) = (edited, ctx.host.objfile_build_time()) {
            if edited > built {
                self.warning = Some(format!(
                    "Warning: source file {} edited after build.",
                    path.display()
                ));
            }
        }

        let highlighted = self.highlighter.highlight(path, &source);
        let lines: Vec<StyledLine> = highlighted
            .lines()
            .enumerate()
            .map(|(idx, text)| {
                StyledLine::decode(&format!("{:>5} {}", idx + 1, text.replace('\t', "    ")))
            })
            .collect();
        debug!(path = %path.display(), lines = lines.len(), "source file cached");
        self.cache.insert(path.to_path_buf(), lines);
        true
    }
}

fn zero_based(line: u32) -> usize {
    usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX)
}

impl Pane for SourcePane {
    fn observe_cycle(&mut self, ctx: &mut PaneContext<'_>) {
        self.stale.raise_if(ctx.session.location_stale());
    }

    fn refresh_content(&mut self, height: usize, ctx: &mut PaneContext<'_>) -> Vec<Line> {
        let Some((file, center)) = self.target(ctx) else {
            return vec![Line::from("No source file/line found in current frame.")];
        };
        if !self.cache.contains_key(&file) && !self.cache_file(&file, ctx) {
            return vec![Line::from(format!("Cannot open file: {}.", file.display()))];
        }
        let Some(lines) = self.cache.get(&file) else {
            return Vec::new();
        };

        let warning = self.warning.take();
        let rows = height.saturating_sub(usize::from(warning.is_some()));
        let half = rows.saturating_sub(1) / 2;
        let first = center.saturating_sub(half);
        let last = (center + half + 2 - rows % 2).min(lines.len());

        let mut content: Vec<Line> = warning.into_iter().map(Line::from).collect();
        content.extend((first..last).map(|idx| {
            let mut line = lines[idx].clone();
            if idx == center {
                line.stage(ctx.style.current_line());
            }
            Line::from(line)
        }));
        content
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    use dashpanel_core::{Breakpoint, BreakpointKind, SessionState, SourceLocation};
    use dashpanel_render::StyleConfig;

    use super::*;
    use crate::highlight::PlainText;
    use crate::panes::testing::CannedHost;

    fn source_file(lines: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 1..=lines {
            writeln!(file, "line{i}").unwrap();
        }
        file
    }

    fn render(pane: &mut SourcePane, session: &mut SessionState, host: &mut CannedHost, height: usize) -> Vec<String> {
        let style = StyleConfig::default();
        let mut ctx = PaneContext::new(session, host, &style);
        pane.render(20, height, false, &mut ctx)
    }

    #[test]
    fn placeholder_without_location() {
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let out = render(&mut pane, &mut SessionState::new(), &mut CannedHost::default(), 2);
        assert_eq!(out[0], "No source file/line ");
    }

    #[test]
    fn unreadable_file_placeholder() {
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new("/definitely/not/here.c", 1)),
            ..CannedHost::default()
        };
        let style = StyleConfig::default();
        let mut session = SessionState::new();
        let mut ctx = PaneContext::new(&mut session, &mut host, &style);
        let lines = pane.refresh_content(3, &mut ctx);
        assert_eq!(lines, [Line::from("Cannot open file: /definitely/not/here.c.")]);
    }

    #[test]
    fn centers_and_underlines_current_line() {
        let file = source_file(20);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 10)),
            ..CannedHost::default()
        };
        let out = render(&mut pane, &mut SessionState::new(), &mut host, 5);
        assert_eq!(out[0], "    8 line8");
        assert_eq!(out[2], "\x1b[4m   10 line10\x1b[m");
        assert_eq!(out[4], "   12 line12");
    }

    #[test]
    fn even_height_window() {
        let file = source_file(20);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 10)),
            ..CannedHost::default()
        };
        let out = render(&mut pane, &mut SessionState::new(), &mut host, 4);
        assert_eq!(out[0], "    9 line9");
        assert_eq!(out[3], "   12 line12");
    }

    #[test]
    fn window_clamps_at_file_start() {
        let file = source_file(3);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 1)),
            ..CannedHost::default()
        };
        let out = render(&mut pane, &mut SessionState::new(), &mut host, 5);
        assert_eq!(out[0], "\x1b[4m    1 line1\x1b[m");
        assert_eq!(out[2], "    3 line3");
        assert_eq!(out[3], "");
    }

    #[test]
    fn location_is_cached_until_stale() {
        let file = source_file(5);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 2)),
            ..CannedHost::default()
        };
        let mut session = SessionState::new();
        render(&mut pane, &mut session, &mut host, 3);
        session.end_cycle();
        host.location = None;
        let out = render(&mut pane, &mut session, &mut host, 3);
        assert_eq!(host.queries, 1);
        assert_eq!(out[1], "\x1b[4m    2 line2\x1b[m");
    }

    #[test]
    fn created_breakpoint_takes_focus_once() {
        let file = source_file(30);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 2)),
            ..CannedHost::default()
        };
        let mut session = SessionState::new();
        render(&mut pane, &mut session, &mut host, 3);
        session.end_cycle();

        session.breakpoint_created(Breakpoint {
            number: 1,
            kind: BreakpointKind::Location(SourceLocation::new(file.path(), 25)),
            condition: None,
            enabled: true,
            hit_count: 0,
        });
        let out = render(&mut pane, &mut session, &mut host, 3);
        assert_eq!(out[1], "\x1b[4m   25 line25\x1b[m");
        let out = render(&mut pane, &mut session, &mut host, 3);
        assert_eq!(out[1], "\x1b[4m    2 line2\x1b[m");
    }

    #[test]
    fn warns_once_when_source_is_newer_than_binary() {
        let file = source_file(5);
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 3)),
            build_time: Some(SystemTime::now() - Duration::from_secs(3600)),
            ..CannedHost::default()
        };
        let mut session = SessionState::new();
        let style = StyleConfig::default();
        let mut ctx = PaneContext::new(&mut session, &mut host, &style);
        let first = pane.refresh_content(3, &mut ctx);
        assert!(matches!(&first[0], Line::Plain(text) if text.starts_with("Warning: source file")));
        assert_eq!(first.len(), 3);
        let second = pane.refresh_content(3, &mut ctx);
        assert!(matches!(&second[0], Line::Styled(_)));
    }

    #[test]
    fn tabs_expand_in_numbered_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\tx").unwrap();
        let mut pane = SourcePane::new(Rc::new(PlainText));
        let mut host = CannedHost {
            location: Some(SourceLocation::new(file.path(), 1)),
            ..CannedHost::default()
        };
        let out = render(&mut pane, &mut SessionState::new(), &mut host, 1);
        assert_eq!(out[0], "\x1b[4m    1     x\x1b[m");
    }
}
