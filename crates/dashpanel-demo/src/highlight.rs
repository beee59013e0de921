//! Keyword coloring for C sources.

use std::path::Path;
use std::sync::LazyLock;

use dashpanel::Highlighter;
use regex_lite::{Captures, Regex};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<comment>//.*$)",
        r#"|(?P<string>"(?:[^"\\]|\\.)*")"#,
        r"|(?P<directive>^\s*#\w+)",
        r"|(?P<keyword>\b(?:int|char|void|static|const|return|for|while|if|else)\b)",
        r"|(?P<number>\b\d+\b)",
    ))
    .expect("token regex")
});

const CLASSES: [(&str, u8); 5] = [
    ("comment", 244),
    ("string", 113),
    ("directive", 176),
    ("keyword", 75),
    ("number", 141),
];

fn color_of(caps: &Captures<'_>) -> Option<u8> {
    CLASSES
        .iter()
        .find(|(name, _)| caps.name(name).is_some())
        .map(|(_, color)| *color)
}

/// Colors keywords, literals, comments, and preprocessor directives in
/// `.c`/`.h` files. Other files pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CKeywords;

impl CKeywords {
    fn line(line: &str) -> String {
        let mut out = String::with_capacity(line.len() * 2);
        let mut last = 0;
        for caps in TOKEN.captures_iter(line) {
            let (Some(whole), Some(color)) = (caps.get(0), color_of(&caps)) else {
                continue;
            };
            out.push_str(&line[last..whole.start()]);
            out.push_str(&format!("\x1b[38;5;{color}m{}\x1b[39m", whole.as_str()));
            last = whole.end();
        }
        out.push_str(&line[last..]);
        out
    }
}

impl Highlighter for CKeywords {
    fn highlight(&self, path: &Path, source: &str) -> String {
        let is_c = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "c" | "h"));
        if !is_c {
            return source.to_owned();
        }
        source.lines().map(Self::line).collect::<Vec<_>>().join("\n")
    }
}
