use dashpanel_text::{StyledLine, truncate_to_width};

/// One line of pane output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Plain(String),
    Styled(StyledLine),
}

impl Line {
    /// Fit to `width` cells, padding with spaces when `padding` is set.
    ///
    /// Styled lines consume their staged decoration.
    pub fn fit(&mut self, width: usize, padding: bool) -> String {
        match self {
            Self::Plain(text) => {
                let (kept, kept_width) = truncate_to_width(text, width);
                let mut out = kept.to_owned();
                if padding && kept_width < width {
                    out.extend(std::iter::repeat_n(' ', width - kept_width));
                }
                out
            }
            Self::Styled(line) => line.fit(width, padding),
        }
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_owned())
    }
}

impl From<StyledLine> for Line {
    fn from(line: StyledLine) -> Self {
        Self::Styled(line)
    }
}
