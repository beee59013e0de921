//! Operator command parsing.

use dashpanel_core::PanelError;
use dashpanel_layout::SlotId;

/// A parsed `panel` sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render on the next refresh regardless of the other flags.
    Render,
    /// Launch the debugged program with stdout routed through the relay.
    Run(Vec<String>),
    View { pane: String, slot: SlotId },
    Print(String),
    Silent(String),
    Layout(usize),
    Watch(String),
    Unwatch(usize),
    Flush,
}

const USAGE_PANEL: &[&str] = &[
    "panel [SUBCOMMAND]",
    "Without a subcommand, render the dashboard now.\n",
    "Subcommands: run, view, print, silent, layout, watch, unwatch, flush.",
];
const USAGE_RUN: &[&str] = &[
    "panel run [ARGS]",
    "ARGS, str, arguments for the debugged program\n",
    "Run the program with its stdout captured for the Log pane.",
];
const USAGE_VIEW: &[&str] = &[
    "panel view PANE SLOT",
    "PANE, str, name of a pane.",
    "SLOT, int, id of a slot in the current layout\n",
    "Show PANE in SLOT.",
    "If PANE is shown elsewhere, the two slots swap panes.",
    "If PANE is hidden, the pane in SLOT becomes hidden.",
];
const USAGE_PRINT: &[&str] = &[
    "panel print EXPRESSION",
    "EXPRESSION, str\n",
    "Print EXPRESSION with host output shown.",
    "The dashboard is not drawn afterwards so the result stays visible.",
];
const USAGE_SILENT: &[&str] = &[
    "panel silent COMMAND",
    "COMMAND, str\n",
    "Run a host COMMAND with host output shown.",
    "The dashboard is not drawn afterwards so the result stays visible.",
];
const USAGE_LAYOUT: &[&str] = &[
    "panel layout INDEX",
    "INDEX, int, starts from 0, position in alternate_layouts\n",
    "Switch to the selected alternate layout.",
];
const USAGE_WATCH: &[&str] = &[
    "panel watch EXPRESSION",
    "EXPRESSION, str\n",
    "Add EXPRESSION to the Watch pane.",
];
const USAGE_UNWATCH: &[&str] = &[
    "panel unwatch INDEX",
    "INDEX, int, position in the Watch pane\n",
    "Remove a watch expression.",
];

fn usage(lines: &[&str]) -> String {
    lines.join("\n\t")
}

fn syntax(command: &str, lines: &[&str]) -> PanelError {
    PanelError::Syntax {
        command: command.to_owned(),
        usage: usage(lines),
    }
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, PanelError> {
        let argv = split_args(input).ok_or_else(|| syntax(input, USAGE_PANEL))?;
        let Some((name, rest)) = argv.split_first() else {
            return Ok(Self::Render);
        };

        let joined = || (!rest.is_empty()).then(|| rest.join(" "));
        match name.as_str() {
            "run" => Ok(Self::Run(rest.to_vec())),
            "view" => match rest {
                [pane, slot, ..] => {
                    let slot = slot.parse().map_err(|_| syntax(input, USAGE_VIEW))?;
                    Ok(Self::View {
                        pane: pane.clone(),
                        slot,
                    })
                }
                _ => Err(syntax(input, USAGE_VIEW)),
            },
            "print" => joined().map(Self::Print).ok_or_else(|| syntax(input, USAGE_PRINT)),
            "silent" => joined().map(Self::Silent).ok_or_else(|| syntax(input, USAGE_SILENT)),
            "watch" => joined().map(Self::Watch).ok_or_else(|| syntax(input, USAGE_WATCH)),
            "layout" => index(rest)
                .map(Self::Layout)
                .ok_or_else(|| syntax(input, USAGE_LAYOUT)),
            "unwatch" => index(rest)
                .map(Self::Unwatch)
                .ok_or_else(|| syntax(input, USAGE_UNWATCH)),
            "flush" => Ok(Self::Flush),
            _ => Err(syntax(input, USAGE_PANEL)),
        }
    }
}

fn index(rest: &[String]) -> Option<usize> {
    rest.first()?.parse().ok()
}

/// Split like a shell: whitespace separates, quotes group, backslash escapes
/// the next character. `None` on an unterminated quote.
pub fn split_args(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('"') | None, '\\') => {
                in_arg = true;
                current.push(chars.next().unwrap_or('\\'));
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_arg {
        args.push(current);
    }
    Some(args)
}
