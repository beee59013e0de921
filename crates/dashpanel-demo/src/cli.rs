use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use dashpanel::{ConfigError, Dashboard, PanelConfig};
use dashpanel_core::Size;
use dashpanel_layout::{LayoutConfig, SlotSpec};
use tracing::info;

use crate::driver::{DEFAULT_SCRIPT, Driver, script_commands};
use crate::error::{DemoError, Result};
use crate::highlight::CKeywords;
use crate::host::ScriptedHost;
use crate::program::Program;

#[derive(Debug, Parser)]
#[command(
    name = "dashpanel-demo",
    about = "Replay a scripted debugger session through the dashpanel dashboard",
    version
)]
pub struct Cli {
    /// Dashboard configuration; `.json` files are read as JSON, anything else as TOML.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debugger commands, one per line. Defaults to a built-in session.
    #[arg(long)]
    pub script: Option<PathBuf>,

    #[arg(long, default_value_t = 120)]
    pub cols: u16,

    #[arg(long, default_value_t = 36)]
    pub rows: u16,

    /// Pause after echoing each command.
    #[arg(long, default_value_t = 800)]
    pub delay_ms: u64,

    /// Disable source coloring.
    #[arg(long)]
    pub plain: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    pub check_config: bool,
}

/// Default config with one alternate layout: source across the top, watch and
/// log side by side below.
pub fn demo_config() -> PanelConfig {
    let wide = LayoutConfig::new([
        Some(SlotSpec::new(0, 10, 6)),
        None,
        Some(SlotSpec::new(1, 5, 4)),
        Some(SlotSpec::new(2, 5, 4)),
        None,
        None,
        None,
    ])
    .with_pane("Source", 0)
    .with_pane("Watch", 1)
    .with_pane("Log", 2);
    PanelConfig {
        alternate_layouts: vec![wide],
        ..PanelConfig::default()
    }
}

pub fn load_config(path: Option<&Path>) -> Result<PanelConfig> {
    let Some(path) = path else {
        return Ok(demo_config());
    };
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        PanelConfig::from_json_str(&content)?
    } else {
        PanelConfig::from_toml_file(path)?
    };
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn load_script(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(script_commands(DEFAULT_SCRIPT));
    };
    let script = std::fs::read_to_string(path).map_err(|source| DemoError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(script_commands(&script))
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    if cli.check_config {
        println!(
            "configuration OK ({} alternate layout(s))",
            config.alternate_layouts.len()
        );
        return Ok(());
    }
    if cli.rows < 4 || cli.cols < 10 {
        return Err(DemoError::exit(
            2,
            format!("terminal {}x{} is too small", cli.cols, cli.rows),
        ));
    }

    let commands = load_script(cli.script.as_deref())?;
    let settle = Duration::from_millis(u64::from(config.relay.poll_timeout_ms) * 2);
    let dashboard = if cli.plain {
        Dashboard::new(config)
    } else {
        Dashboard::new(config).with_highlighter(CKeywords)
    };
    let host = ScriptedHost::new(Program::sample(), Size::new(cli.cols, cli.rows), io::stdout());
    let mut driver = Driver::new(dashboard, host, io::stdout())
        .with_delay(Duration::from_millis(cli.delay_ms))
        .with_settle(settle);
    info!(commands = commands.len(), "replaying session");
    driver.play(&commands)
}
