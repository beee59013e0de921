//! Feeds operator commands to the scripted host and the dashboard, in the
//! order a debugger prompt loop would.

use std::io::Write;
use std::thread;
use std::time::Duration;

use dashpanel::Dashboard;
use dashpanel_core::{DebugHost, PanelError};
use tracing::{debug, info};

use crate::error::Result;
use crate::host::{HostEvent, ScriptedHost};

pub const PROMPT: &str = "(dbg) ";

/// Session played when no script is given.
pub const DEFAULT_SCRIPT: &str = "\
# Stop inside the loop and look around.
break 10
panel watch total
panel watch i * 2
panel run
step
frame 1
p total + i
next
panel view Locals 1
continue
panel print total
panel view Log 3
continue
panel flush
panel layout 0
watch total
continue
delete 1
panel view Nope 0
continue
continue
";

/// Commands in `script`: one per line, blank lines and `#` comments skipped.
pub fn script_commands(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

pub struct Driver<W: Write> {
    dashboard: Dashboard,
    host: ScriptedHost<W>,
    out: W,
    delay: Duration,
    /// Time given to the relay reader after the child runs.
    settle: Duration,
}

impl<W: Write> Driver<W> {
    pub fn new(dashboard: Dashboard, host: ScriptedHost<W>, out: W) -> Self {
        Self {
            dashboard,
            host,
            out,
            delay: Duration::ZERO,
            settle: Duration::from_millis(50),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn host(&self) -> &ScriptedHost<W> {
        &self.host
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    pub fn start(&mut self) -> Result<()> {
        self.dashboard.start(&mut self.host)?;
        Ok(())
    }

    /// One prompt cycle: refresh, echo the prompt, run `command`.
    ///
    /// Command failures are reported on the terminal like a debugger would;
    /// only terminal I/O errors end the session.
    pub fn step(&mut self, command: &str) -> Result<()> {
        self.dashboard.refresh_hook(&mut self.host, &mut self.out)?;
        writeln!(self.out, "{PROMPT}{command}")?;
        self.out.flush()?;
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        self.host.record_command(command);
        let result = match panel_args(command) {
            Some(args) => self.dashboard.execute(args, &mut self.host, &mut self.out),
            None => self.host.execute(command).map_err(PanelError::from),
        };
        if let Err(err) = result {
            debug!(command, error = %err, "command failed");
            let message = if err.is_panel_error() {
                Dashboard::report_error(&err)
            } else {
                err.to_string()
            };
            writeln!(self.out, "{message}")?;
        }
        self.forward_events();
        Ok(())
    }

    fn forward_events(&mut self) {
        for event in self.host.take_events() {
            match event {
                HostEvent::Continued => {
                    self.dashboard.on_continue();
                    if self.dashboard.relay().is_some_and(|relay| relay.is_running()) {
                        thread::sleep(self.settle);
                    }
                }
                HostEvent::Stopped(reason) => self.dashboard.on_stop(reason),
                HostEvent::Exited(code) => {
                    info!(code, "program exited");
                    self.dashboard.on_exit();
                }
                HostEvent::BreakpointCreated(bp) => self.dashboard.breakpoint_created(bp),
                HostEvent::BreakpointDeleted(number) => self.dashboard.breakpoint_deleted(number),
                HostEvent::BreakpointModified(bp) => self.dashboard.breakpoint_modified(bp),
            }
        }
    }

    /// Draw the final state and tear the dashboard down.
    pub fn finish(&mut self) -> Result<()> {
        self.dashboard.refresh_hook(&mut self.host, &mut self.out)?;
        self.dashboard.stop(&mut self.host);
        self.out.flush()?;
        Ok(())
    }

    pub fn play(&mut self, commands: &[String]) -> Result<()> {
        self.start()?;
        for command in commands {
            self.step(command)?;
        }
        self.finish()
    }
}

/// Arguments of a `panel` command, or `None` for host commands.
fn panel_args(command: &str) -> Option<&str> {
    let rest = command.strip_prefix("panel")?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with(' ').then(|| rest.trim())
}
