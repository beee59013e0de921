//! A scripted debugger standing in for a real one.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use dashpanel_core::{
    Breakpoint, BreakpointKind, DebugHost, Frame, HostError, Size, SourceLocation, StopReason,
    ThreadInfo, ValueText, Variable,
};
use tracing::{debug, warn};

use crate::program::{Program, Step, function_at};

/// Program and breakpoint events, queued for the dashboard observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Continued,
    Stopped(StopReason),
    Exited(i32),
    BreakpointCreated(Breakpoint),
    BreakpointDeleted(u32),
    BreakpointModified(Breakpoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Step,
    Next,
    Continue,
}

/// Debugger over the replayed sample program.
///
/// Program and breakpoint events are queued; the driver forwards them to the
/// dashboard after each command, since the dashboard holds the host mutably
/// while its own commands run.
pub struct ScriptedHost<W: Write> {
    size: Size,
    program: Program,
    built: SystemTime,
    breakpoints: Vec<Breakpoint>,
    /// Last value seen for each watchpoint, by number.
    watched: Vec<(u32, Option<i64>)>,
    next_number: u32,
    selected_frame: usize,
    history: Vec<ValueText>,
    last_command: Option<String>,
    suppressed: bool,
    child_stdout: Option<File>,
    events: Vec<HostEvent>,
    console: W,
}

impl<W: Write> ScriptedHost<W> {
    pub fn new(program: Program, size: Size, console: W) -> Self {
        Self {
            size,
            program,
            built: SystemTime::now(),
            breakpoints: Vec::new(),
            watched: Vec::new(),
            next_number: 1,
            selected_frame: 0,
            history: Vec::new(),
            last_command: None,
            suppressed: false,
            child_stdout: None,
            events: Vec::new(),
            console,
        }
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut W {
        &mut self.console
    }

    /// Record an operator-typed command for the next refresh.
    pub fn record_command(&mut self, command: &str) {
        self.last_command = Some(command.to_owned());
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_running(&self) -> bool {
        self.program.is_running()
    }

    /// Debugger chatter; hidden while output is suppressed.
    fn say(&mut self, message: &str) {
        if self.suppressed {
            return;
        }
        if let Err(err) = writeln!(self.console, "{message}") {
            warn!(error = %err, "console write failed");
        }
    }

    fn child_print(&mut self, line: &str) {
        let written = match &mut self.child_stdout {
            Some(file) => writeln!(file, "{line}"),
            None => writeln!(self.console, "{line}"),
        };
        if let Err(err) = written {
            // Reader end went away; the child keeps running.
            debug!(error = %err, "child stdout write failed");
            self.child_stdout = None;
        }
    }

    fn current(&self) -> Result<&Step, HostError> {
        self.program
            .current()
            .ok_or_else(|| HostError::new("The program is not being run."))
    }

    fn location_of(&self, line: u32) -> SourceLocation {
        SourceLocation::new(self.program.source(), line).with_function(function_at(line))
    }

    fn breakpoint_mut(&mut self, number: u32) -> Result<&mut Breakpoint, HostError> {
        self.breakpoints
            .iter_mut()
            .find(|bp| bp.number == number)
            .ok_or_else(|| HostError::new(format!("No breakpoint number {number}.")))
    }

    fn add_breakpoint(&mut self, kind: BreakpointKind, condition: Option<String>) -> u32 {
        let number = self.next_number;
        self.next_number += 1;
        let breakpoint = Breakpoint {
            number,
            kind,
            condition,
            enabled: true,
            hit_count: 0,
        };
        self.breakpoints.push(breakpoint.clone());
        self.events.push(HostEvent::BreakpointCreated(breakpoint));
        number
    }

    fn break_at(&mut self, args: &str) -> Result<(), HostError> {
        let (line, condition) = match args.split_once(" if ") {
            Some((line, condition)) => (line.trim(), Some(condition.trim().to_owned())),
            None => (args.trim(), None),
        };
        let line: u32 = line
            .parse()
            .map_err(|_| HostError::new(format!("Function \"{line}\" not defined.")))?;
        let location = self.location_of(line);
        let file = location.file_name().to_owned();
        let number = self.add_breakpoint(BreakpointKind::Location(location), condition);
        self.say(&format!("Breakpoint {number} at {file}:{line}"));
        Ok(())
    }

    fn watch(&mut self, expression: &str) -> Result<(), HostError> {
        if expression.is_empty() {
            return Err(HostError::new("Argument required (expression to compute)."));
        }
        let current = self.value_in(expression, self.main_frame()).ok();
        let number = self.add_breakpoint(
            BreakpointKind::Watch {
                expression: expression.to_owned(),
            },
            None,
        );
        self.watched.push((number, current));
        self.say(&format!("Watchpoint {number}: {expression}"));
        Ok(())
    }

    fn set_enabled(&mut self, args: &str, enabled: bool) -> Result<(), HostError> {
        let breakpoint = self.breakpoint_mut(parse_number(args)?)?;
        breakpoint.enabled = enabled;
        let breakpoint = breakpoint.clone();
        self.events.push(HostEvent::BreakpointModified(breakpoint));
        Ok(())
    }

    fn delete(&mut self, args: &str) -> Result<(), HostError> {
        let number = parse_number(args)?;
        self.breakpoint_mut(number)?;
        self.breakpoints.retain(|bp| bp.number != number);
        self.watched.retain(|(n, _)| *n != number);
        self.events.push(HostEvent::BreakpointDeleted(number));
        Ok(())
    }

    fn run(&mut self, args: &str) -> Result<(), HostError> {
        if self.program.is_running() {
            return Err(HostError::new(
                "The program being debugged has been started already.",
            ));
        }
        if let Some((_, target)) = args.split_once('>') {
            let target = PathBuf::from(target.trim());
            let file = OpenOptions::new()
                .write(true)
                .open(&target)
                .map_err(|err| HostError::new(format!("{}: {err}.", target.display())))?;
            self.child_stdout = Some(file);
        }
        self.program.start();
        self.say(&format!("Starting program: {}", self.program.source().display()));
        self.events.push(HostEvent::Continued);
        if let Some(number) = self.breakpoint_here() {
            return self.hit(number);
        }
        self.resume(Resume::Continue)
    }

    /// Resume a stopped program.
    fn go(&mut self, mode: Resume) -> Result<(), HostError> {
        self.current()?;
        self.events.push(HostEvent::Continued);
        self.resume(mode)
    }

    fn condition_holds(&self, condition: &str) -> bool {
        let Some((lhs, rhs)) = condition.split_once("==") else {
            return true;
        };
        let frame = self.main_frame();
        match (self.value_in(lhs.trim(), frame), self.value_in(rhs.trim(), frame)) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            // An unevaluable condition stops, so the operator can see why.
            _ => true,
        }
    }

    /// Enabled line breakpoint at the current position whose condition holds.
    fn breakpoint_here(&self) -> Option<u32> {
        let line = self.program.current()?.line;
        self.breakpoints
            .iter()
            .filter(|bp| bp.enabled)
            .filter(|bp| bp.location().is_some_and(|loc| loc.line == line))
            .find(|bp| bp.condition.as_deref().is_none_or(|c| self.condition_holds(c)))
            .map(|bp| bp.number)
    }

    /// Watchpoint whose value changed since it was last checked.
    fn changed_watch(&mut self) -> Option<u32> {
        let enabled: Vec<(u32, String)> = self
            .breakpoints
            .iter()
            .filter(|bp| bp.enabled)
            .filter_map(|bp| match &bp.kind {
                BreakpointKind::Watch { expression } => Some((bp.number, expression.clone())),
                BreakpointKind::Location(_) => None,
            })
            .collect();
        let frame = self.main_frame();
        let mut hit = None;
        for (number, expression) in enabled {
            let value = self.value_in(&expression, frame).ok();
            if let Some(entry) = self.watched.iter_mut().find(|(n, _)| *n == number) {
                if entry.1 != value && hit.is_none() {
                    hit = Some(number);
                }
                entry.1 = value;
            }
        }
        hit
    }

    fn resume(&mut self, mode: Resume) -> Result<(), HostError> {
        let start_depth = self.current()?.depth;
        loop {
            let (output, running) = self.program.advance();
            if let Some(line) = output {
                self.child_print(&line);
            }
            if !running {
                return self.exited();
            }
            if let Some(number) = self.changed_watch().or_else(|| self.breakpoint_here()) {
                return self.hit(number);
            }
            let depth = self.current()?.depth;
            let done = match mode {
                Resume::Step => true,
                Resume::Next => depth <= start_depth,
                Resume::Continue => false,
            };
            if done {
                return self.stopped(StopReason::Step);
            }
        }
    }

    fn hit(&mut self, number: u32) -> Result<(), HostError> {
        let breakpoint = self.breakpoint_mut(number)?;
        breakpoint.hit_count += 1;
        let breakpoint = breakpoint.clone();
        let step = self.current()?;
        let message = match &breakpoint.kind {
            BreakpointKind::Watch { expression } => {
                format!("Watchpoint {number}: {expression}, {} () at line {}", step.function(), step.line)
            }
            BreakpointKind::Location(_) => format!(
                "Breakpoint {number}, {} () at {}:{}",
                step.function(),
                self.program.source().display(),
                step.line
            ),
        };
        self.events.push(HostEvent::BreakpointModified(breakpoint));
        self.say(&message);
        self.stopped(StopReason::Breakpoint(number))
    }

    fn stopped(&mut self, reason: StopReason) -> Result<(), HostError> {
        self.selected_frame = 0;
        self.events.push(HostEvent::Stopped(reason));
        Ok(())
    }

    fn exited(&mut self) -> Result<(), HostError> {
        let code = self.program.exit_code();
        self.terminate();
        self.say(&format!("[Inferior 1 (process 4242) exited with code {code:02}]"));
        self.events.push(HostEvent::Exited(code));
        Ok(())
    }

    fn terminate(&mut self) {
        self.program.kill();
        // Closing the writer lets the relay see end of stream.
        self.child_stdout = None;
        self.selected_frame = 0;
    }

    fn print(&mut self, expression: &str) -> Result<(), HostError> {
        let value = self.evaluate(expression)?;
        self.history.push(value.clone());
        self.say(&format!("${} = {}", self.history.len(), value.text));
        Ok(())
    }

    /// Only `fflush` is callable; anything else evaluates like `print`.
    fn call(&mut self, expression: &str) -> Result<(), HostError> {
        self.current()?;
        if !expression.contains("fflush") {
            return self.print(expression);
        }
        if let Some(file) = &mut self.child_stdout {
            file.flush()
                .map_err(|err| HostError::new(format!("fflush failed: {err}")))?;
        }
        self.history.push(ValueText::new("0"));
        self.say(&format!("${} = 0", self.history.len()));
        Ok(())
    }

    fn select_frame(&mut self, args: &str) -> Result<(), HostError> {
        let depth = self.current()?.depth;
        if args.is_empty() {
            return Ok(());
        }
        let level = parse_number(args)? as usize;
        if level > usize::from(depth) {
            return Err(HostError::new(format!("No frame at level {args}.")));
        }
        self.selected_frame = level;
        Ok(())
    }

    fn info(&mut self, topic: &str) -> Result<(), HostError> {
        let lines: Vec<String> = match topic {
            "breakpoints" | "b" => self
                .breakpoints
                .iter()
                .map(|bp| {
                    let what = match &bp.kind {
                        BreakpointKind::Location(loc) => format!("{}:{}", loc.file_name(), loc.line),
                        BreakpointKind::Watch { expression } => expression.clone(),
                    };
                    let enabled = if bp.enabled { 'y' } else { 'n' };
                    format!("{:<7} {enabled} {what}", bp.number)
                })
                .collect(),
            "locals" => self
                .local_variables()
                .into_iter()
                .map(|var| format!("{} = {}", var.name, var.value.text))
                .collect(),
            other => {
                return Err(HostError::new(format!(
                    "Undefined info command: \"{other}\".  Try \"help info\"."
                )));
            }
        };
        if lines.is_empty() {
            self.say("Nothing to show.");
        }
        for line in lines {
            self.say(&line);
        }
        Ok(())
    }

    /// Frame level of `main` in the current stack.
    fn main_frame(&self) -> usize {
        self.program
            .current()
            .map_or(0, |step| usize::from(step.depth))
    }

    /// Variables visible in the frame at `level`.
    fn variables_in(&self, level: usize) -> Vec<(&'static str, i64)> {
        let Some(step) = self.program.current() else {
            return Vec::new();
        };
        if level < usize::from(step.depth) {
            return step.x.map(|x| vec![("x", x)]).unwrap_or_default();
        }
        let mut vars = vec![("total", step.total)];
        vars.extend(step.i.map(|i| ("i", i)));
        vars
    }

    /// Integer expression of one operand or `a OP b` with `+`, `-`, `*`.
    fn value_in(&self, expression: &str, level: usize) -> Result<i64, HostError> {
        let vars = self.variables_in(level);
        let operand = |token: &str| -> Result<i64, HostError> {
            if let Ok(literal) = token.parse() {
                return Ok(literal);
            }
            vars.iter()
                .find(|(name, _)| *name == token)
                .map(|(_, value)| *value)
                .ok_or_else(|| HostError::new(format!("No symbol \"{token}\" in current context.")))
        };
        let tokens: Vec<&str> = expression.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => operand(*single),
            [lhs, "+", rhs] => Ok(operand(*lhs)? + operand(*rhs)?),
            [lhs, "-", rhs] => Ok(operand(*lhs)? - operand(*rhs)?),
            [lhs, "*", rhs] => Ok(operand(*lhs)? * operand(*rhs)?),
            _ => Err(HostError::new(format!(
                "A syntax error in expression, near `{expression}'."
            ))),
        }
    }
}

fn parse_number(args: &str) -> Result<u32, HostError> {
    args.trim()
        .parse()
        .map_err(|_| HostError::new(format!("Invalid number \"{args}\".")))
}

impl<W: Write> DebugHost for ScriptedHost<W> {
    fn terminal_size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn last_command(&mut self) -> Option<String> {
        self.last_command.clone()
    }

    fn history_count(&mut self) -> usize {
        self.history.len()
    }

    fn newest_value(&mut self) -> Option<ValueText> {
        self.history.last().cloned()
    }

    fn selected_location(&mut self) -> Option<SourceLocation> {
        match self.stack_frames().into_iter().nth(self.selected_frame)? {
            Frame::Source { location, .. } => Some(location),
            Frame::DummyCall | Frame::SignalHandler => None,
        }
    }

    fn stack_frames(&mut self) -> Vec<Frame> {
        let Some(step) = self.program.current() else {
            return Vec::new();
        };
        let mut frames = vec![Frame::Source {
            level: 0,
            location: self.location_of(step.line),
        }];
        if step.depth > 0 {
            // `square` is only called from line 10.
            frames.push(Frame::Source {
                level: 1,
                location: self.location_of(10),
            });
        }
        frames
    }

    fn evaluate(&mut self, expression: &str) -> Result<ValueText, HostError> {
        self.current()
            .map_err(|_| HostError::new(format!("No symbol \"{expression}\" in current context.")))?;
        self.value_in(expression, self.selected_frame)
            .map(|value| ValueText::new(value.to_string()))
    }

    fn local_variables(&mut self) -> Vec<Variable> {
        self.variables_in(self.selected_frame)
            .into_iter()
            .map(|(name, value)| Variable {
                name: name.to_owned(),
                value: ValueText::new(value.to_string()),
            })
            .collect()
    }

    fn threads(&mut self) -> Vec<ThreadInfo> {
        let Some(step) = self.program.current() else {
            return Vec::new();
        };
        vec![ThreadInfo {
            id: 1,
            name: Some("sample".into()),
            location: Some(self.location_of(step.line)),
            selected: true,
        }]
    }

    fn execute(&mut self, command: &str) -> Result<(), HostError> {
        let command = command.trim();
        let (verb, args) = command.split_once(' ').unwrap_or((command, ""));
        let args = args.trim();
        debug!(verb, args, "host command");
        match verb {
            "run" | "r" => self.run(args),
            "break" | "b" => self.break_at(args),
            "watch" => self.watch(args),
            "delete" | "d" => self.delete(args),
            "disable" => self.set_enabled(args, false),
            "enable" => self.set_enabled(args, true),
            "next" | "n" => self.go(Resume::Next),
            "step" | "s" => self.go(Resume::Step),
            "continue" | "c" => self.go(Resume::Continue),
            "print" | "p" | "pp" => self.print(args),
            "call" => self.call(args),
            "frame" | "f" => self.select_frame(args),
            "info" => self.info(args),
            "kill" => {
                self.current()?;
                self.terminate();
                self.say("[Inferior 1 (process 4242) killed]");
                self.events.push(HostEvent::Exited(9));
                Ok(())
            }
            other => Err(HostError::new(format!(
                "Undefined command: \"{other}\".  Try \"help\"."
            ))),
        }
    }

    fn set_output_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    fn objfile_build_time(&self) -> Option<SystemTime> {
        Some(self.built)
    }
}
