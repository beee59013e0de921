//! Execution model of the bundled sample program.
//!
//! The demo does not run a real process. `assets/sample.c` is replayed from a
//! precomputed trace of stop positions, one per executed statement.

use std::path::{Path, PathBuf};

pub const SAMPLE_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/sample.c");

const LOOP_COUNT: i64 = 4;

/// One position the program can stop at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: u32,
    /// 0 in `main`, 1 inside `square`.
    pub depth: u8,
    pub i: Option<i64>,
    pub total: i64,
    /// Argument of `square`, set while inside it.
    pub x: Option<i64>,
    /// Text the statement writes to stdout once executed.
    pub output: Option<String>,
}

impl Step {
    fn main(line: u32, i: Option<i64>, total: i64) -> Self {
        Self {
            line,
            depth: 0,
            i,
            total,
            x: None,
            output: None,
        }
    }

    pub fn function(&self) -> &'static str {
        if self.depth > 0 { "square" } else { "main" }
    }
}

/// Name of the function containing `line` in the sample source.
pub fn function_at(line: u32) -> &'static str {
    if (3..=5).contains(&line) { "square" } else { "main" }
}

#[derive(Debug, Clone)]
pub struct Program {
    source: PathBuf,
    trace: Vec<Step>,
    pc: Option<usize>,
    exit_code: i32,
}

impl Program {
    pub fn sample() -> Self {
        Self::with_source(SAMPLE_FILE)
    }

    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        let mut trace = vec![Step::main(8, None, 0)];
        let mut total = 0;
        for i in 0..LOOP_COUNT {
            trace.push(Step::main(9, Some(i), total));
            trace.push(Step::main(10, Some(i), total));
            for line in [4, 5] {
                trace.push(Step {
                    line,
                    depth: 1,
                    i: Some(i),
                    total,
                    x: Some(i),
                    output: None,
                });
            }
            total += i * i;
            let mut print = Step::main(11, Some(i), total);
            print.output = Some(format!("step {i} total {total}"));
            trace.push(print);
        }
        trace.push(Step::main(13, None, total));
        trace.push(Step::main(14, None, total));

        Self {
            source: source.into(),
            trace,
            pc: None,
            exit_code: if total > 10 { 0 } else { 1 },
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_running(&self) -> bool {
        self.pc.is_some()
    }

    pub fn current(&self) -> Option<&Step> {
        self.trace.get(self.pc?)
    }

    pub fn start(&mut self) {
        self.pc = Some(0);
    }

    pub fn kill(&mut self) {
        self.pc = None;
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Execute the current statement. Returns its stdout text and whether the
    /// program is still running afterwards.
    pub fn advance(&mut self) -> (Option<String>, bool) {
        let Some(pc) = self.pc else {
            return (None, false);
        };
        let output = self.trace.get(pc).and_then(|step| step.output.clone());
        let next = pc + 1;
        self.pc = (next < self.trace.len()).then_some(next);
        (output, self.pc.is_some())
    }
}
