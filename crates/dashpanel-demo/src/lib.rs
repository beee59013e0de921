#![forbid(unsafe_code)]

//! Scripted debugger session for trying the dashboard without a debugger.
//!
//! [`ScriptedHost`](host::ScriptedHost) replays `assets/sample.c` from a
//! precomputed trace and implements the dashboard's host interface;
//! [`Driver`](driver::Driver) plays operator commands against both.

pub mod cli;
pub mod driver;
pub mod error;
pub mod highlight;
pub mod host;
pub mod program;

pub use cli::run_from_env;
pub use error::{DemoError, Result};
