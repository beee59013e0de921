#![forbid(unsafe_code)]

//! Child-process output relay.
//!
//! [`OutputRelay`] owns a named pipe created once per dashboard session. The
//! host redirects a launched child's stdout into the pipe; while the child
//! runs, a background thread polls the pipe with a bounded timeout and commits
//! complete lines into a shared [`LogRing`]. The thread's only stop signal is
//! the session's child-running flag, and the relay joins the thread before it
//! closes or removes the pipe.
//!
//! Unix only: the channel is a FIFO.

pub mod relay;
pub mod ring;

pub use relay::{OutputRelay, RelayConfig};
pub use ring::{DEFAULT_CAPACITY, LogRing, SharedRing};
