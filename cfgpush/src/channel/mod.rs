//! Channel layer: prompt detection over the interactive PTY shell.

mod buffer;
mod patterns;
mod pty;

pub use buffer::{DEFAULT_SEARCH_DEPTH, PatternBuffer};
pub use patterns::{any_of, last_line};
pub use pty::PtyChannel;
