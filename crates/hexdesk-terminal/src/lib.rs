//! Shell-like terminal for hexdesk.
//!
//! One input line is split into `|`-separated stages, each stage into a
//! command name and arguments. Command names are case-insensitive and map
//! onto the closed [`Builtin`] set. Failures never escape: they are rendered
//! as text lines in the transcript.

pub mod builtin;
pub mod commands;
pub mod history;
pub mod interpreter;

pub use builtin::Builtin;
pub use history::History;
pub use interpreter::{AiTicket, CommandOutput, Environment, NullSink, ProgressSink, Terminal};
