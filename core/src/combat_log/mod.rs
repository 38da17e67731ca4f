mod combat_event;
mod dedup;
mod error;
mod parser;
mod reader;

pub use combat_event::*;
pub use dedup::DuplicateSuppressor;
pub use error::ReaderError;
pub use parser::LogParser;
pub use reader::{Backoff, TailPoll, Tailer};
