//! Append-only JSON-lines journal of analysis cycles.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::JournalError;
pub use reader::{read_records, tail_records};
pub use writer::JournalWriter;
