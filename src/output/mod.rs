//! Output destinations for produced records

mod fanout;
mod jsonl;
mod sqlite;
mod traits;

pub use fanout::{SinkFailurePolicy, SinkSet};
pub use jsonl::JsonlSink;
pub use sqlite::SqliteSink;
pub use traits::{Sink, SinkError};
