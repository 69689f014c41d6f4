//! Sink trait and error types
//!
//! A sink is an output destination for produced records. The engine
//! forwards every record to every configured sink; records are opaque JSON
//! values and no schema is imposed here.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while writing or finalizing a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An output destination for produced records
///
/// Sinks are written to only from the fan-out call path, which serializes
/// access; an implementation does not need its own locking.
pub trait Sink: Send {
    /// Short name used in data-loss log entries
    fn name(&self) -> &str;

    /// Persists one record
    fn save(&mut self, record: &Value) -> Result<(), SinkError>;

    /// Finalizes and flushes; called once after the worker pool has
    /// fully drained
    fn close(&mut self) -> Result<(), SinkError>;
}
