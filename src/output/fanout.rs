//! Sink fan-out: deliver every record to every configured sink
//!
//! Under the default best-effort policy a failure in one sink never
//! prevents delivery to the remaining sinks; the failure is logged and
//! counted as data loss. Under fail-fast the first sink error is returned
//! to the caller, which ends the run.

use crate::output::{Sink, SinkError};
use serde::Deserialize;
use serde_json::Value;

/// What to do when a sink write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkFailurePolicy {
    /// Log the failure, keep delivering to the other sinks
    #[default]
    BestEffort,

    /// Surface the first failure and end the run
    FailFast,
}

pub struct SinkSet {
    sinks: Vec<Box<dyn Sink>>,
    policy: SinkFailurePolicy,
    records_lost: u64,
}

impl SinkSet {
    pub fn new(policy: SinkFailurePolicy) -> Self {
        Self {
            sinks: Vec::new(),
            policy,
            records_lost: 0,
        }
    }

    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Forwards one record to every sink per the failure policy
    pub fn save(&mut self, record: &Value) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            match sink.save(record) {
                Ok(()) => {}
                Err(e) => match self.policy {
                    SinkFailurePolicy::BestEffort => {
                        tracing::warn!(sink = sink.name(), error = %e, "record lost");
                        self.records_lost += 1;
                    }
                    SinkFailurePolicy::FailFast => return Err(e),
                },
            }
        }
        Ok(())
    }

    /// Closes every sink, returning the first error after all have been
    /// attempted
    pub fn close_all(&mut self) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                tracing::warn!(sink = sink.name(), error = %e, "close failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Count of record deliveries dropped under best-effort
    pub fn records_lost(&self) -> u64 {
        self.records_lost
    }
}
