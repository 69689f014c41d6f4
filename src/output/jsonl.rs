//! JSON Lines sink: one record per line, streamed to a file

use crate::output::{Sink, SinkError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonlSink {
    writer: BufWriter<File>,
    records_written: u64,
}

impl JsonlSink {
    /// Creates (or truncates) the output file
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl Sink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn save(&mut self, record: &Value) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
