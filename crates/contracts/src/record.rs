//! Record and Batch - the units of dispatch
//!
//! A `Batch` is the unit a source pushes; a `Record` is the unit a sink
//! receives. Batch order and in-batch record order together define the
//! total delivery order.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::StreamId;

/// One dispatchable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Originating stream
    pub stream: StreamId,

    /// Per-stream sequence number (monotonically increasing)
    pub seq: u64,

    /// Source timestamp (seconds)
    pub timestamp: f64,

    /// Payload body
    pub payload: Payload,

    /// Free-form attributes
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

/// Record payload body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// UTF-8 text
    Text(String),
    /// Structured JSON value
    Json(serde_json::Value),
    /// Opaque binary data
    Raw(Bytes),
}

impl Payload {
    /// Payload kind tag (used for logging/metrics)
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Json(_) => "json",
            Payload::Raw(_) => "raw",
        }
    }

    /// Approximate payload size in bytes
    pub fn size(&self) -> usize {
        match self {
            Payload::Text(s) => s.len(),
            Payload::Json(v) => v.to_string().len(),
            Payload::Raw(b) => b.len(),
        }
    }
}

/// One push unit: a finite ordered collection of records.
///
/// A batch may be empty; pushing an empty batch is a no-op downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Producer-assigned batch sequence number
    pub batch_id: u64,

    /// Ordered records
    pub records: Vec<Record>,
}

impl Batch {
    /// Create a batch from ordered records
    pub fn new(batch_id: u64, records: Vec<Record>) -> Self {
        Self { batch_id, records }
    }

    /// Create an empty batch
    pub fn empty(batch_id: u64) -> Self {
        Self {
            batch_id,
            records: Vec::new(),
        }
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_record(stream: &str, seq: u64, body: &str) -> Record {
        Record {
            stream: stream.into(),
            seq,
            timestamp: seq as f64 * 0.1,
            payload: Payload::Text(body.to_string()),
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_payload_kind_and_size() {
        assert_eq!(Payload::Text("abc".into()).kind(), "text");
        assert_eq!(Payload::Text("abc".into()).size(), 3);
        assert_eq!(Payload::Raw(Bytes::from_static(b"\x00\x01")).size(), 2);
        assert_eq!(Payload::Json(serde_json::json!({"a": 1})).kind(), "json");
    }

    #[test]
    fn test_batch_len() {
        let batch = Batch::new(1, vec![text_record("s", 1, "x"), text_record("s", 2, "y")]);
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert!(Batch::empty(2).is_empty());
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = text_record("alpha", 7, "hello");
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.stream, "alpha");
        assert_eq!(parsed.seq, 7);
        assert_eq!(parsed.payload.kind(), "text");
    }
}
