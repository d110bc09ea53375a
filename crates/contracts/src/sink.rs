//! RecordSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{DispatchError, Record};

/// Record output trait
///
/// All sink implementations must implement this trait. A sink is invoked
/// with exactly one record per call, in delivery order.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one record
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn deliver(&mut self, record: &Record) -> Result<(), DispatchError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), DispatchError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), DispatchError>;
}
