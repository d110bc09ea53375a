//! BatchSource trait - batch producer abstraction
//!
//! Defines a unified interface for batch producers, decoupling the source
//! pipeline from concrete source implementations (synthetic, replay).

use std::sync::Arc;

use crate::{Batch, StreamId};

/// Batch callback type
///
/// When a source produces a batch, it hands the `Batch` to this callback.
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type BatchCallback = Arc<dyn Fn(Batch) + Send + Sync>;

/// Batch producer trait
///
/// Abstracts the common behavior of synthetic generators and file replay.
/// All batch producers implement this trait for use by `SourcePipeline`.
pub trait BatchSource: Send + Sync {
    /// Source identifier
    fn source_id(&self) -> &str;

    /// Streams this source emits on
    fn stream_ids(&self) -> Vec<StreamId>;

    /// Register batch callback
    ///
    /// The source calls the callback once per produced batch, in production
    /// order. Repeated calls while already listening are idempotent.
    fn listen(&self, callback: BatchCallback);

    /// Stop producing
    fn stop(&self);

    /// Check if currently producing
    fn is_running(&self) -> bool;
}
