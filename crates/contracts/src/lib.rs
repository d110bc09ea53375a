//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Ordering Model
//! - Delivery order equals arrival order: batches are ordered by producer
//!   `batch_id`, records inside a batch keep their positional order
//! - `seq` is per-stream monotonic, used for ordering/diagnostics

mod error;
mod plan;
mod record;
mod sink;
mod source;
mod stream_id;

pub use error::*;
pub use plan::*;
pub use record::*;
pub use sink::*;
pub use source::{BatchCallback, BatchSource};
pub use stream_id::StreamId;
