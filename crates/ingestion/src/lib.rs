//! # Ingestion Pipeline
//!
//! Batch source module.
//!
//! Responsibilities:
//! - Register batch sources (synthetic generators and file replay)
//! - Merge all sources into one ordered batch stream
//! - Send downstream via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{SourcePipeline, SyntheticConfig, SyntheticSource};
//!
//! let mut pipeline = SourcePipeline::new();
//!
//! let source = SyntheticSource::new(SyntheticConfig {
//!     source_id: "gen".to_string(),
//!     streams: vec!["alpha".into(), "beta".into()],
//!     ..Default::default()
//! });
//! pipeline.register_source(Box::new(source));
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(batch) = rx.recv().await {
//!     // feed the dispatcher
//! }
//! ```

mod config;
mod error;
mod pipeline;
mod replay;
mod synthetic;

pub use config::{IngestMetrics, IngestSnapshot};
pub use error::{IngestionError, Result};
pub use pipeline::SourcePipeline;
pub use replay::{ReplayConfig, ReplaySource};
pub use synthetic::{SyntheticConfig, SyntheticSource};
