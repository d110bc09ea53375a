//! Sequential Drain Demo
//!
//! Drives the bare SequentialDispatcher primitive directly: pushes a few
//! batches and shows that the target sees one delivery per item, in order.
//!
//! Run with: cargo run --bin sequential_drain

use dispatcher::{DispatchState, SequentialDispatcher};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("Starting Sequential Drain Demo");

    let mut delivered: Vec<String> = Vec::new();
    let mut sequencer = SequentialDispatcher::new(|item: String| {
        tracing::info!(item = %item, "delivered");
        delivered.push(item);
    });

    assert_eq!(sequencer.state(), DispatchState::Idle);

    // One push, several items
    sequencer.push(vec!["a-1".to_string(), "a-2".to_string(), "a-3".to_string()]);

    // An empty push changes nothing
    sequencer.push(Vec::new());

    // Back-to-back pushes keep overall arrival order
    sequencer.push(vec!["b-1".to_string()]);
    sequencer.push(vec!["b-2".to_string(), "b-3".to_string()]);

    let total = sequencer.delivered();
    assert!(sequencer.is_idle());
    drop(sequencer);

    tracing::info!(total, "all batches drained");
    println!("delivery order: {delivered:?}");
}
