//! The decode loop as a Tokio task.
//!
//! Whoever owns the network connection pushes raw tagged messages into a
//! channel; the pipeline task is the single writer that decodes them and
//! merges them into the [`ClientContext`], in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{ClientContext, MessageOutcome};

/// Counters for a finished (or running) pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Messages received.
    pub messages: u64,
    /// Draw-state ticks decoded and merged.
    pub applied: u64,
    /// Messages that failed to decode and were dropped.
    pub dropped: u64,
    /// Messages with a tag other than draw state.
    pub ignored: u64,
}

/// Drains `rx` until every sender is gone, applying each message to `ctx`.
pub async fn run_pipeline(ctx: Arc<ClientContext>, mut rx: mpsc::Receiver<Vec<u8>>) -> PipelineStats {
    info!("pipeline started");
    let mut stats = PipelineStats::default();

    while let Some(message) = rx.recv().await {
        stats.messages += 1;
        match ctx.handle_message(&message) {
            Ok(MessageOutcome::Applied(_)) => stats.applied += 1,
            Ok(MessageOutcome::Ignored(_)) => stats.ignored += 1,
            Err(e) => {
                stats.dropped += 1;
                debug!(error = %e, len = message.len(), "dropped message");
            }
        }
    }

    info!(
        messages = stats.messages,
        applied = stats.applied,
        dropped = stats.dropped,
        ignored = stats.ignored,
        "pipeline stopped"
    );
    stats
}

/// Spawns [`run_pipeline`] on the current runtime.
///
/// Returns the sending half of a channel holding up to `channel_size`
/// messages, and a handle resolving to the final stats once the sender (and
/// all its clones) are dropped.
pub fn spawn_pipeline(
    ctx: Arc<ClientContext>,
    channel_size: usize,
) -> (mpsc::Sender<Vec<u8>>, JoinHandle<PipelineStats>) {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let handle = tokio::spawn(run_pipeline(ctx, rx));
    (tx, handle)
}
