//! Replays a recorded session through the gloam pipeline.
//!
//! ```text
//! replay <messages> [archive] [config.json]
//! ```
//!
//! `messages` is a capture of raw server messages, each prefixed with its
//! length as a big-endian u32. Set `RUST_LOG=debug` to see dropped ticks.

use std::sync::Arc;

use gloam::prelude::*;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Capture format
// ---------------------------------------------------------------------------

/// Splits a capture into its messages. A truncated final record is dropped.
fn split_capture(mut data: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    while data.len() >= 4 {
        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        data = &data[4..];
        if data.len() < len {
            warn!(len, remaining = data.len(), "truncated record at end of capture");
            break;
        }
        out.push(data[..len].to_vec());
        data = &data[len..];
    }
    out
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(capture_path) = args.next() else {
        eprintln!("usage: replay <messages> [archive] [config.json]");
        std::process::exit(2);
    };
    let archive_path = args.next();
    let config = match args.next() {
        Some(path) => ClientConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => ClientConfig::default(),
    };

    let mut ctx = ClientContext::new(config);
    if let Some(path) = archive_path {
        let archive = SpriteArchive::load(&path).await?;
        ctx = ctx.with_archive(Arc::new(archive));
    }
    let ctx = Arc::new(ctx);

    let messages = split_capture(&tokio::fs::read(&capture_path).await?);
    info!(path = %capture_path, messages = messages.len(), "replaying capture");

    let (tx, pipeline) = spawn_pipeline(ctx.clone(), 64);
    for message in messages {
        if tx.send(message).await.is_err() {
            warn!("pipeline stopped early");
            break;
        }
    }
    drop(tx);
    let stats = pipeline.await?;

    let snap = ctx.snapshot();
    let order = ctx.draw_order(&snap);
    let resolved = match ctx.archive() {
        Some(archive) => order
            .iter()
            .filter(|item| match item {
                DrawItem::Picture(p) => archive.get(u32::from(p.sprite_id), &[]).is_some(),
                DrawItem::Mobile(m) => {
                    let sprite = snap.descriptors.get(&m.index).map_or(0, |d| d.sprite_id);
                    let colors = ctx.mobile_colors(&snap, m.index, false);
                    archive.get(u32::from(sprite), &colors).is_some()
                }
            })
            .count(),
        None => 0,
    };

    info!(
        applied = stats.applied,
        dropped = stats.dropped,
        ignored = stats.ignored,
        descriptors = snap.descriptors.len(),
        pictures = snap.pictures.len(),
        mobiles = snap.mobiles.len(),
        draw_items = order.len(),
        resolved,
        light = ctx.light().level(),
        players = ctx.players().read().len(),
        "replay finished"
    );
    for line in ctx.messages().messages() {
        info!("{line}");
    }
    Ok(())
}
