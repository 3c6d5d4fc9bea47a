//! # gloam
//!
//! Client core for a tile-and-sprite multiplayer world.
//!
//! The server sends one packed world-state message per tick. gloam decodes
//! it, merges it into a persistent picture of the world, and gives the
//! renderer everything it needs to draw smoothly between ticks:
//!
//! - [`gloam_protocol`] decodes the wire format.
//! - [`gloam_interp`] merges ticks, estimates scenery motion and computes
//!   blend factors.
//! - [`gloam_sprites`] reads the sprite archive into RGBA surfaces.
//! - [`gloam_players`] remembers what each player looks like.
//!
//! This crate ties them together in a [`ClientContext`] and runs the decode
//! loop as a Tokio task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gloam::prelude::*;
//!
//! # async fn run() -> Result<(), GloamError> {
//! let config = ClientConfig::from_json(r#"{"player_name": "Alice"}"#)?;
//! let archive = SpriteArchive::load("CL_Images").await?;
//! let ctx = Arc::new(ClientContext::new(config).with_archive(Arc::new(archive)));
//!
//! let (tx, pipeline) = spawn_pipeline(ctx.clone(), 64);
//! // feed raw messages from the network into `tx`...
//! drop(tx);
//! let stats = pipeline.await.unwrap_or_default();
//! println!("{} ticks applied", stats.applied);
//! # Ok(())
//! # }
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod config;
mod context;
pub mod draw_order;
mod error;
pub mod lighting;
mod message_log;
mod pipeline;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::ClientConfig;
pub use context::{ClientContext, MessageOutcome, format_bubble};
pub use draw_order::{DrawItem, draw_order};
pub use error::GloamError;
pub use lighting::AmbientLight;
pub use message_log::MessageLog;
pub use pipeline::{PipelineStats, run_pipeline, spawn_pipeline};

pub use gloam_interp;
pub use gloam_players;
pub use gloam_protocol;
pub use gloam_sprites;

/// Convenience re-exports for the common case.
pub mod prelude {
    pub use crate::{
        AmbientLight, ClientConfig, ClientContext, DrawItem, GloamError, MessageOutcome,
        PipelineStats, spawn_pipeline,
    };
    pub use gloam_interp::{BlendFactors, DrawStateSnapshot, InterpConfig};
    pub use gloam_protocol::{DrawStateFrame, ProtocolError};
    pub use gloam_sprites::{SpriteArchive, Surface};
}
