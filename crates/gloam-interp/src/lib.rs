//! Motion estimation and interpolation state for gloam.
//!
//! Server ticks arrive a few times a second. This crate keeps the client's
//! world state between them and provides what a renderer needs to draw
//! smooth motion anyway:
//!
//! - [`StateManager`] merges each decoded tick into the shared state and
//!   hands out [`DrawStateSnapshot`] copies.
//! - [`picture_shift`] estimates how far the scenery scrolled.
//! - [`BlendFactors`] and the [`blend`] helpers place mobiles and pictures
//!   part-way through an animation interval.
//!
//! # Integration
//!
//! ```ignore
//! // decode task
//! let frame = decoder.decode_message(&msg)?;
//! state.merge_tick(&frame);
//!
//! // render loop
//! let snap = state.snapshot();
//! let blend = state.compute_blend_factors(Instant::now());
//! for m in snap.mobiles.values() {
//!     let (h, v) = blend::mobile_position(m, snap.prev_mobiles.get(&m.index), blend.position);
//!     // draw...
//! }
//! ```

pub mod blend;
mod config;
mod motion;
mod state;

pub use config::{InterpConfig, Playfield};
pub use motion::{MAX_SHIFT_PIXELS, PictureShift, picture_shift, picture_shift_within};
pub use state::{BlendFactors, DrawStateSnapshot, MergeReport, StateManager, blend_factors};
