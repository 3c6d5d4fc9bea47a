//! Player appearance tracking for gloam.
//!
//! Descriptors identify entities by a reusable slot index. This crate keeps
//! a second view keyed by *name*, so a player's sprite and custom colors are
//! remembered across slot changes and across ticks that omit them.
//!
//! ```text
//! DrawStateFrame.descriptors ──► PlayerRegistry::apply_descriptors
//!                                        │
//!                        renderer ◄── effective_colors(descriptor)
//! ```

mod appearance;
mod registry;

pub use appearance::PlayerAppearance;
pub use registry::PlayerRegistry;
