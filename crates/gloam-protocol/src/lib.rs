//! Wire layer for gloam.
//!
//! This crate turns the server's raw world-state bytes into typed frames:
//!
//! - **Bit and byte readers** ([`BitReader`], [`ByteCursor`]) shared with
//!   the sprite codec.
//! - **Types** ([`DrawStateFrame`] and its parts) describing one tick.
//! - **Decoder** ([`DrawStateDecoder`]) with pluggable
//!   [`DecodeStrategy`]s for the plain and XOR-obfuscated encodings.
//! - **Errors** ([`ProtocolError`]) for everything that can be wrong with
//!   the bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about client state. It validates a
//! message completely or rejects it; merging is someone else's job.
//!
//! ```text
//! raw bytes → DrawStateDecoder → DrawStateFrame → (gloam-interp) state merge
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

pub mod bits;
pub mod cursor;
mod decoder;
mod error;
pub mod text;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use bits::{BitReader, sign_extend};
pub use cursor::ByteCursor;
pub use decoder::{
    DRAW_STATE_TAG, DecodeStrategy, DecoderConfig, DrawStateDecoder, MIN_MESSAGE_LEN, Plain,
    XOR_KEY, Xor, parse_draw_state, xor_in_place,
};
pub use error::ProtocolError;
pub use types::{
    Bubble, BubbleKind, DrawStateFrame, FrameDescriptor, FrameHeader, FrameMobile, FramePicture,
    InfoLine, NightCommand, Vitals, pictures_summary,
};
