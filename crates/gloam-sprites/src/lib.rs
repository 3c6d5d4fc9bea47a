//! Sprite archive support for gloam.
//!
//! The server only ever sends sprite *ids*. This crate turns an id (plus an
//! optional list of custom colors) into pixels:
//!
//! - **Archive** ([`SpriteArchive`]): parses the archive's entry table,
//!   reference and color records, and resolves sprites on demand through a
//!   shared cache.
//! - **Pixel codec** ([`decode_indexed`]): the run-length bit-stream
//!   decoder, as a pure function.
//! - **Palette** ([`MAC_PALETTE`]): the fixed 256-color system palette.
//! - **Surfaces** ([`Surface`], [`animation_frame`], [`mobile_frame`]):
//!   decoded images and the sub-image helpers renderers need.
//!
//! ```text
//! sprite id ──► IdRef ──► image record ──► decode_indexed ──► color table ──► Surface
//!                     └─► color record ──────────────────────────┘
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod archive;
mod error;
mod palette;
mod pixels;
mod surface;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use archive::{
    ARCHIVE_MAGIC, BLEND_MASK, ColorRecord, FLAG_CUSTOM_COLORS, FLAG_TRANSPARENT, IdRef,
    ImageRecord, SpriteArchive, TYPE_COLOR, TYPE_IDREF, TYPE_IMAGE, TYPE_VERSION,
    alpha_for_flags, apply_custom_colors,
};
pub use error::{ArchiveError, SpriteError};
pub use palette::MAC_PALETTE;
pub use pixels::{MAX_PIXELS, decode_indexed};
pub use surface::{Surface, animation_frame, mobile_frame};
