//! Error types for the sprite layer.
//!
//! Loading and resolving are kept apart. A bad archive fails loudly at
//! startup ([`ArchiveError`]); a bad individual sprite ([`SpriteError`]) is
//! logged once and then treated as missing.

/// Errors that stop an archive from loading at all.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive file couldn't be read.
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    /// The first two bytes aren't `0xFFFF`.
    #[error("bad archive magic {0:#06x}")]
    BadMagic(u16),

    /// A fixed-layout region ran past the end of the file.
    #[error("archive truncated in {section}")]
    Truncated {
        /// Which part of the archive was being read.
        section: &'static str,
        /// The underlying short read.
        #[source]
        source: gloam_protocol::ProtocolError,
    },
}

/// Why a single sprite couldn't be turned into pixels.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("no reference record for sprite {0}")]
    MissingRef(u32),

    #[error("sprite {id} refers to missing image record {image_id}")]
    MissingImage { id: u32, image_id: u32 },

    #[error("sprite {id} refers to missing color record {color_id}")]
    MissingColors { id: u32, color_id: u32 },

    /// The image header or bit stream ended early.
    #[error("pixel data truncated")]
    Truncated,

    /// A pixel value has no entry in the color table.
    #[error("color index {index} out of range for table of {len}")]
    ColorIndex { index: usize, len: usize },

    /// Width × height is above [`MAX_PIXELS`](crate::MAX_PIXELS).
    #[error("image {width}x{height} exceeds pixel limit")]
    TooLarge { width: usize, height: usize },

    /// Value width must be 1..=8 bits.
    #[error("unsupported pixel value width {0}")]
    BadValueBits(u8),

    /// Block length width must be at most 32 bits.
    #[error("unsupported block length width {0}")]
    BadBlockBits(u8),
}
