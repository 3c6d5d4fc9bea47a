//! Unified error type for gloam.

use gloam_protocol::ProtocolError;
use gloam_sprites::{ArchiveError, SpriteError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gloam` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attribute
/// on each variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GloamError {
    /// A world-state message could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The sprite archive could not be loaded.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A sprite could not be resolved from the archive.
    #[error(transparent)]
    Sprite(#[from] SpriteError),

    /// A JSON configuration document was invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::TrailingBytes(3);
        let gloam_err: GloamError = err.into();
        assert!(matches!(gloam_err, GloamError::Protocol(_)));
        assert!(gloam_err.to_string().contains("3 trailing bytes"));
    }

    #[test]
    fn test_from_archive_error() {
        let err = ArchiveError::BadMagic(0x1234);
        let gloam_err: GloamError = err.into();
        assert!(matches!(gloam_err, GloamError::Archive(_)));
    }

    #[test]
    fn test_from_sprite_error() {
        let err = SpriteError::MissingRef(7);
        let gloam_err: GloamError = err.into();
        assert!(matches!(gloam_err, GloamError::Sprite(_)));
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let gloam_err: GloamError = err.into();
        assert!(matches!(gloam_err, GloamError::Config(_)));
        assert!(gloam_err.to_string().starts_with("invalid configuration"));
    }
}
