//! Error types for the protocol layer.
//!
//! Each crate in gloam defines its own error enum. A `ProtocolError` always
//! means "these bytes are not a valid draw-state message". It is never an
//! I/O problem or a rendering problem.

/// Errors that can occur while decoding a world-state message.
///
/// Every variant is non-fatal: the caller drops the tick and keeps going.
/// `Truncated`, `Malformed` and `TrailingBytes` are structural violations;
/// `LimitExceeded` is the sanity guard against hostile counts.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A field needed more bytes than the buffer had left.
    #[error("truncated {field}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Which field was being read.
        field: &'static str,
        /// Bytes the field needed.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// The message is structurally wrong in a way that isn't a plain length
    /// shortfall (e.g. a name with no terminating NUL).
    #[error("malformed message: {0}")]
    Malformed(String),

    /// A declared count is above the fixed sanity maximum.
    #[error("{what} count {count} exceeds maximum {max}")]
    LimitExceeded {
        /// Which list the count belongs to.
        what: &'static str,
        /// The declared count.
        count: usize,
        /// The configured maximum.
        max: usize,
    },

    /// Bytes were left over after the last bubble record.
    #[error("{0} trailing bytes after the last bubble")]
    TrailingBytes(usize),

    /// The whole message is shorter than a tag plus the fixed header.
    #[error("message too short: {0} bytes")]
    ShortMessage(usize),

    /// No decode strategy produced a valid frame.
    ///
    /// `hex` holds the first bytes of the last attempted payload, for
    /// logging. `source` is the error from that last attempt.
    #[error("undecodable draw state ({hex}): {source}")]
    Undecodable {
        /// Truncated hex dump of the payload.
        hex: String,
        /// Why the last strategy rejected it.
        #[source]
        source: Box<ProtocolError>,
    },
}

impl ProtocolError {
    /// Returns `true` for errors caused by a count above a sanity limit.
    pub fn is_limit(&self) -> bool {
        match self {
            Self::LimitExceeded { .. } => true,
            Self::Undecodable { source, .. } => source.is_limit(),
            _ => false,
        }
    }
}
