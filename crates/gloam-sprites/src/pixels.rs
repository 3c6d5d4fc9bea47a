//! The run-length bit-stream pixel codec.
//!
//! Image data is a sequence of blocks, each starting with a flag bit and a
//! `block_len_bits`-wide length (stored minus one):
//!
//! ```text
//! 1 LLLL vvv vvv vvv ...   literal block: L+1 values follow
//! 0 LLLL vvv               run block: one value repeated L+1 times
//! ```
//!
//! Values are `value_bits` wide and index the sprite's color table. Decoding
//! stops as soon as `width * height` values have been produced; a block that
//! overshoots is cut short.

use gloam_protocol::BitReader;

use crate::SpriteError;

/// Upper bound on `width * height` for one image.
pub const MAX_PIXELS: usize = 1 << 24;

/// Decodes a run-length stream into one color-table index per pixel.
///
/// This is a pure function of its arguments, so it can be tested without an
/// archive.
///
/// # Errors
/// - [`SpriteError::BadValueBits`] if `value_bits` is 0 or above 8.
/// - [`SpriteError::BadBlockBits`] if `block_len_bits` is above 32.
/// - [`SpriteError::TooLarge`] if the image exceeds [`MAX_PIXELS`].
/// - [`SpriteError::Truncated`] if the stream ends before the last pixel.
pub fn decode_indexed(
    bytes: &[u8],
    width: usize,
    height: usize,
    value_bits: u8,
    block_len_bits: u8,
) -> Result<Vec<u8>, SpriteError> {
    if value_bits == 0 || value_bits > 8 {
        return Err(SpriteError::BadValueBits(value_bits));
    }
    if block_len_bits > 32 {
        return Err(SpriteError::BadBlockBits(block_len_bits));
    }
    let total = width
        .checked_mul(height)
        .filter(|&n| n <= MAX_PIXELS)
        .ok_or(SpriteError::TooLarge { width, height })?;

    let value_bits = u32::from(value_bits);
    let block_len_bits = u32::from(block_len_bits);
    let mut reader = BitReader::new(bytes);
    let mut out = Vec::with_capacity(total);

    while out.len() < total {
        let literal = reader.read_bit();
        let run = reader.read_int(block_len_bits).saturating_add(1);
        let run = run.min(total - out.len());

        if literal {
            for _ in 0..run {
                out.push(reader.read_bits(value_bits) as u8);
            }
        } else {
            let value = reader.read_bits(value_bits) as u8;
            out.resize(out.len() + run, value);
        }

        if reader.overran() {
            return Err(SpriteError::Truncated);
        }
    }

    Ok(out)
}
