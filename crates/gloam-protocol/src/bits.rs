//! Bit-level reading over a byte buffer.
//!
//! Both the draw-state pictures and the sprite pixel blocks are packed at
//! arbitrary bit widths. [`BitReader`] reads them most-significant-bit first,
//! straight across byte boundaries:
//!
//! ```text
//! bytes:  1010_1100  0111_0000
//! read_bits(3) → 0b101
//! read_bits(7) → 0b0_1100_01
//! ```
//!
//! Reading past the end never fails. Missing bits are zero, and the reader
//! remembers that it ran off the end ([`BitReader::overran`]) so a caller
//! that cares can reject the input afterwards instead of mid-decode.

/// MSB-first bit reader over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
    overran: bool,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_pos: 0,
            overran: false,
        }
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> bool {
        self.read_bits(1) == 1
    }

    /// Reads `n` bits (0..=32) as an unsigned value.
    ///
    /// Bits beyond the end of the buffer read as zero. Widths above 32 are
    /// clamped to 32.
    pub fn read_bits(&mut self, n: u32) -> u32 {
        let mut remaining = n.min(32);
        let mut value: u64 = 0;

        while remaining > 0 {
            let byte_idx = self.bit_pos / 8;
            let Some(&byte) = self.data.get(byte_idx) else {
                // Zero-fill: shift in the missing bits and stop.
                self.overran = true;
                value <<= remaining;
                self.bit_pos += remaining as usize;
                break;
            };

            let avail = 8 - (self.bit_pos % 8) as u32;
            let take = avail.min(remaining);
            let shift = avail - take;
            let mask = (1u32 << take) - 1;
            let bits = (u32::from(byte) >> shift) & mask;

            value = (value << take) | u64::from(bits);
            self.bit_pos += take as usize;
            remaining -= take;
        }

        value as u32
    }

    /// Reads an `n`-bit unsigned field as a count or index.
    pub fn read_int(&mut self, n: u32) -> usize {
        self.read_bits(n) as usize
    }

    /// Current position in bits from the start of the buffer.
    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    /// Number of bytes touched so far, counting a partial byte as whole.
    pub fn bytes_consumed(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    /// `true` once any read has gone past the end of the buffer.
    pub fn overran(&self) -> bool {
        self.overran
    }
}

/// Sign-extends the low `bits` bits of `value` into an `i16`.
///
/// The top bit of the field is the sign bit: for an 11-bit field,
/// `0x3FF` is `1023` and `0x400` is `-1024`.
pub fn sign_extend(value: u32, bits: u32) -> i16 {
    if bits == 0 || bits >= 32 {
        return value as i32 as i16;
    }
    let shift = 32 - bits;
    (((value << shift) as i32) >> shift) as i16
}
