//! Bounds-checked big-endian reads over a byte slice.
//!
//! Every read names the field it is reading, so a short buffer turns into
//! a [`ProtocolError::Truncated`] that says exactly where the data ran out.

use crate::ProtocolError;

/// A forward cursor over a byte slice. All multi-byte values are big-endian.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }

    /// Moves to an absolute offset. Seeking past the end is an error.
    pub fn seek(&mut self, pos: usize, field: &'static str) -> Result<(), ProtocolError> {
        if pos > self.data.len() {
            return Err(ProtocolError::Truncated {
                field,
                needed: pos,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Skips `n` bytes.
    pub fn skip(&mut self, n: usize, field: &'static str) -> Result<(), ProtocolError> {
        self.take(n, field).map(|_| ())
    }

    /// Takes the next `n` bytes as a slice.
    pub fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], ProtocolError> {
        let available = self.remaining();
        if n > available {
            return Err(ProtocolError::Truncated {
                field,
                needed: n,
                available,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], ProtocolError> {
        let bytes = self.take(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads one byte.
    pub fn u8(&mut self, field: &'static str) -> Result<u8, ProtocolError> {
        Ok(self.array::<1>(field)?[0])
    }

    /// Reads a big-endian `u16`.
    pub fn u16(&mut self, field: &'static str) -> Result<u16, ProtocolError> {
        self.array(field).map(u16::from_be_bytes)
    }

    /// Reads a big-endian `i16`.
    pub fn i16(&mut self, field: &'static str) -> Result<i16, ProtocolError> {
        self.array(field).map(i16::from_be_bytes)
    }

    /// Reads a big-endian `u32`.
    pub fn u32(&mut self, field: &'static str) -> Result<u32, ProtocolError> {
        self.array(field).map(u32::from_be_bytes)
    }

    /// Reads a big-endian `i32`.
    pub fn i32(&mut self, field: &'static str) -> Result<i32, ProtocolError> {
        self.array(field).map(i32::from_be_bytes)
    }

    /// Reads bytes up to (not including) the next NUL and consumes the NUL.
    ///
    /// A missing terminator is malformed, not truncated: there is no length
    /// that would have made it valid.
    pub fn c_string(&mut self, field: &'static str) -> Result<&'a [u8], ProtocolError> {
        let rest = self.rest();
        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(ProtocolError::Malformed(format!(
                "{field} is not NUL-terminated"
            )));
        };
        self.pos += end + 1;
        Ok(&rest[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() {
        let data = [0x01, 0x02, 0xFF, 0xFE, 0x00, 0x00, 0x01, 0x00, 0xFF];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.u16("a").unwrap(), 0x0102);
        assert_eq!(c.i16("b").unwrap(), -2);
        assert_eq!(c.u32("c").unwrap(), 0x100);
        assert_eq!(c.u8("d").unwrap(), 0xFF);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_truncated_names_field() {
        let mut c = ByteCursor::new(&[0x01]);
        let err = c.u32("ack frame").unwrap_err();
        match err {
            ProtocolError::Truncated {
                field,
                needed,
                available,
            } => {
                assert_eq!(field, "ack frame");
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // A failed read does not move the cursor.
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_c_string_consumes_terminator() {
        let data = b"Bob\0rest";
        let mut c = ByteCursor::new(data);
        assert_eq!(c.c_string("name").unwrap(), b"Bob");
        assert_eq!(c.rest(), b"rest");
    }

    #[test]
    fn test_c_string_without_terminator_is_malformed() {
        let mut c = ByteCursor::new(b"Bob");
        assert!(matches!(
            c.c_string("name"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut c = ByteCursor::new(&data);
        assert!(c.seek(4, "end").is_ok());
        assert_eq!(c.remaining(), 0);
        assert!(c.seek(5, "past end").is_err());
    }
}
