//! Big-endian cursor over a record payload that keeps track of absolute file offsets.

use bytes::Buf;

/// Short read while decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected end of data at offset {offset} reading {what}: need {needed} bytes, {available} available")]
pub struct WireError {
    pub offset: u64,
    pub what: &'static str,
    pub needed: usize,
    pub available: usize,
}

/// Cursor over a borrowed byte slice.
///
/// `origin` is the absolute stream offset of the first byte of the slice, so
/// errors and subrecord headers can report positions in file coordinates.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    initial_len: usize,
    origin: u64,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8], origin: u64) -> Self {
        Self {
            buf,
            initial_len: buf.len(),
            origin,
        }
    }

    /// Absolute stream offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.origin + self.position() as u64
    }

    /// Bytes consumed since construction.
    pub fn position(&self) -> usize {
        self.initial_len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize, what: &'static str) -> Result<(), WireError> {
        if self.buf.remaining() < needed {
            return Err(WireError {
                offset: self.offset(),
                what,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self, what: &'static str) -> Result<u8, WireError> {
        self.ensure(1, what)?;
        Ok(self.buf.get_u8())
    }

    pub fn i8(&mut self, what: &'static str) -> Result<i8, WireError> {
        self.ensure(1, what)?;
        Ok(self.buf.get_i8())
    }

    pub fn u16(&mut self, what: &'static str) -> Result<u16, WireError> {
        self.ensure(2, what)?;
        Ok(self.buf.get_u16())
    }

    pub fn i16(&mut self, what: &'static str) -> Result<i16, WireError> {
        self.ensure(2, what)?;
        Ok(self.buf.get_i16())
    }

    pub fn u32(&mut self, what: &'static str) -> Result<u32, WireError> {
        self.ensure(4, what)?;
        Ok(self.buf.get_u32())
    }

    pub fn i32(&mut self, what: &'static str) -> Result<i32, WireError> {
        self.ensure(4, what)?;
        Ok(self.buf.get_i32())
    }

    /// Reads an unsigned big-endian integer of `width` bytes (1, 2 or 4).
    pub fn unsigned(&mut self, width: usize, what: &'static str) -> Result<u32, WireError> {
        match width {
            1 => self.u8(what).map(u32::from),
            2 => self.u16(what).map(u32::from),
            _ => self.u32(what),
        }
    }

    /// Reads a signed big-endian integer of `width` bytes (1, 2 or 4).
    pub fn signed(&mut self, width: usize, what: &'static str) -> Result<i32, WireError> {
        match width {
            1 => self.i8(what).map(i32::from),
            2 => self.i16(what).map(i32::from),
            _ => self.i32(what),
        }
    }

    /// Reads a `(u32 seconds, u32 nanoseconds)` pair as nanoseconds since the Unix epoch.
    pub fn time(&mut self, what: &'static str) -> Result<i64, WireError> {
        let seconds = self.u32(what)?;
        let nanoseconds = self.u32(what)?;
        Ok(i64::from(seconds) * 1_000_000_000 + i64::from(nanoseconds))
    }

    pub fn bytes(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], WireError> {
        self.ensure(n, what)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn skip(&mut self, n: usize, what: &'static str) -> Result<(), WireError> {
        self.ensure(n, what)?;
        self.buf.advance(n);
        Ok(())
    }

    /// Reads `n` bytes as text, dropping trailing NULs and replacing invalid UTF-8.
    pub fn text(&mut self, n: usize, what: &'static str) -> Result<String, WireError> {
        let raw = self.bytes(n, what)?;
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Remaining unread bytes, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_absolute_offset_on_short_read() {
        let data = [0u8, 1, 2];
        let mut r = WireReader::new(&data, 100);
        assert_eq!(r.u16("a").unwrap(), 1);
        let err = r.u32("b").unwrap_err();
        assert_eq!(err.offset, 102);
        assert_eq!(err.needed, 4);
        assert_eq!(err.available, 1);
    }

    #[test]
    fn reads_variable_width_integers() {
        let data = [0xFF, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x05];
        let mut r = WireReader::new(&data, 0);
        assert_eq!(r.signed(1, "x").unwrap(), -1);
        assert_eq!(r.signed(2, "x").unwrap(), -512);
        assert_eq!(r.unsigned(4, "x").unwrap(), 5);
        assert!(r.is_empty());
    }

    #[test]
    fn text_trims_trailing_nul_padding() {
        let data = *b"GSF-v03.09\0\0";
        let mut r = WireReader::new(&data, 0);
        assert_eq!(r.text(12, "version").unwrap(), "GSF-v03.09");
    }
}
