//! Little-endian field cursors
//!
//! Every persisted structure in this crate is laid out at fixed offsets in
//! little-endian byte order. These cursors keep the offset bookkeeping out of
//! the individual codecs.

use heapless::String;

/// Sequential little-endian writer over a caller-provided buffer
///
/// The buffer must be at least as long as the fields written into it; codecs
/// are always handed a buffer of exactly their `SIZE`.
pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    pub fn put_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    pub fn put_bool(&mut self, value: bool) {
        self.put_u8(value as u8);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    pub fn put_f32(&mut self, value: f32) {
        self.put(&value.to_bits().to_le_bytes());
    }

    /// Write a string into a fixed-width, NUL-padded field
    ///
    /// Bytes beyond `width` are dropped, so callers size `width` at least one
    /// past the string's capacity to keep a terminator.
    pub fn put_str(&mut self, value: &str, width: usize) {
        let bytes = value.as_bytes();
        let used = bytes.len().min(width);
        self.put(&bytes[..used]);
        for _ in used..width {
            self.put_u8(0);
        }
    }
}

/// Sequential little-endian reader; every getter returns `None` on short input
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    pub fn get_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    /// Booleans are persisted as 0 or 1; any other byte is rejected
    pub fn get_bool(&mut self) -> Option<bool> {
        match self.get_u8()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    pub fn get_u16(&mut self) -> Option<u16> {
        let b = self.take(2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn get_u32(&mut self) -> Option<u32> {
        let b = self.take(4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn get_f32(&mut self) -> Option<f32> {
        self.get_u32().map(f32::from_bits)
    }

    /// Read a fixed-width, NUL-padded string field
    pub fn get_str<const N: usize>(&mut self, width: usize) -> Option<String<N>> {
        let field = self.take(width)?;
        let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        let text = core::str::from_utf8(&field[..len]).ok()?;
        String::try_from(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_string_field() {
        let mut buf = [0xAAu8; 8];
        let mut writer = WireWriter::new(&mut buf);
        writer.put_str("apn", 8);
        assert_eq!(writer.position(), 8);
        assert_eq!(&buf, b"apn\0\0\0\0\0");

        let mut reader = WireReader::new(&buf);
        let text: String<7> = reader.get_str(8).unwrap();
        assert_eq!(text.as_str(), "apn");
    }

    #[test]
    fn test_string_longer_than_capacity_rejected() {
        let buf = *b"internet";
        let mut reader = WireReader::new(&buf);
        assert!(reader.get_str::<4>(8).is_none());
    }

    #[test]
    fn test_short_input_returns_none() {
        let buf = [0x01, 0x02, 0x03];
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.get_u16(), Some(0x0201));
        assert_eq!(reader.get_u32(), None);
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let buf = [0x00, 0x01, 0x7F];
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.get_bool(), Some(false));
        assert_eq!(reader.get_bool(), Some(true));
        assert_eq!(reader.get_bool(), None);
    }
}
