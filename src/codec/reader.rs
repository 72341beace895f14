use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeResult, MapFormatError};

/// Bounds-checked little-endian reader over a map buffer
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader over the whole of `data`, with the cursor already at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos: pos.min(data.len()) }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, n: usize) -> DecodeResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(MapFormatError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Like `read_bytes`, but a length larger than the rest of the buffer is
    /// reported as a corrupt declared length rather than a plain truncation.
    pub fn read_declared(&mut self, declared: u64) -> DecodeResult<&'a [u8]> {
        let available = self.remaining();
        match usize::try_from(declared) {
            Ok(n) if n <= available => self.read_bytes(n),
            _ => Err(MapFormatError::CorruptLength {
                offset: self.pos,
                declared,
                available,
            }),
        }
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> DecodeResult<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32_le(&mut self) -> DecodeResult<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32_le(&mut self) -> DecodeResult<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    /// Read a u16 without consuming it, `offset` bytes past the cursor.
    pub fn peek_u16_le(&self, offset: usize) -> DecodeResult<u16> {
        let start = self
            .pos
            .checked_add(offset)
            .ok_or(MapFormatError::Overflow("peek offset"))?;
        let end = start.checked_add(2).ok_or(MapFormatError::Overflow("peek offset"))?;
        self.data
            .get(start..end)
            .map(LittleEndian::read_u16)
            .ok_or(MapFormatError::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0302);
        assert_eq!(reader.read_u32_le().unwrap(), 0x07060504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_past_end() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u32_le(), Err(MapFormatError::UnexpectedEof));
        // a failed read does not move the cursor
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0201);
    }

    #[test]
    fn test_read_declared_rejects_huge_length() {
        let data = [0u8; 16];
        let mut reader = BinaryReader::new(&data);
        reader.skip(4).unwrap();
        assert_eq!(
            reader.read_declared(0x7FFF_FFFF),
            Err(MapFormatError::CorruptLength { offset: 4, declared: 0x7FFF_FFFF, available: 12 })
        );
        assert_eq!(reader.read_declared(12).unwrap().len(), 12);
    }

    #[test]
    fn test_peek_u16() {
        let data = [0xAA, 0x34, 0x12];
        let mut reader = BinaryReader::new(&data);
        reader.skip(1).unwrap();
        assert_eq!(reader.peek_u16_le(0).unwrap(), 0x1234);
        assert_eq!(reader.peek_u16_le(1), Err(MapFormatError::UnexpectedEof));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_signed_read() {
        let data = (-1234i32).to_le_bytes();
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_i32_le().unwrap(), -1234);
    }
}
