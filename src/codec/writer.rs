use super::block::{BLOCK_HEADER_LEN, COUNTED_BLOCK_HEADER_LEN};
use super::map_data::MAIN_HEADER_LEN;

/// Little-endian binary writer, the inverse of `BinaryReader`
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }
}

/// Assembles a complete map file: main header followed by blocks.
///
/// Lengths are written exactly as given, so a caller can also produce
/// deliberately inconsistent files with [`BlockWriter::raw_block`].
pub struct BlockWriter {
    blocks: BinaryWriter,
    major_version: u16,
    minor_version: u16,
    map_index: u32,
    map_sequence: u32,
}

impl Default for BlockWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockWriter {
    pub fn new() -> Self {
        Self {
            blocks: BinaryWriter::new(),
            major_version: 1,
            minor_version: 0,
            map_index: 0,
            map_sequence: 0,
        }
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub fn map_id(mut self, index: u32, sequence: u32) -> Self {
        self.map_index = index;
        self.map_sequence = sequence;
        self
    }

    /// Block with the plain 8-byte header.
    pub fn block(&mut self, block_type: u16, payload: &[u8]) -> &mut Self {
        self.blocks.write_u16_le(block_type);
        self.blocks.write_u16_le(BLOCK_HEADER_LEN);
        self.blocks.write_u32_le(payload.len() as u32);
        self.blocks.write_bytes(payload);
        self
    }

    /// Block with the 10-byte header carrying an entry count.
    pub fn counted_block(&mut self, block_type: u16, entry_count: u16, payload: &[u8]) -> &mut Self {
        self.blocks.write_u16_le(block_type);
        self.blocks.write_u16_le(COUNTED_BLOCK_HEADER_LEN);
        self.blocks.write_u32_le(payload.len() as u32);
        self.blocks.write_u16_le(entry_count);
        self.blocks.write_bytes(payload);
        self
    }

    /// Block whose header fields are written verbatim, followed by `body`
    /// (the rest of the header plus payload).
    pub fn raw_block(&mut self, block_type: u16, header_len: u16, data_len: u32, body: &[u8]) -> &mut Self {
        self.blocks.write_u16_le(block_type);
        self.blocks.write_u16_le(header_len);
        self.blocks.write_u32_le(data_len);
        self.blocks.write_bytes(body);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = BinaryWriter::with_capacity(MAIN_HEADER_LEN as usize + self.blocks.len());
        out.write_bytes(b"rr");
        out.write_u16_le(MAIN_HEADER_LEN);
        out.write_u32_le(self.blocks.len() as u32);
        out.write_u16_le(self.major_version);
        out.write_u16_le(self.minor_version);
        out.write_u32_le(self.map_index);
        out.write_u32_le(self.map_sequence);
        out.write_bytes(self.blocks.as_slice());
        out.into_vec()
    }
}

/// Payload of an image block.
pub fn image_payload(top: i32, left: i32, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut w = BinaryWriter::with_capacity(20 + pixels.len());
    w.write_u32_le(pixels.len() as u32);
    w.write_i32_le(top);
    w.write_i32_le(left);
    w.write_u32_le(height);
    w.write_u32_le(width);
    w.write_bytes(pixels);
    w.into_vec()
}

/// Payload made of consecutive u16 values.
pub fn u16_payload(values: &[u16]) -> Vec<u8> {
    let mut w = BinaryWriter::with_capacity(values.len() * 2);
    for &v in values {
        w.write_u16_le(v);
    }
    w.into_vec()
}

/// Payload made of consecutive u32 values.
pub fn u32_payload(values: &[u32]) -> Vec<u8> {
    let mut w = BinaryWriter::with_capacity(values.len() * 4);
    for &v in values {
        w.write_u32_le(v);
    }
    w.into_vec()
}
