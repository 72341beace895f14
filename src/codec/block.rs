use tracing::trace;

use super::BinaryReader;
use crate::error::{DecodeResult, MapFormatError};

/// Minimum block header: type, header length, data length
pub const BLOCK_HEADER_LEN: u16 = 8;
/// Header of blocks that carry an entry count at offset 8
pub const COUNTED_BLOCK_HEADER_LEN: u16 = 10;

/// Block types found in the map stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlockType {
    ChargerLocation = 1,
    Image = 2,
    Path = 3,
    GotoPath = 4,
    GotoPredictedPath = 5,
    CleanedZones = 6,
    GotoTarget = 7,
    RobotPosition = 8,
    NoGoAreas = 9,
    VirtualWalls = 10,
    MopForbiddenAreas = 12,
    Obstacles = 13,
    IgnoredObstacles = 14,
    ObstaclesWithPhoto = 15,
    IgnoredObstaclesWithPhoto = 16,
    CarpetMap = 17,
    MopPath = 18,
    CarpetForbiddenAreas = 19,
}

impl BlockType {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(Self::ChargerLocation),
            2 => Some(Self::Image),
            3 => Some(Self::Path),
            4 => Some(Self::GotoPath),
            5 => Some(Self::GotoPredictedPath),
            6 => Some(Self::CleanedZones),
            7 => Some(Self::GotoTarget),
            8 => Some(Self::RobotPosition),
            9 => Some(Self::NoGoAreas),
            10 => Some(Self::VirtualWalls),
            12 => Some(Self::MopForbiddenAreas),
            13 => Some(Self::Obstacles),
            14 => Some(Self::IgnoredObstacles),
            15 => Some(Self::ObstaclesWithPhoto),
            16 => Some(Self::IgnoredObstaclesWithPhoto),
            17 => Some(Self::CarpetMap),
            18 => Some(Self::MopPath),
            19 => Some(Self::CarpetForbiddenAreas),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_type: u16,
    pub header_len: u16,
    pub data_len: u32,
    /// Offset of the block start within the map buffer
    pub offset: usize,
}

/// One block of the map stream, borrowing from the input buffer
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub header: BlockHeader,
    /// Header bytes (including the 8 common ones)
    pub header_bytes: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> Block<'a> {
    pub fn kind(&self) -> Option<BlockType> {
        BlockType::from_u16(self.header.block_type)
    }

    /// Entry count from the extended header.
    pub fn entry_count(&self) -> DecodeResult<u16> {
        BinaryReader::new(self.header_bytes)
            .peek_u16_le(BLOCK_HEADER_LEN as usize)
            .map_err(|_| MapFormatError::InvalidBlock {
                block_type: self.header.block_type,
                reason: format!("header of {} bytes has no entry count", self.header.header_len),
            })
    }

    /// Slice of the payload holding `count` records of `size` bytes.
    /// Fails if the declared count does not fit in the payload; the error
    /// offset is relative to the payload start.
    pub fn records(&self, count: u16, size: usize) -> DecodeResult<&'a [u8]> {
        let needed = (count as usize)
            .checked_mul(size)
            .ok_or(MapFormatError::Overflow("record table size"))?;
        if needed > self.payload.len() {
            return Err(MapFormatError::CorruptLength {
                offset: 0,
                declared: needed as u64,
                available: self.payload.len(),
            });
        }
        Ok(&self.payload[..needed])
    }

    pub fn payload_offset(&self) -> usize {
        self.header.offset + self.header_bytes.len()
    }
}

/// Walks the block stream that follows the main header.
///
/// Every declared length is checked against the rest of the buffer before
/// it is used; the first failure is returned and iteration stops.
pub struct BlockReader<'a> {
    reader: BinaryReader<'a>,
    failed: bool,
}

impl<'a> BlockReader<'a> {
    /// `start` is the offset of the first block within `data`.
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self { reader: BinaryReader::at(data, start), failed: false }
    }

    fn read_block(&mut self) -> DecodeResult<Block<'a>> {
        let offset = self.reader.position();
        let block_type = self.reader.peek_u16_le(0)?;
        let header_len = self.reader.peek_u16_le(2)?;
        if header_len < BLOCK_HEADER_LEN {
            return Err(MapFormatError::InvalidBlock {
                block_type,
                reason: format!("header length {header_len} shorter than {BLOCK_HEADER_LEN}"),
            });
        }

        let header_bytes = self.reader.read_declared(header_len as u64)?;
        let data_len = BinaryReader::at(header_bytes, 4).read_u32_le()?;
        let payload = self.reader.read_declared(data_len as u64)?;

        trace!(block_type, header_len, data_len, offset, "block");
        Ok(Block {
            header: BlockHeader { block_type, header_len, data_len, offset },
            header_bytes,
            payload,
        })
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = DecodeResult<Block<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let block = self.read_block();
        self.failed = block.is_err();
        Some(block)
    }
}
