use std::fmt;
use std::io::Read;

use flate2::read::GzDecoder;
use serde::Serialize;
use tracing::{debug, warn};

use super::block::BlockReader;
use super::blocks::decode_block;
use super::types::{Area, AreaKind, Obstacle, PathKind, Point, RobotPosition, Wall, Zone};
use super::BinaryReader;
use crate::error::{DecodeResult, MapFormatError};

/// Length of the main header written by current firmware
pub const MAIN_HEADER_LEN: u16 = 20;
const MAIN_HEADER_MAGIC: &[u8; 2] = b"rr";
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
/// Upper bound on an inflated map file
pub const MAX_DECOMPRESSED_LEN: u64 = 64 * 1024 * 1024;

/// Fields of the main header, present when the header is long enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MapHeader {
    pub data_len: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub map_index: u32,
    pub map_sequence: u32,
}

impl MapHeader {
    fn read(header: &[u8]) -> DecodeResult<Option<Self>> {
        if header.len() < MAIN_HEADER_LEN as usize {
            return Ok(None);
        }
        let mut reader = BinaryReader::at(header, 4);
        Ok(Some(Self {
            data_len: reader.read_u32_le()?,
            major_version: reader.read_u16_le()?,
            minor_version: reader.read_u16_le()?,
            map_index: reader.read_u32_le()?,
            map_sequence: reader.read_u32_le()?,
        }))
    }
}

/// Decoded bitmap block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageBlock {
    pub top: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Accumulates block contents while the stream is walked
#[derive(Debug, Default)]
pub(crate) struct MapDataBuilder {
    pub header: Option<MapHeader>,
    pub image: Option<ImageBlock>,
    pub robot: Option<RobotPosition>,
    pub charger: Option<Point>,
    pub goto_target: Option<Point>,
    pub path: Vec<Point>,
    pub goto_path: Vec<Point>,
    pub predicted_path: Vec<Point>,
    pub cleaned_zones: Vec<Zone>,
    pub virtual_walls: Vec<Wall>,
    pub no_go_areas: Vec<Area>,
    pub mop_forbidden_areas: Vec<Area>,
    pub carpet_forbidden_areas: Vec<Area>,
    pub obstacles: Vec<Obstacle>,
    pub ignored_obstacles: Vec<Obstacle>,
    pub mop_path_mask: Option<Vec<u8>>,
    pub carpet_map_mask: Option<Vec<u8>>,
}

impl MapDataBuilder {
    pub fn finish(self) -> DecodeResult<MapData> {
        let image = self
            .image
            .ok_or(MapFormatError::InvalidDimensions { width: 0, height: 0 })?;

        let expected = image.pixels.len();
        for (mask, bytes) in [("carpet map", &self.carpet_map_mask), ("mop path", &self.mop_path_mask)] {
            if let Some(bytes) = bytes {
                if bytes.len() != expected {
                    return Err(MapFormatError::MaskSizeMismatch { mask, expected, actual: bytes.len() });
                }
            }
        }

        Ok(MapData {
            header: self.header,
            image_width: image.width,
            image_height: image.height,
            top: image.top,
            left: image.left,
            image_data: image.pixels,
            robot: self.robot,
            charger: self.charger,
            goto_target: self.goto_target,
            path: self.path,
            goto_path: self.goto_path,
            predicted_path: self.predicted_path,
            cleaned_zones: self.cleaned_zones,
            virtual_walls: self.virtual_walls,
            no_go_areas: self.no_go_areas,
            mop_forbidden_areas: self.mop_forbidden_areas,
            carpet_forbidden_areas: self.carpet_forbidden_areas,
            obstacles: self.obstacles,
            ignored_obstacles: self.ignored_obstacles,
            mop_path_mask: self.mop_path_mask,
            carpet_map_mask: self.carpet_map_mask,
        })
    }
}

/// A decoded vacuum map. Built once by [`MapData::parse`], read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapData {
    header: Option<MapHeader>,
    image_width: u32,
    image_height: u32,
    top: i32,
    left: i32,
    #[serde(skip)]
    image_data: Vec<u8>,
    robot: Option<RobotPosition>,
    charger: Option<Point>,
    goto_target: Option<Point>,
    path: Vec<Point>,
    goto_path: Vec<Point>,
    predicted_path: Vec<Point>,
    cleaned_zones: Vec<Zone>,
    virtual_walls: Vec<Wall>,
    no_go_areas: Vec<Area>,
    mop_forbidden_areas: Vec<Area>,
    carpet_forbidden_areas: Vec<Area>,
    obstacles: Vec<Obstacle>,
    ignored_obstacles: Vec<Obstacle>,
    #[serde(skip)]
    mop_path_mask: Option<Vec<u8>>,
    #[serde(skip)]
    carpet_map_mask: Option<Vec<u8>>,
}

impl MapData {
    /// Decode an uncompressed map buffer.
    pub fn parse(data: &[u8]) -> DecodeResult<Self> {
        let mut reader = BinaryReader::new(data);
        let header_len = reader.peek_u16_le(2)?;
        if header_len < 4 {
            return Err(MapFormatError::CorruptLength {
                offset: 2,
                declared: header_len as u64,
                available: data.len(),
            });
        }
        let header_bytes = reader.read_declared(header_len as u64)?;
        if &header_bytes[..2] != MAIN_HEADER_MAGIC {
            warn!(magic = ?&header_bytes[..2], "unexpected map header magic");
        }

        let mut builder = MapDataBuilder { header: MapHeader::read(header_bytes)?, ..Default::default() };
        let mut block_count = 0usize;
        for block in BlockReader::new(data, reader.position()) {
            decode_block(&block?, &mut builder)?;
            block_count += 1;
        }
        debug!(block_count, len = data.len(), "map decoded");

        builder.finish()
    }

    pub fn header(&self) -> Option<&MapHeader> {
        self.header.as_ref()
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    /// Occupancy bytes, row-major, `image_width * image_height` long
    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    pub fn robot(&self) -> Option<RobotPosition> {
        self.robot
    }

    pub fn charger(&self) -> Option<Point> {
        self.charger
    }

    pub fn goto_target(&self) -> Option<Point> {
        self.goto_target
    }

    pub fn path(&self, kind: PathKind) -> &[Point] {
        match kind {
            PathKind::Travelled => &self.path,
            PathKind::Goto => &self.goto_path,
            PathKind::Predicted => &self.predicted_path,
        }
    }

    pub fn cleaned_zones(&self) -> &[Zone] {
        &self.cleaned_zones
    }

    pub fn virtual_walls(&self) -> &[Wall] {
        &self.virtual_walls
    }

    pub fn areas(&self, kind: AreaKind) -> &[Area] {
        match kind {
            AreaKind::NoGo => &self.no_go_areas,
            AreaKind::MopForbidden => &self.mop_forbidden_areas,
            AreaKind::CarpetForbidden => &self.carpet_forbidden_areas,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ignored_obstacles(&self) -> &[Obstacle] {
        &self.ignored_obstacles
    }

    /// Mop path flags, one byte per pixel; `None` means all zero
    pub fn mop_path_mask(&self) -> Option<&[u8]> {
        self.mop_path_mask.as_deref()
    }

    /// Carpet flags, one byte per pixel; `None` means all zero
    pub fn carpet_map_mask(&self) -> Option<&[u8]> {
        self.carpet_map_mask.as_deref()
    }
}

impl fmt::Display for MapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = &self.header {
            write!(f, "Map v{}.{} index {} sequence {}, ", h.major_version, h.minor_version, h.map_index, h.map_sequence)?;
        }
        write!(f, "image {}x{} at top {} left {}", self.image_width, self.image_height, self.top, self.left)?;
        if let Some(r) = self.robot {
            write!(f, ", robot ({}, {}) {}°", r.x, r.y, r.angle)?;
        }
        if let Some(c) = self.charger {
            write!(f, ", charger ({}, {})", c.x, c.y)?;
        }
        if let Some(g) = self.goto_target {
            write!(f, ", goto ({}, {})", g.x, g.y)?;
        }
        write!(
            f,
            ", paths {}/{}/{}, zones {}, walls {}, no-go {}, mop-forbidden {}, carpet-forbidden {}, obstacles {} (+{} ignored)",
            self.path.len(),
            self.goto_path.len(),
            self.predicted_path.len(),
            self.cleaned_zones.len(),
            self.virtual_walls.len(),
            self.no_go_areas.len(),
            self.mop_forbidden_areas.len(),
            self.carpet_forbidden_areas.len(),
            self.obstacles.len(),
            self.ignored_obstacles.len(),
        )?;
        if self.carpet_map_mask.is_some() {
            f.write_str(", carpet map")?;
        }
        if self.mop_path_mask.is_some() {
            f.write_str(", mop path")?;
        }
        Ok(())
    }
}

/// Decode a map file as delivered by the device cloud, inflating it first
/// when it is gzip-compressed.
pub fn parse_map_file(data: &[u8]) -> DecodeResult<MapData> {
    if data.starts_with(&GZIP_MAGIC) {
        let inflated = decompress_gzip(data)?;
        debug!(compressed = data.len(), inflated = inflated.len(), "map file inflated");
        return MapData::parse(&inflated);
    }
    MapData::parse(data)
}

fn decompress_gzip(data: &[u8]) -> DecodeResult<Vec<u8>> {
    let mut decompressed = Vec::new();
    GzDecoder::new(data)
        .take(MAX_DECOMPRESSED_LEN + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| MapFormatError::Decompress(e.to_string()))?;
    if decompressed.len() as u64 > MAX_DECOMPRESSED_LEN {
        return Err(MapFormatError::Decompress(format!(
            "inflated map exceeds {MAX_DECOMPRESSED_LEN} bytes"
        )));
    }
    Ok(decompressed)
}
