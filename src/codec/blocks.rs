use tracing::{debug, warn};

use super::block::{Block, BlockType};
use super::map_data::{ImageBlock, MapDataBuilder};
use super::obstacle::ObstacleCatalog;
use super::types::{Area, Obstacle, Point, RobotPosition, Wall, Zone};
use super::BinaryReader;
use crate::error::{DecodeResult, MapFormatError};

const AREA_RECORD_LEN: usize = 16;
const WALL_RECORD_LEN: usize = 8;
const OBSTACLE_RECORD_LEN: usize = 5;
const PHOTO_OBSTACLE_RECORD_LEN: usize = 28;

/// Decode one block into the builder. Unknown block types are skipped.
pub(crate) fn decode_block(block: &Block<'_>, map: &mut MapDataBuilder) -> DecodeResult<()> {
    let Some(kind) = block.kind() else {
        debug!(
            block_type = block.header.block_type,
            data_len = block.header.data_len,
            "skipping unknown block"
        );
        return Ok(());
    };
    debug!(?kind, header_len = block.header.header_len, data_len = block.header.data_len, "decoding block");

    decode_known(kind, block, map).map_err(|e| rebase(e, block.payload_offset()))
}

fn decode_known(kind: BlockType, block: &Block<'_>, map: &mut MapDataBuilder) -> DecodeResult<()> {
    let mut reader = BinaryReader::new(block.payload);
    match kind {
        BlockType::ChargerLocation => {
            map.charger = Some(Point::new(reader.read_i32_le()?, reader.read_i32_le()?));
        }
        BlockType::Image => map.image = Some(read_image(&mut reader)?),
        BlockType::Path => map.path = read_points(&mut reader)?,
        BlockType::GotoPath => map.goto_path = read_points(&mut reader)?,
        BlockType::GotoPredictedPath => map.predicted_path = read_points(&mut reader)?,
        BlockType::CleanedZones => {
            let mut zones = Vec::with_capacity(block.payload.len() / 8);
            while !reader.is_empty() {
                let [x0, y0, x1, y1] = read_u16_coords::<4>(&mut reader)?;
                zones.push(Zone { x0, y0, x1, y1 });
            }
            map.cleaned_zones = zones;
        }
        BlockType::GotoTarget => {
            let [x, y] = read_u16_coords::<2>(&mut reader)?;
            map.goto_target = Some(Point::new(x, y));
        }
        BlockType::RobotPosition => {
            map.robot = Some(RobotPosition {
                x: reader.read_i32_le()?,
                y: reader.read_i32_le()?,
                angle: reader.read_i32_le()?,
            });
        }
        BlockType::NoGoAreas => map.no_go_areas = read_areas(block)?,
        BlockType::MopForbiddenAreas => map.mop_forbidden_areas = read_areas(block)?,
        BlockType::CarpetForbiddenAreas => map.carpet_forbidden_areas = read_areas(block)?,
        BlockType::VirtualWalls => {
            let count = block.entry_count()?;
            let mut records = BinaryReader::new(block.records(count, WALL_RECORD_LEN)?);
            let mut walls = Vec::with_capacity(count as usize);
            while !records.is_empty() {
                let [x0, y0, x1, y1] = read_u16_coords::<4>(&mut records)?;
                walls.push(Wall { x0, y0, x1, y1 });
            }
            map.virtual_walls = walls;
        }
        BlockType::Obstacles => map.obstacles.extend(read_obstacles(block)?),
        BlockType::IgnoredObstacles => map.ignored_obstacles.extend(read_obstacles(block)?),
        BlockType::ObstaclesWithPhoto => map.obstacles.extend(read_photo_obstacles(block)?),
        BlockType::IgnoredObstaclesWithPhoto => map.ignored_obstacles.extend(read_photo_obstacles(block)?),
        BlockType::CarpetMap => map.carpet_map_mask = Some(block.payload.to_vec()),
        BlockType::MopPath => map.mop_path_mask = Some(block.payload.to_vec()),
    }
    Ok(())
}

/// Image payload: data length, top, left, height, width, then one byte per pixel.
fn read_image(reader: &mut BinaryReader<'_>) -> DecodeResult<ImageBlock> {
    let data_len = reader.read_u32_le()?;
    let top = reader.read_i32_le()?;
    let left = reader.read_i32_le()?;
    let height = reader.read_u32_le()?;
    let width = reader.read_u32_le()?;
    if width == 0 || height == 0 {
        return Err(MapFormatError::InvalidDimensions { width, height });
    }

    let pixel_count = (width as u64)
        .checked_mul(height as u64)
        .ok_or(MapFormatError::Overflow("image pixel count"))?;
    if data_len as u64 != pixel_count {
        warn!(data_len, width, height, "image data length disagrees with dimensions");
    }
    // checked against the payload before anything is allocated
    let pixels = reader.read_declared(pixel_count)?;

    Ok(ImageBlock { top, left, width, height, pixels: pixels.to_vec() })
}

fn read_u16_coords<const N: usize>(reader: &mut BinaryReader<'_>) -> DecodeResult<[i32; N]> {
    let mut coords = [0i32; N];
    for c in coords.iter_mut() {
        *c = reader.read_u16_le()? as i32;
    }
    Ok(coords)
}

fn read_points(reader: &mut BinaryReader<'_>) -> DecodeResult<Vec<Point>> {
    let mut points = Vec::with_capacity(reader.remaining() / 4);
    while !reader.is_empty() {
        let [x, y] = read_u16_coords::<2>(reader)?;
        points.push(Point::new(x, y));
    }
    Ok(points)
}

fn read_areas(block: &Block<'_>) -> DecodeResult<Vec<Area>> {
    let count = block.entry_count()?;
    let mut records = BinaryReader::new(block.records(count, AREA_RECORD_LEN)?);
    let mut areas = Vec::with_capacity(count as usize);
    while !records.is_empty() {
        areas.push(Area::from_coords(read_u16_coords(&mut records)?));
    }
    Ok(areas)
}

fn read_obstacles(block: &Block<'_>) -> DecodeResult<Vec<Obstacle>> {
    let count = block.entry_count()?;
    let mut records = BinaryReader::new(block.records(count, OBSTACLE_RECORD_LEN)?);
    let mut obstacles = Vec::with_capacity(count as usize);
    while !records.is_empty() {
        let [x, y] = read_u16_coords::<2>(&mut records)?;
        obstacles.push(Obstacle::new(x, y, records.read_u8()?));
    }
    Ok(obstacles)
}

/// Photo records: x, y, type, then reserved bytes (photo reference, confidence).
fn read_photo_obstacles(block: &Block<'_>) -> DecodeResult<Vec<Obstacle>> {
    let count = block.entry_count()?;
    let mut records = BinaryReader::new(block.records(count, PHOTO_OBSTACLE_RECORD_LEN)?);
    let mut obstacles = Vec::with_capacity(count as usize);
    while !records.is_empty() {
        let [x, y] = read_u16_coords::<2>(&mut records)?;
        let kind = ObstacleCatalog::normalize_photo_code(records.read_u16_le()?);
        records.skip(PHOTO_OBSTACLE_RECORD_LEN - 6)?;
        obstacles.push(Obstacle::new(x, y, kind));
    }
    Ok(obstacles)
}

/// Payload readers report offsets relative to the payload; make them absolute.
fn rebase(err: MapFormatError, base: usize) -> MapFormatError {
    match err {
        MapFormatError::CorruptLength { offset, declared, available } => MapFormatError::CorruptLength {
            offset: offset.saturating_add(base),
            declared,
            available,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::block::BlockReader;
    use crate::codec::writer::{u16_payload, BinaryWriter};

    fn decode(bytes: &[u8]) -> DecodeResult<MapDataBuilder> {
        let mut map = MapDataBuilder::default();
        for block in BlockReader::new(bytes, 0) {
            decode_block(&block?, &mut map)?;
        }
        Ok(map)
    }

    fn counted(block_type: u16, count: u16, payload: &[u8]) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.write_u16_le(block_type);
        w.write_u16_le(10);
        w.write_u32_le(payload.len() as u32);
        w.write_u16_le(count);
        w.write_bytes(payload);
        w.into_vec()
    }

    fn plain(block_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.write_u16_le(block_type);
        w.write_u16_le(8);
        w.write_u32_le(payload.len() as u32);
        w.write_bytes(payload);
        w.into_vec()
    }

    #[test]
    fn test_area_count_limits_records() {
        // payload holds two areas but the header declares one
        let payload = u16_payload(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
        let map = decode(&counted(9, 1, &payload)).unwrap();
        assert_eq!(map.no_go_areas, vec![Area::from_coords([1, 2, 3, 4, 5, 6, 7, 8])]);
    }

    #[test]
    fn test_area_count_exceeding_payload() {
        let payload = u16_payload(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let err = decode(&counted(19, 3, &payload)).unwrap_err();
        match err {
            MapFormatError::CorruptLength { offset, declared, available } => {
                assert_eq!(offset, 10);
                assert_eq!(declared, 48);
                assert_eq!(available, 16);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_image_payload_shorter_than_dimensions() {
        let mut w = BinaryWriter::new();
        w.write_u32_le(100);
        w.write_i32_le(0);
        w.write_i32_le(0);
        w.write_u32_le(10);
        w.write_u32_le(10);
        w.write_bytes(&[0; 50]);
        let err = decode(&plain(2, w.as_slice())).unwrap_err();
        assert!(matches!(err, MapFormatError::CorruptLength { declared: 100, available: 50, .. }));
    }

    #[test]
    fn test_photo_obstacle_wide_type_saturates() {
        let mut w = BinaryWriter::new();
        w.write_u16_le(7);
        w.write_u16_le(8);
        w.write_u16_le(0x0300);
        w.write_bytes(&[0; 22]);
        let map = decode(&counted(15, 1, w.as_slice())).unwrap();
        assert_eq!(map.obstacles, vec![Obstacle { x: 7, y: 8, kind: 255, type_label: None }]);
    }

    #[test]
    fn test_repeated_path_block_replaces() {
        let mut bytes = plain(3, &u16_payload(&[1, 1, 2, 2]));
        bytes.extend(plain(3, &u16_payload(&[9, 9])));
        let map = decode(&bytes).unwrap();
        assert_eq!(map.path, vec![Point::new(9, 9)]);
    }

    #[test]
    fn test_walls_need_entry_count() {
        let err = decode(&plain(10, &u16_payload(&[1, 2, 3, 4]))).unwrap_err();
        assert!(matches!(err, MapFormatError::InvalidBlock { block_type: 10, .. }));
    }

    #[test]
    fn test_partial_zone_is_truncation() {
        let err = decode(&plain(6, &u16_payload(&[1, 2, 3]))).unwrap_err();
        assert_eq!(err, MapFormatError::UnexpectedEof);
    }

    #[test]
    fn test_empty_counted_blocks() {
        let mut bytes = counted(13, 0, &[]);
        bytes.extend(counted(10, 0, &[]));
        let map = decode(&bytes).unwrap();
        assert!(map.obstacles.is_empty());
        assert!(map.virtual_walls.is_empty());
    }
}
