//! Robot vacuum map decoding and rendering
//!
//! Decodes the block-structured binary map a vacuum's firmware uploads
//! into a read-only [`MapData`] and renders it as a PNG.

pub mod codec;
pub mod error;
pub mod renderer;

pub use error::{Error, MapFormatError, Result};
pub use codec::{
    Area, AreaKind, MapData, MapHeader, Obstacle, ObstacleCatalog,
    PathKind, Point, RobotPosition, Wall, Zone,
};
pub use renderer::{MapRenderer, PngCompression, RenderConfig};

/// Decode an uncompressed map buffer.
pub fn parse(data: &[u8]) -> std::result::Result<MapData, MapFormatError> {
    MapData::parse(data)
}

/// Decode a map file, inflating it first when it is gzip-compressed.
pub fn parse_map_file(data: &[u8]) -> std::result::Result<MapData, MapFormatError> {
    codec::parse_map_file(data)
}

/// Render a map as PNG bytes with the default [`RenderConfig`].
pub fn render_as_png(map: &MapData) -> Result<Vec<u8>> {
    MapRenderer::default().render_png(map)
}

pub fn render_as_png_with(map: &MapData, config: &RenderConfig) -> Result<Vec<u8>> {
    MapRenderer::new(config)?.render_png(map)
}
