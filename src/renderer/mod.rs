//! Rasterization of a decoded map into a PNG.
//!
//! The pipeline is colorize → composite overlays → scale → encode. Every
//! stage works on a canvas owned by the call, so rendering is a pure
//! function of the map and the config.

pub mod clip;
pub mod config;
pub mod overlay;
pub mod palette;
pub mod png;
pub mod scale;
pub mod transform;

pub use config::{PngCompression, RenderConfig};
pub use overlay::OverlayCompositor;
pub use palette::{Colorizer, Occupancy};
pub use png::PngEncoder;
pub use scale::CanvasScaler;
pub use transform::PixelTransform;

use image::RgbaImage;
use tracing::debug;

use crate::codec::MapData;
use crate::error::{MapFormatError, Result};

pub struct MapRenderer {
    colorizer: Colorizer,
    scaler: CanvasScaler,
    encoder: PngEncoder,
    room_colors: bool,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self {
            colorizer: Colorizer::default(),
            scaler: CanvasScaler::default(),
            encoder: PngEncoder::default(),
            room_colors: true,
        }
    }
}

impl MapRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            colorizer: Colorizer::new(config.draw_room_colors),
            scaler: CanvasScaler::new(config.min_dimension, config.max_dimension),
            encoder: PngEncoder::new(config.compression),
            room_colors: config.draw_room_colors,
        })
    }

    pub fn render_png(&self, map: &MapData) -> Result<Vec<u8>> {
        let canvas = self.render(map)?;
        let png = self.encoder.encode(canvas)?;
        debug!(bytes = png.len(), "map rendered");
        Ok(png)
    }

    /// Colorized, composited and scaled canvas, before encoding.
    pub fn render(&self, map: &MapData) -> Result<RgbaImage> {
        let mut canvas = self.colorize(map)?;
        let path_on_rooms = self.room_colors
            && map.image_data().iter().any(|&code| matches!(Occupancy::classify(code), Occupancy::Room(_)));
        OverlayCompositor::new(map, path_on_rooms).composite(&mut canvas, map)?;
        Ok(self.scaler.scale(canvas))
    }

    /// Base canvas from the occupancy bitmap, rows flipped into canvas space.
    pub fn colorize(&self, map: &MapData) -> Result<RgbaImage> {
        let (width, height) = (map.image_width(), map.image_height());
        let pixels = map.image_data();
        let expected = width as usize * height as usize;
        if pixels.len() != expected || expected == 0 {
            return Err(MapFormatError::InvalidDimensions { width, height }.into());
        }

        let transform = PixelTransform::for_map(map);
        let mut canvas = RgbaImage::new(width, height);
        for (i, &code) in pixels.iter().enumerate() {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            let (cx, cy) = transform.bitmap_to_canvas(x, y);
            canvas.put_pixel(cx, cy, self.colorizer.colorize(code));
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::map_data::{ImageBlock, MapDataBuilder};
    use crate::codec::writer::{image_payload, u16_payload, u32_payload, BinaryWriter, BlockWriter};
    use crate::error::Error;
    use palette::{COLOR_CHARGER, COLOR_OBSTACLE, COLOR_ROBOT};

    fn map_with_markers() -> Vec<u8> {
        let pixels: Vec<u8> = (0..1200 * 1200).map(|i| if i % 7 == 0 { 0x01 } else { 0xFF }).collect();
        let mut obstacle = BinaryWriter::new();
        obstacle.write_u16_le(1500);
        obstacle.write_u16_le(500);
        obstacle.write_u8(2);

        let mut writer = BlockWriter::new();
        writer.block(2, &image_payload(0, 0, 1200, 1200, &pixels));
        writer.block(8, &u32_payload(&[500, 500, 0]));
        writer.block(1, &u32_payload(&[1000, 500]));
        writer.counted_block(13, 1, obstacle.as_slice());
        writer.finish()
    }

    fn decode(png: &[u8]) -> image::RgbImage {
        image::load_from_memory(png).unwrap().to_rgb8()
    }

    fn rgb(c: image::Rgba<u8>) -> [u8; 3] {
        [c[0], c[1], c[2]]
    }

    #[test]
    fn test_marker_colors_in_png() {
        let map = MapData::parse(&map_with_markers()).unwrap();
        let image = decode(&MapRenderer::default().render_png(&map).unwrap());
        assert_eq!(image.dimensions(), (1200, 1200));
        assert_eq!(image.get_pixel(9, 1190).0, rgb(COLOR_ROBOT));
        assert_eq!(image.get_pixel(19, 1190).0, rgb(COLOR_CHARGER));
        assert_eq!(image.get_pixel(29, 1190).0, rgb(COLOR_OBSTACLE));
    }

    #[test]
    fn test_render_is_deterministic() {
        let bytes = map_with_markers();
        let first = MapRenderer::default().render_png(&MapData::parse(&bytes).unwrap()).unwrap();
        let second = MapRenderer::default().render_png(&MapData::parse(&bytes).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_small_map_upscaled_and_colored() {
        let pixels: Vec<u8> = (0..223 * 254).map(|i| [0x00, 0x01, 0xFF, 0x0F][i % 4]).collect();
        let mut writer = BlockWriter::new();
        writer.block(2, &image_payload(0, 0, 223, 254, &pixels));
        writer.block(3, &u16_payload(&[100, 100, 5000, 5000]));
        let map = MapData::parse(&writer.finish()).unwrap();

        let png = MapRenderer::default().render_png(&map).unwrap();
        assert_eq!(png[..4], [0x89, 0x50, 0x4E, 0x47]);
        let image = decode(&png);
        assert_eq!(image.dimensions(), (899, 1024));
        assert!(image.pixels().any(|p| p[0] != p[1] || p[1] != p[2]));
    }

    #[test]
    fn test_large_map_downscaled() {
        let mut writer = BlockWriter::new();
        writer.block(2, &image_payload(0, 0, 3000, 1500, &vec![0xFF; 3000 * 1500]));
        let map = MapData::parse(&writer.finish()).unwrap();
        let canvas = MapRenderer::default().render(&map).unwrap();
        assert_eq!(canvas.dimensions(), (2048, 1024));
    }

    #[test]
    fn test_bitmap_rows_flipped() {
        let mut writer = BlockWriter::new();
        writer.block(2, &image_payload(0, 0, 2, 2, &[0x00, 0x00, 0x01, 0xFF]));
        let map = MapData::parse(&writer.finish()).unwrap();
        let canvas = MapRenderer::default().colorize(&map).unwrap();
        assert_eq!(*canvas.get_pixel(0, 0), palette::COLOR_MAP_WALL);
        assert_eq!(*canvas.get_pixel(1, 0), palette::COLOR_MAP_INSIDE);
        assert_eq!(*canvas.get_pixel(0, 1), palette::COLOR_MAP_OUTSIDE);
    }

    #[test]
    fn test_config_band_applied() {
        let mut writer = BlockWriter::new();
        writer.block(2, &image_payload(0, 0, 10, 5, &[0xFF; 50]));
        let map = MapData::parse(&writer.finish()).unwrap();
        let config = RenderConfig { min_dimension: 40, max_dimension: 80, ..Default::default() };
        let canvas = MapRenderer::new(&config).unwrap().render(&map).unwrap();
        assert_eq!(canvas.dimensions(), (40, 20));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig { min_dimension: 10, max_dimension: 5, ..Default::default() };
        assert!(matches!(MapRenderer::new(&config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_short_image_data_rejected() {
        let image = ImageBlock { top: 0, left: 0, width: 3, height: 2, pixels: vec![0xFF; 5] };
        let map = MapDataBuilder { image: Some(image), ..Default::default() }.finish().unwrap();
        assert!(matches!(
            MapRenderer::default().render(&map),
            Err(Error::Format(MapFormatError::InvalidDimensions { width: 3, height: 2 }))
        ));
    }
}
