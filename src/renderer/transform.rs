use crate::codec::{MapData, Point, MAP_UNITS_PER_PIXEL};

/// Map units → canvas pixels for one map, before any rescaling.
///
/// ```text
/// px = canvas_width - 1 - round(image_width + left - x / 50)
/// py = round(image_height - (y / 50 - top))
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransform {
    pub image_width: u32,
    pub image_height: u32,
    pub top: i32,
    pub left: i32,
    pub canvas_width: u32,
}

impl PixelTransform {
    pub fn for_map(map: &MapData) -> Self {
        Self {
            image_width: map.image_width(),
            image_height: map.image_height(),
            top: map.top(),
            left: map.left(),
            canvas_width: map.image_width(),
        }
    }

    pub fn to_pixel(&self, p: Point) -> (i32, i32) {
        let mx = p.x as f64 / MAP_UNITS_PER_PIXEL;
        let my = p.y as f64 / MAP_UNITS_PER_PIXEL;
        let px = self.canvas_width as f64 - 1.0 - (self.image_width as f64 + self.left as f64 - mx).round();
        let py = (self.image_height as f64 - (my - self.top as f64)).round();
        // saturating casts keep absurd firmware offsets far off-canvas
        (px as i32, py as i32)
    }

    /// Canvas position of bitmap pixel `(x, y)`: rows are flipped so that
    /// the bitmap lines up with `to_pixel`.
    pub fn bitmap_to_canvas(&self, x: u32, y: u32) -> (u32, u32) {
        (x, self.image_height - 1 - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(width: u32, height: u32, top: i32, left: i32) -> PixelTransform {
        PixelTransform { image_width: width, image_height: height, top, left, canvas_width: width }
    }

    #[test]
    fn test_marker_positions() {
        let t = transform(1200, 1200, 0, 0);
        assert_eq!(t.to_pixel(Point::new(500, 500)), (9, 1190));
        assert_eq!(t.to_pixel(Point::new(1000, 500)), (19, 1190));
        assert_eq!(t.to_pixel(Point::new(1500, 500)), (29, 1190));
    }

    #[test]
    fn test_offsets() {
        let t = transform(100, 80, 400, 500);
        // x: 99 - round(100 + 500 - 520) = 19, y: round(80 - (410 - 400)) = 70
        assert_eq!(t.to_pixel(Point::new(26000, 20500)), (19, 70));
    }

    #[test]
    fn test_rounding() {
        let t = transform(10, 10, 0, 0);
        // x / 50 = 2.6 → round(7.4) = 7 → 9 - 7 = 2
        assert_eq!(t.to_pixel(Point::new(130, 0)).0, 2);
        // y / 50 = 2.5 → round(7.5) = 8
        assert_eq!(t.to_pixel(Point::new(0, 125)).1, 8);
    }

    #[test]
    fn test_extreme_offsets_saturate() {
        let t = transform(10, 10, i32::MIN, i32::MAX);
        let (x, y) = t.to_pixel(Point::new(0, 0));
        assert!(x < -1_000_000_000);
        assert!(y < -1_000_000_000);
    }

    #[test]
    fn test_bitmap_rows_flip() {
        let t = transform(4, 3, 0, 0);
        assert_eq!(t.bitmap_to_canvas(0, 0), (0, 2));
        assert_eq!(t.bitmap_to_canvas(3, 2), (3, 0));
    }
}
