use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

/// Rescales a canvas so its larger side lands inside
/// `[min_dimension, max_dimension]`, keeping the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasScaler {
    pub min_dimension: u32,
    pub max_dimension: u32,
}

impl Default for CanvasScaler {
    fn default() -> Self {
        Self { min_dimension: 1024, max_dimension: 2048 }
    }
}

impl CanvasScaler {
    pub fn new(min_dimension: u32, max_dimension: u32) -> Self {
        Self { min_dimension, max_dimension }
    }

    /// Output size for a `width x height` canvas. The larger side is set to
    /// the band edge exactly; the other side is scaled by the same factor and
    /// rounded on its own.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let longest = width.max(height);
        let target = if longest < self.min_dimension {
            self.min_dimension
        } else if longest > self.max_dimension {
            self.max_dimension
        } else {
            return (width, height);
        };

        let factor = target as f64 / longest as f64;
        let scale = |side: u32| {
            if side == longest {
                target
            } else {
                ((side as f64 * factor).round() as u32).max(1)
            }
        };
        (scale(width), scale(height))
    }

    pub fn scale(&self, canvas: RgbaImage) -> RgbaImage {
        let (width, height) = canvas.dimensions();
        let (new_width, new_height) = self.target_size(width, height);
        if (new_width, new_height) == (width, height) {
            return canvas;
        }
        let factor = new_width.max(new_height) as f64 / width.max(height) as f64;
        debug!(width, height, new_width, new_height, factor, "scaling canvas");
        imageops::resize(&canvas, new_width, new_height, FilterType::Nearest)
    }
}
