use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut, Blend};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect;
use tracing::trace;

use super::clip::ClipRect;
use super::palette::*;
use super::transform::PixelTransform;
use crate::codec::{AreaKind, MapData, Obstacle, PathKind, Point};
use crate::error::{Error, Result};

pub const CHARGER_RADIUS: i32 = 3;
pub const ROBOT_RADIUS: i32 = 3;
pub const OBSTACLE_RADIUS: i32 = 2;
/// Distance of the heading dot from the robot center
const HEADING_OFFSET: f64 = 2.0;
/// Goto target triangle: tip on the target, base this many pixels above
const GOTO_HEIGHT: i32 = 5;
const GOTO_HALF_WIDTH: i32 = 2;

/// Draws every overlay of a map onto its colorized base canvas, back to
/// front: mask tints, forbidden areas, zones, walls, paths, markers.
pub struct OverlayCompositor {
    transform: PixelTransform,
    clip: ClipRect,
    width: u32,
    height: u32,
    path_on_rooms: bool,
}

impl OverlayCompositor {
    /// `path_on_rooms` switches the travelled path to its high-contrast
    /// color for maps drawn with room colors.
    pub fn new(map: &MapData, path_on_rooms: bool) -> Self {
        let (width, height) = (map.image_width(), map.image_height());
        Self {
            transform: PixelTransform::for_map(map),
            clip: ClipRect::for_canvas(width, height),
            width,
            height,
            path_on_rooms,
        }
    }

    pub fn composite(&self, canvas: &mut RgbaImage, map: &MapData) -> Result<()> {
        let (actual_width, actual_height) = canvas.dimensions();
        if (actual_width, actual_height) != (self.width, self.height) {
            return Err(Error::CanvasSize { width: self.width, height: self.height, actual_width, actual_height });
        }

        if let Some(mask) = map.carpet_map_mask() {
            self.tint_mask(canvas, "carpet map", mask, COLOR_CARPET_TINT)?;
        }
        if let Some(mask) = map.mop_path_mask() {
            self.tint_mask(canvas, "mop path", mask, COLOR_MOP_PATH_TINT)?;
        }

        for (kind, fill, outline) in [
            (AreaKind::NoGo, COLOR_NO_GO_FILL, COLOR_NO_GO_OUTLINE),
            (AreaKind::MopForbidden, COLOR_MOP_FORBIDDEN_FILL, COLOR_MOP_FORBIDDEN_OUTLINE),
            (AreaKind::CarpetForbidden, COLOR_CARPET_FORBIDDEN_FILL, COLOR_CARPET_FORBIDDEN_OUTLINE),
        ] {
            for area in map.areas(kind) {
                self.draw_area(canvas, &area.vertices(), fill, outline);
            }
        }

        for zone in map.cleaned_zones() {
            self.draw_zone(canvas, Point::new(zone.x0, zone.y0), Point::new(zone.x1, zone.y1));
        }

        for wall in map.virtual_walls() {
            let [a, b] = wall.endpoints();
            self.draw_segment(canvas, a, b, COLOR_VIRTUAL_WALL);
        }

        let travelled = if self.path_on_rooms { COLOR_PATH_ON_ROOMS } else { COLOR_PATH };
        for (kind, color) in [
            (PathKind::Travelled, travelled),
            (PathKind::Goto, COLOR_GOTO_PATH),
            (PathKind::Predicted, COLOR_PREDICTED_PATH),
        ] {
            self.draw_path(canvas, map.path(kind), color);
        }

        self.draw_markers(canvas, map);
        Ok(())
    }

    fn tint_mask(&self, canvas: &mut RgbaImage, name: &'static str, mask: &[u8], tint: Rgba<u8>) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if mask.len() != expected {
            return Err(Error::MaskSizeMismatch { mask: name, expected, actual: mask.len() });
        }
        let mut tinted = 0usize;
        for (i, &flag) in mask.iter().enumerate() {
            if flag == 0 {
                continue;
            }
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            let (cx, cy) = self.transform.bitmap_to_canvas(x, y);
            canvas.get_pixel_mut(cx, cy).blend(&tint);
            tinted += 1;
        }
        trace!(mask = name, tinted, "mask tint");
        Ok(())
    }

    fn pixel(&self, p: Point) -> (f64, f64) {
        let (x, y) = self.transform.to_pixel(p);
        (x as f64, y as f64)
    }

    fn draw_area(&self, canvas: &mut RgbaImage, vertices: &[Point; 4], fill: Rgba<u8>, outline: Rgba<u8>) {
        let corners: Vec<_> = vertices.iter().map(|&v| self.pixel(v)).collect();
        let polygon = polygon_points(&self.clip.clip_polygon(&corners));
        if polygon.len() >= 3 {
            let mut blend = Blend(std::mem::take(canvas));
            draw_polygon_mut(&mut blend, &polygon, fill);
            *canvas = blend.0;
        }
        for (i, &a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            self.draw_segment(canvas, a, b, outline);
        }
    }

    fn draw_zone(&self, canvas: &mut RgbaImage, a: Point, b: Point) {
        let (ax, ay) = self.pixel(a);
        let (bx, by) = self.pixel(b);
        let x0 = ax.min(bx).max(self.clip.min_x);
        let x1 = ax.max(bx).min(self.clip.max_x);
        let y0 = ay.min(by).max(self.clip.min_y);
        let y1 = ay.max(by).min(self.clip.max_y);
        if x0 > x1 || y0 > y1 {
            return;
        }
        let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32 + 1, (y1 - y0) as u32 + 1);
        let mut blend = Blend(std::mem::take(canvas));
        draw_filled_rect_mut(&mut blend, rect, COLOR_ZONES);
        *canvas = blend.0;
    }

    fn draw_segment(&self, canvas: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>) {
        if let Some((start, end)) = self.clip.clip_segment(self.pixel(a), self.pixel(b)) {
            draw_line_segment_mut(
                canvas,
                (start.0 as f32, start.1 as f32),
                (end.0 as f32, end.1 as f32),
                color,
            );
        }
    }

    fn draw_path(&self, canvas: &mut RgbaImage, points: &[Point], color: Rgba<u8>) {
        for pair in points.windows(2) {
            self.draw_segment(canvas, pair[0], pair[1], color);
        }
    }

    fn draw_markers(&self, canvas: &mut RgbaImage, map: &MapData) {
        if let Some(charger) = map.charger() {
            self.draw_dot(canvas, charger, CHARGER_RADIUS, COLOR_CHARGER);
        }

        if let Some(robot) = map.robot() {
            if let Some((x, y)) = self.draw_dot(canvas, robot.point(), ROBOT_RADIUS, COLOR_ROBOT) {
                let (dx, dy) = heading_offset(robot.angle);
                self.put_pixel(canvas, x + dx, y + dy, COLOR_ROBOT_HEADING);
            }
        }

        if let Some(target) = map.goto_target() {
            let (x, y) = self.transform.to_pixel(target);
            if self.near_canvas(x, y, GOTO_HEIGHT) {
                let triangle = [
                    PixelPoint::new(x, y),
                    PixelPoint::new(x - GOTO_HALF_WIDTH, y - GOTO_HEIGHT),
                    PixelPoint::new(x + GOTO_HALF_WIDTH, y - GOTO_HEIGHT),
                ];
                draw_polygon_mut(canvas, &triangle, COLOR_GOTO_TARGET);
            }
        }

        self.draw_obstacles(canvas, map.obstacles(), COLOR_OBSTACLE);
        self.draw_obstacles(canvas, map.ignored_obstacles(), COLOR_IGNORED_OBSTACLE);
    }

    fn draw_obstacles(&self, canvas: &mut RgbaImage, obstacles: &[Obstacle], color: Rgba<u8>) {
        for obstacle in obstacles {
            self.draw_dot(canvas, obstacle.point(), OBSTACLE_RADIUS, color);
        }
    }

    /// Filled circle centered on `p`; returns the center when it was drawn.
    fn draw_dot(&self, canvas: &mut RgbaImage, p: Point, radius: i32, color: Rgba<u8>) -> Option<(i32, i32)> {
        let (x, y) = self.transform.to_pixel(p);
        if !self.near_canvas(x, y, radius) {
            return None;
        }
        draw_filled_circle_mut(canvas, (x, y), radius, color);
        Some((x, y))
    }

    fn put_pixel(&self, canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Whether a glyph of the given extent around `(x, y)` can touch the canvas
    fn near_canvas(&self, x: i32, y: i32, extent: i32) -> bool {
        let (x, y, extent) = (x as i64, y as i64, extent as i64);
        x >= -extent && y >= -extent && x < self.width as i64 + extent && y < self.height as i64 + extent
    }
}

/// Pixel offset of the heading dot for a robot angle in degrees. Map x is
/// mirrored on the canvas and map y grows upwards.
fn heading_offset(angle: i32) -> (i32, i32) {
    let radians = (angle as f64).to_radians();
    let dx = -(HEADING_OFFSET * radians.cos()).round() as i32;
    let dy = -(HEADING_OFFSET * radians.sin()).round() as i32;
    (dx, dy)
}

/// Rounds clipped vertices and drops repeats so the polygon is closed
/// implicitly and has no zero-length edges.
fn polygon_points(vertices: &[(f64, f64)]) -> Vec<PixelPoint<i32>> {
    let mut points: Vec<PixelPoint<i32>> = Vec::with_capacity(vertices.len());
    for &(x, y) in vertices {
        let p = PixelPoint::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}
