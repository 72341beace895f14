//! Clipping of overlay geometry to the canvas.
//!
//! Firmware offsets can put shapes arbitrarily far off-canvas, and the
//! drawing primitives walk every pixel of a line, so everything is clipped
//! before it is handed to them.

type Pt = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Inclusive pixel-space clip rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width.saturating_sub(1) as f64,
            max_y: height.saturating_sub(1) as f64,
        }
    }

    pub fn contains(&self, p: Pt) -> bool {
        p.0 >= self.min_x && p.0 <= self.max_x && p.1 >= self.min_y && p.1 <= self.max_y
    }

    /// Liang-Barsky segment clipping. `None` when nothing is visible.
    pub fn clip_segment(&self, a: Pt, b: Pt) -> Option<(Pt, Pt)> {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        let bounds = [
            (-dx, a.0 - self.min_x),
            (dx, self.max_x - a.0),
            (-dy, a.1 - self.min_y),
            (dy, self.max_y - a.1),
        ];
        for (p, q) in bounds {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
    }

    /// Sutherland-Hodgman polygon clipping. May return fewer than three
    /// vertices when the polygon misses the canvas.
    pub fn clip_polygon(&self, poly: &[Pt]) -> Vec<Pt> {
        let mut out = poly.to_vec();
        for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
            let Some(&last) = out.last() else { break };
            let input = std::mem::take(&mut out);
            let mut prev = last;
            for &cur in &input {
                let cur_in = self.inside(edge, cur);
                if cur_in != self.inside(edge, prev) {
                    out.push(self.intersect(edge, prev, cur));
                }
                if cur_in {
                    out.push(cur);
                }
                prev = cur;
            }
        }
        out
    }

    fn inside(&self, edge: Edge, p: Pt) -> bool {
        match edge {
            Edge::Left => p.0 >= self.min_x,
            Edge::Right => p.0 <= self.max_x,
            Edge::Top => p.1 >= self.min_y,
            Edge::Bottom => p.1 <= self.max_y,
        }
    }

    fn intersect(&self, edge: Edge, a: Pt, b: Pt) -> Pt {
        match edge {
            Edge::Left | Edge::Right => {
                let x = if edge == Edge::Left { self.min_x } else { self.max_x };
                let t = (x - a.0) / (b.0 - a.0);
                (x, a.1 + t * (b.1 - a.1))
            }
            Edge::Top | Edge::Bottom => {
                let y = if edge == Edge::Top { self.min_y } else { self.max_y };
                let t = (y - a.1) / (b.1 - a.1);
                (a.0 + t * (b.0 - a.0), y)
            }
        }
    }
}
