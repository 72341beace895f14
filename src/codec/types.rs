use serde::Serialize;

use super::obstacle::ObstacleCatalog;

/// Firmware map units per bitmap pixel
pub const MAP_UNITS_PER_PIXEL: f64 = 50.0;

/// A position in map units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Robot pose: position in map units plus heading in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RobotPosition {
    pub x: i32,
    pub y: i32,
    pub angle: i32,
}

impl RobotPosition {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Axis-aligned rectangle given by two opposite corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Zone {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

/// Virtual wall segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Wall {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Wall {
    pub fn endpoints(&self) -> [Point; 2] {
        [Point::new(self.x0, self.y0), Point::new(self.x1, self.y1)]
    }
}

/// Quadrilateral in firmware vertex order; not necessarily axis-aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Area {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub x3: i32,
    pub y3: i32,
}

impl Area {
    pub fn from_coords(c: [i32; 8]) -> Self {
        Self { x0: c[0], y0: c[1], x1: c[2], y1: c[3], x2: c[4], y2: c[5], x3: c[6], y3: c[7] }
    }

    pub fn vertices(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x3, self.y3),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Obstacle {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: u8,
    pub type_label: Option<String>,
}

impl Obstacle {
    /// Build an obstacle, resolving its label through the catalog.
    pub fn new(x: i32, y: i32, kind: u8) -> Self {
        Self {
            x,
            y,
            kind,
            type_label: ObstacleCatalog::label(kind).map(str::to_owned),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Which kind of forbidden area a polygon belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    NoGo,
    MopForbidden,
    CarpetForbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Travelled,
    Goto,
    Predicted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_vertex_order() {
        let area = Area::from_coords([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            area.vertices(),
            [Point::new(1, 2), Point::new(3, 4), Point::new(5, 6), Point::new(7, 8)]
        );
    }

    #[test]
    fn test_obstacle_label_resolution() {
        assert_eq!(Obstacle::new(0, 0, 0).type_label.as_deref(), Some("cable"));
        assert_eq!(Obstacle::new(0, 0, 255).type_label, None);
    }

    #[test]
    fn test_obstacle_serializes_type_field() {
        let json = serde_json::to_value(Obstacle::new(10, 20, 2)).unwrap();
        assert_eq!(json["type"], 2);
        assert_eq!(json["type_label"], "shoes");
    }
}
