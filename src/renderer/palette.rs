//! Colors for the occupancy bitmap and every overlay.

use image::Rgba;

pub const COLOR_MAP_OUTSIDE: Rgba<u8> = Rgba([19, 87, 148, 255]);
pub const COLOR_MAP_WALL: Rgba<u8> = Rgba([100, 196, 254, 255]);
pub const COLOR_MAP_INSIDE: Rgba<u8> = Rgba([32, 115, 185, 255]);
pub const COLOR_SCAN: Rgba<u8> = Rgba([0xDF, 0xDF, 0xDF, 255]);
pub const COLOR_GREY_WALL: Rgba<u8> = Rgba([93, 109, 126, 255]);
pub const COLOR_OBSTACLE_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const COLOR_OTHER: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub const ROOM_COLORS: [Rgba<u8>; 16] = [
    Rgba([240, 178, 122, 255]),
    Rgba([133, 193, 233, 255]),
    Rgba([217, 136, 128, 255]),
    Rgba([52, 152, 219, 255]),
    Rgba([205, 97, 85, 255]),
    Rgba([243, 156, 18, 255]),
    Rgba([88, 214, 141, 255]),
    Rgba([245, 176, 65, 255]),
    Rgba([0xFC, 0xD4, 0x51, 255]),
    Rgba([72, 201, 176, 255]),
    Rgba([84, 153, 199, 255]),
    Rgba([133, 193, 233, 255]),
    Rgba([245, 176, 65, 255]),
    Rgba([82, 190, 128, 255]),
    Rgba([72, 201, 176, 255]),
    Rgba([165, 105, 189, 255]),
];

// translucent overlays
pub const COLOR_CARPET_TINT: Rgba<u8> = Rgba([160, 128, 96, 96]);
pub const COLOR_MOP_PATH_TINT: Rgba<u8> = Rgba([200, 235, 255, 96]);
pub const COLOR_ZONES: Rgba<u8> = Rgba([0xAD, 0xD8, 0xFF, 0x8F]);
pub const COLOR_NO_GO_FILL: Rgba<u8> = Rgba([255, 33, 55, 127]);
pub const COLOR_MOP_FORBIDDEN_FILL: Rgba<u8> = Rgba([163, 73, 164, 127]);
pub const COLOR_CARPET_FORBIDDEN_FILL: Rgba<u8> = Rgba([255, 140, 0, 127]);

// opaque overlays
pub const COLOR_NO_GO_OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const COLOR_MOP_FORBIDDEN_OUTLINE: Rgba<u8> = Rgba([200, 120, 255, 255]);
pub const COLOR_CARPET_FORBIDDEN_OUTLINE: Rgba<u8> = Rgba([255, 200, 0, 255]);
pub const COLOR_VIRTUAL_WALL: Rgba<u8> = Rgba([230, 0, 30, 255]);
pub const COLOR_PATH: Rgba<u8> = Rgba([147, 194, 238, 255]);
pub const COLOR_PATH_ON_ROOMS: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const COLOR_GOTO_PATH: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const COLOR_PREDICTED_PATH: Rgba<u8> = Rgba([255, 255, 0, 255]);

// markers
pub const COLOR_CHARGER: Rgba<u8> = Rgba([0x66, 0xFE, 0xDA, 255]);
pub const COLOR_ROBOT: Rgba<u8> = Rgba([75, 235, 149, 255]);
pub const COLOR_ROBOT_HEADING: Rgba<u8> = Rgba([20, 90, 50, 255]);
pub const COLOR_GOTO_TARGET: Rgba<u8> = Rgba([255, 230, 0, 255]);
pub const COLOR_OBSTACLE: Rgba<u8> = Rgba([255, 60, 200, 255]);
pub const COLOR_IGNORED_OBSTACLE: Rgba<u8> = Rgba([150, 150, 170, 255]);

/// Classification of a raw occupancy byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Outside,
    Wall,
    Floor,
    Scanned,
    GreyWall,
    Obstacle,
    /// Floor belonging to a segmented room, with its palette index
    Room(u8),
    Other,
}

impl Occupancy {
    pub fn classify(code: u8) -> Self {
        match code {
            0x00 => Self::Outside,
            0x01 => Self::Wall,
            0xFF => Self::Floor,
            0x07 => Self::Scanned,
            _ => match code & 0x07 {
                0 => Self::GreyWall,
                1 => Self::Obstacle,
                7 => Self::Room((code >> 3) / 2),
                _ => Self::Other,
            },
        }
    }
}

/// Maps raw occupancy bytes to pixel colors.
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    room_colors: bool,
}

impl Colorizer {
    pub fn new(room_colors: bool) -> Self {
        Self { room_colors }
    }

    pub fn colorize(&self, code: u8) -> Rgba<u8> {
        match Occupancy::classify(code) {
            Occupancy::Outside => COLOR_MAP_OUTSIDE,
            Occupancy::Wall => COLOR_MAP_WALL,
            Occupancy::Floor => COLOR_MAP_INSIDE,
            Occupancy::Scanned => COLOR_SCAN,
            Occupancy::GreyWall => COLOR_GREY_WALL,
            Occupancy::Obstacle => COLOR_OBSTACLE_PIXEL,
            Occupancy::Room(index) if self.room_colors => ROOM_COLORS[index as usize % ROOM_COLORS.len()],
            Occupancy::Room(_) => COLOR_MAP_INSIDE,
            Occupancy::Other => COLOR_OTHER,
        }
    }
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_grey(c: Rgba<u8>) -> bool {
        c[0] == c[1] && c[1] == c[2]
    }

    #[test]
    fn test_classify_fixed_codes() {
        assert_eq!(Occupancy::classify(0x00), Occupancy::Outside);
        assert_eq!(Occupancy::classify(0x01), Occupancy::Wall);
        assert_eq!(Occupancy::classify(0xFF), Occupancy::Floor);
        assert_eq!(Occupancy::classify(0x07), Occupancy::Scanned);
    }

    #[test]
    fn test_classify_bit_fields() {
        assert_eq!(Occupancy::classify(0x08), Occupancy::GreyWall);
        assert_eq!(Occupancy::classify(0x09), Occupancy::Obstacle);
        assert_eq!(Occupancy::classify(0x0F), Occupancy::Room(0));
        assert_eq!(Occupancy::classify(0x1F), Occupancy::Room(1));
        assert_eq!(Occupancy::classify(0xF7), Occupancy::Room(15));
        assert_eq!(Occupancy::classify(0x0A), Occupancy::Other);
    }

    #[test]
    fn test_main_classes_are_distinct_and_colored() {
        let colorizer = Colorizer::default();
        let outside = colorizer.colorize(0x00);
        let wall = colorizer.colorize(0x01);
        let floor = colorizer.colorize(0xFF);
        assert_ne!(outside, wall);
        assert_ne!(wall, floor);
        assert_ne!(outside, floor);
        assert!(!is_grey(outside) && !is_grey(wall) && !is_grey(floor));
    }

    #[test]
    fn test_room_colors_toggle() {
        assert_eq!(Colorizer::new(true).colorize(0x17), ROOM_COLORS[1]);
        assert_eq!(Colorizer::new(false).colorize(0x17), COLOR_MAP_INSIDE);
    }

    #[test]
    fn test_colorize_is_total() {
        let colorizer = Colorizer::default();
        for code in 0..=u8::MAX {
            assert_eq!(colorizer.colorize(code)[3], 255);
        }
    }
}
