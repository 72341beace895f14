use std::collections::HashMap;
use std::sync::OnceLock;

/// Type codes reported by the obstacle-avoidance camera. Photo records use
/// their own code space for a few types, listed as aliases at the end.
const OBSTACLE_TYPES: &[(u8, &str)] = &[
    (0, "cable"),
    (1, "pet waste"),
    (2, "shoes"),
    (3, "poop"),
    (4, "sock"),
    (5, "extension cord"),
    (6, "towel"),
    (7, "dustpan"),
    (8, "pet bowl"),
    (9, "weighing scale"),
    (10, "clothes"),
    (11, "charging dock"),
    (12, "pedestal"),
    (13, "fabric/paper balls"),
    (14, "furniture with a crossbar"),
    (15, "sofa"),
    (16, "bed"),
    (17, "cabinet"),
    (18, "table leg"),
    (19, "chair leg"),
    (20, "curtain"),
    (21, "rug tassels"),
    (22, "toy"),
    (23, "bag"),
    (24, "bottle"),
    (25, "liquid stain"),
    (26, "pet"),
    (27, "door sill"),
    (28, "stairs"),
    (29, "mirror"),
    (30, "glass wall"),
    (31, "power strip"),
    (32, "fan base"),
    (33, "plant pot"),
    (34, "trash can"),
    (35, "box"),
    (48, "cable"),
    (49, "shoes"),
    (50, "poop"),
    (51, "extension cord"),
    (52, "weighing scale"),
    (53, "clothes"),
];

static CATALOG: OnceLock<HashMap<u8, &'static str>> = OnceLock::new();

/// Read-only lookup from obstacle type code to display label
pub struct ObstacleCatalog;

impl ObstacleCatalog {
    fn table() -> &'static HashMap<u8, &'static str> {
        CATALOG.get_or_init(|| OBSTACLE_TYPES.iter().copied().collect())
    }

    pub fn label(code: u8) -> Option<&'static str> {
        Self::table().get(&code).copied()
    }

    /// Narrow the 16-bit type field of a photo record to a catalog code.
    /// Values that do not fit saturate to 255, which has no label.
    pub fn normalize_photo_code(raw: u16) -> u8 {
        u8::try_from(raw).unwrap_or(u8::MAX)
    }

    pub fn len() -> usize {
        Self::table().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(ObstacleCatalog::label(0), Some("cable"));
        assert_eq!(ObstacleCatalog::label(2), Some("shoes"));
        assert_eq!(ObstacleCatalog::label(12), Some("pedestal"));
        assert_eq!(ObstacleCatalog::label(13), Some("fabric/paper balls"));
        assert_eq!(ObstacleCatalog::label(14), Some("furniture with a crossbar"));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(ObstacleCatalog::label(255), None);
        assert_eq!(ObstacleCatalog::label(47), None);
        assert_eq!(ObstacleCatalog::label(200), None);
    }

    #[test]
    fn test_every_entry_has_a_label() {
        assert_eq!(ObstacleCatalog::len(), OBSTACLE_TYPES.len());
        for &(code, _) in OBSTACLE_TYPES {
            assert!(!ObstacleCatalog::label(code).unwrap().is_empty());
        }
    }

    #[test]
    fn test_photo_code_normalization() {
        assert_eq!(ObstacleCatalog::normalize_photo_code(48), 48);
        assert_eq!(ObstacleCatalog::label(ObstacleCatalog::normalize_photo_code(48)), Some("cable"));
        assert_eq!(ObstacleCatalog::normalize_photo_code(0x1234), 255);
    }
}
