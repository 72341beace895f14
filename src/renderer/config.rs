use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Knobs for [`MapRenderer`](super::MapRenderer). Every field has a default
/// so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Lower edge of the target band for the larger canvas side
    pub min_dimension: u32,
    /// Upper edge of the target band for the larger canvas side
    pub max_dimension: u32,
    pub compression: PngCompression,
    pub draw_room_colors: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_dimension: 1024,
            max_dimension: 2048,
            compression: PngCompression::Default,
            draw_room_colors: true,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_dimension == 0 {
            return Err(Error::InvalidConfig("min_dimension must be positive".into()));
        }
        if self.min_dimension > self.max_dimension {
            return Err(Error::InvalidConfig(format!(
                "min_dimension {} exceeds max_dimension {}",
                self.min_dimension, self.max_dimension
            )));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.min_dimension, config.max_dimension), (1024, 2048));
    }

    #[test]
    fn test_partial_json() {
        let config = RenderConfig::from_json(r#"{"compression": "best", "draw_room_colors": false}"#).unwrap();
        assert_eq!(config.compression, PngCompression::Best);
        assert!(!config.draw_room_colors);
        assert_eq!(config.max_dimension, 2048);
    }

    #[test]
    fn test_invalid_band_rejected() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"min_dimension": 4096}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            RenderConfig::from_json(r#"{"min_dimension": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(RenderConfig::from_json("not json"), Err(Error::InvalidConfig(_))));
    }
}
