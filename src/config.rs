use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fragment strategy of a particle pipeline, chosen once per pipeline object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingStrategy {
    /// Output the instance color directly.
    Flat,
    /// Accumulate every light, tinted by the instance color.
    #[default]
    Lit,
    /// Accumulate every light, tinted by a texture sampled at the vertex uv.
    Textured,
}

impl ShadingStrategy {
    pub const ALL: [ShadingStrategy; 3] = [Self::Flat, Self::Lit, Self::Textured];

    pub fn fragment_entry_point(self) -> &'static str {
        match self {
            Self::Flat => "fs_flat",
            Self::Lit => "fs_lit",
            Self::Textured => "fs_textured",
        }
    }

    pub fn uses_lights(self) -> bool {
        !matches!(self, Self::Flat)
    }

    pub fn samples_texture(self) -> bool {
        matches!(self, Self::Textured)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Lit => "lit",
            Self::Textured => "textured",
        }
    }
}

impl fmt::Display for ShadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadingStrategy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "lit" => Ok(Self::Lit),
            "textured" => Ok(Self::Textured),
            _ => Err(ConfigError::UnknownStrategy(value.to_string())),
        }
    }
}

/// Settings for a shading run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    pub strategy: ShadingStrategy,
    /// Also evaluate a marker glyph per light.
    pub draw_markers: bool,
    /// Treat NaN shading samples as a failure.
    pub fail_on_nan: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Flat".parse::<ShadingStrategy>().unwrap(), ShadingStrategy::Flat);
        assert_eq!(" lit ".parse::<ShadingStrategy>().unwrap(), ShadingStrategy::Lit);
        assert_eq!(
            "TEXTURED".parse::<ShadingStrategy>().unwrap(),
            ShadingStrategy::Textured
        );
    }

    #[test]
    fn unknown_strategy_is_reported() {
        let err = "pbr".parse::<ShadingStrategy>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("pbr".to_string()));
    }

    #[test]
    fn display_round_trips() {
        for strategy in ShadingStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<ShadingStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn entry_points_are_distinct() {
        assert_eq!(ShadingStrategy::Flat.fragment_entry_point(), "fs_flat");
        assert_eq!(ShadingStrategy::Lit.fragment_entry_point(), "fs_lit");
        assert_eq!(ShadingStrategy::Textured.fragment_entry_point(), "fs_textured");
        assert!(!ShadingStrategy::Flat.uses_lights());
        assert!(ShadingStrategy::Textured.samples_texture());
    }

    #[test]
    fn defaults_to_lit_without_markers() {
        let config = ShadingConfig::default();
        assert_eq!(config.strategy, ShadingStrategy::Lit);
        assert!(!config.draw_markers);
        assert!(!config.fail_on_nan);
    }
}
