//! Rules configuration consulted during resolution
//!
//! Optional-rule switches collected in one place. Loaded from TOML for
//! server deployments; tests and embedded callers use `Default`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{EngineError, Result};

/// Optional-rule switches for transport and minefield resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Allow non-mechanized infantry to rappel from an airborne carrier
    ///
    /// When off, an airborne unload that resolves to a rappel descent
    /// fails outright instead of rolling the skill check.
    pub infantry_rappel: bool,

    /// Double-blind play: dice narration for hidden minefields is only
    /// shown to the owning player until the field is revealed.
    pub double_blind: bool,

    /// Minimum safe distance (hexes) used by drop placement before the
    /// occupancy threshold starts relaxing.
    pub drop_ring_radius: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            infantry_rappel: false,
            double_blind: false,
            drop_ring_radius: 2,
        }
    }
}

impl RulesConfig {
    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| EngineError::ConfigError(e.to_string()))
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.drop_ring_radius == 0 {
            return Err(EngineError::ConfigError(
                "drop_ring_radius must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_conservative() {
        let config = RulesConfig::default();
        assert!(!config.infantry_rappel);
        assert!(!config.double_blind);
        assert_eq!(config.drop_ring_radius, 2);
    }

    #[test]
    fn test_validate_rejects_zero_radius() {
        let config = RulesConfig {
            drop_ring_radius: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: RulesConfig = toml::from_str("infantry_rappel = true").unwrap();
        assert!(config.infantry_rappel);
        assert!(!config.double_blind);
    }
}
