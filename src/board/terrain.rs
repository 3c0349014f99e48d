//! Terrain model for board hexes
//!
//! A hex carries a base level plus leveled terrain features. Depth and
//! floor are derived: water pushes the floor below the surface level.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Terrain features a hex can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,    // level = depth in elevation steps
    Pavement,
    Bridge,
    Ice,
    Rough,
    Rubble,
    Magma,
    Building, // level = construction class
    BuildingElev, // level = roof height above hex level
}

/// One hex of the board
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Hex {
    /// Base surface level of the hex
    pub level: i32,
    terrains: AHashMap<Terrain, i32>,
}

impl Hex {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            terrains: AHashMap::new(),
        }
    }

    /// Builder-style terrain addition
    pub fn with_terrain(mut self, terrain: Terrain, level: i32) -> Self {
        self.terrains.insert(terrain, level);
        self
    }

    pub fn add_terrain(&mut self, terrain: Terrain, level: i32) {
        self.terrains.insert(terrain, level);
    }

    pub fn contains_terrain(&self, terrain: Terrain) -> bool {
        self.terrains.contains_key(&terrain)
    }

    /// Level of the given terrain, 0 if absent
    pub fn terrain_level(&self, terrain: Terrain) -> i32 {
        self.terrains.get(&terrain).copied().unwrap_or(0)
    }

    /// Water depth of this hex (0 when dry)
    pub fn depth(&self) -> i32 {
        self.terrain_level(Terrain::Water)
    }

    /// Level of the lowest standable surface (hex bottom)
    pub fn floor(&self) -> i32 {
        self.level - self.depth()
    }

    /// Does anything here endanger a dropped unit?
    pub fn is_hazardous(&self) -> bool {
        self.contains_terrain(Terrain::Water)
            || self.contains_terrain(Terrain::Magma)
            || self.contains_terrain(Terrain::Building)
    }

    /// Does this hex block sight lines through it?
    pub fn blocks_los(&self) -> bool {
        self.contains_terrain(Terrain::Building)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_hex_floor_equals_level() {
        let hex = Hex::new(2);
        assert_eq!(hex.depth(), 0);
        assert_eq!(hex.floor(), 2);
    }

    #[test]
    fn test_water_lowers_floor() {
        let hex = Hex::new(0).with_terrain(Terrain::Water, 2);
        assert_eq!(hex.depth(), 2);
        assert_eq!(hex.floor(), -2);
    }

    #[test]
    fn test_hazard_detection() {
        assert!(Hex::new(0).with_terrain(Terrain::Magma, 1).is_hazardous());
        assert!(Hex::new(0).with_terrain(Terrain::Water, 1).is_hazardous());
        assert!(!Hex::new(0).with_terrain(Terrain::Rough, 1).is_hazardous());
    }

    #[test]
    fn test_absent_terrain_level_is_zero() {
        let hex = Hex::new(0);
        assert!(!hex.contains_terrain(Terrain::Ice));
        assert_eq!(hex.terrain_level(Terrain::Ice), 0);
    }
}
