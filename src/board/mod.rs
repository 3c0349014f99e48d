//! Board: hex storage, terrain queries, sight lines
//!
//! Read-only from the resolution engine's perspective except for minefield
//! occupancy, which lives in the game state.

pub mod hex;
pub mod terrain;

pub use hex::{Facing, HexCoord};
pub use terrain::{Hex, Terrain};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Scale of the map the board represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapScale {
    #[default]
    Ground,
    Atmosphere,
    Space,
}

/// The playing board
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Board {
    pub scale: MapScale,
    hexes: AHashMap<HexCoord, Hex>,
}

impl Board {
    pub fn new(scale: MapScale) -> Self {
        Self {
            scale,
            hexes: AHashMap::new(),
        }
    }

    /// Fill a rectangular region with flat hexes at level 0
    pub fn flat(width: i32, height: i32) -> Self {
        let mut board = Self::new(MapScale::Ground);
        for q in 0..width {
            for r in 0..height {
                board.set_hex(HexCoord::new(q, r), Hex::new(0));
            }
        }
        board
    }

    pub fn set_hex(&mut self, coords: HexCoord, hex: Hex) {
        self.hexes.insert(coords, hex);
    }

    pub fn hex(&self, coords: HexCoord) -> Option<&Hex> {
        self.hexes.get(&coords)
    }

    pub fn contains(&self, coords: HexCoord) -> bool {
        self.hexes.contains_key(&coords)
    }

    /// Is there a building at these coordinates?
    pub fn building_at(&self, coords: HexCoord) -> bool {
        self.hex(coords)
            .map(|h| h.contains_terrain(Terrain::Building))
            .unwrap_or(false)
    }

    pub fn on_ground(&self) -> bool {
        self.scale == MapScale::Ground
    }

    pub fn in_space(&self) -> bool {
        self.scale == MapScale::Space
    }

    /// Clear sight line between two coordinates
    ///
    /// Blocked by buildings and by intervening hexes higher than both
    /// endpoints. Endpoints themselves never block.
    pub fn has_clear_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        self.sight_obstruction(from, to).is_some()
    }

    /// Number of light obstructions along the sight line, or `None` when
    /// the line is fully blocked
    pub fn sight_obstruction(&self, from: HexCoord, to: HexCoord) -> Option<i32> {
        let base = self
            .hex(from)
            .map(|h| h.level)
            .max(self.hex(to).map(|h| h.level))
            .unwrap_or(0);
        let mut cover = 0;
        for coords in from.line_to(&to) {
            if coords == from || coords == to {
                continue;
            }
            if let Some(hex) = self.hex(coords) {
                if hex.blocks_los() || hex.level > base + 1 {
                    return None;
                }
                if hex.contains_terrain(Terrain::Rough) || hex.contains_terrain(Terrain::Rubble) {
                    cover += 1;
                }
            }
        }
        Some(cover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_board_contains_hexes() {
        let board = Board::flat(10, 10);
        assert!(board.contains(HexCoord::new(0, 0)));
        assert!(board.contains(HexCoord::new(9, 9)));
        assert!(!board.contains(HexCoord::new(10, 0)));
    }

    #[test]
    fn test_building_blocks_sight() {
        let mut board = Board::flat(10, 1);
        let mut hex = Hex::new(0);
        hex.add_terrain(Terrain::Building, 1);
        hex.add_terrain(Terrain::BuildingElev, 2);
        board.set_hex(HexCoord::new(5, 0), hex);

        assert!(!board.has_clear_sight(HexCoord::new(0, 0), HexCoord::new(9, 0)));
        assert!(board.has_clear_sight(HexCoord::new(0, 0), HexCoord::new(4, 0)));
    }

    #[test]
    fn test_rough_adds_cover_without_blocking() {
        let mut board = Board::flat(10, 1);
        board.set_hex(
            HexCoord::new(3, 0),
            Hex::new(0).with_terrain(Terrain::Rough, 1),
        );
        assert_eq!(
            board.sight_obstruction(HexCoord::new(0, 0), HexCoord::new(6, 0)),
            Some(1)
        );
    }

    #[test]
    fn test_high_ground_blocks() {
        let mut board = Board::flat(10, 1);
        board.set_hex(HexCoord::new(4, 0), Hex::new(3));
        assert!(!board.has_clear_sight(HexCoord::new(0, 0), HexCoord::new(8, 0)));
    }
}
