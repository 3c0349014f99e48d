//! Minefields: per-hex hazard pools with dice-driven triggers
//!
//! A field's density is its damage pool; it only ever goes down. Fields
//! below the density floor are swept away by the housekeeping pass.

pub mod clearing;
pub mod entry;
pub mod reveal;
pub mod vibrabomb;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::dice::Dice;
use crate::core::types::{MinefieldId, PlayerId};

/// Minimum density a field needs to stay on the board
pub const DENSITY_FLOOR: u32 = 5;
/// Damage is applied in chunks of this size, one hit location per chunk
pub const DAMAGE_CHUNK: i32 = 5;
/// Density removed by a direct (post-detonation) reduction
pub const REDUCTION_STEP: u32 = 5;
/// Collateral reduction happens on 2d6 + bonus at or above this
pub const COLLATERAL_REDUCTION_TARGET: i32 = 10;
/// Detonation target for active mines, regardless of trigger setting
pub const ACTIVE_DETONATION_TARGET: i32 = 9;
/// Detonation target override for hover and WiGE movers
pub const HOVER_WIGE_DETONATION_TARGET: i32 = 5;
/// Sweep roll needed to clear a field on entry
pub const SWEEP_CLEAR_TARGET: i32 = 6;
/// Armor cost of sweeping a conventional, active, or inferno field
pub const SWEEP_ARMOR_COST: i32 = 6;
/// Armor cost of auto-clearing a vibrabomb
pub const VIBRA_SWEEP_ARMOR_COST: i32 = 10;
/// A sweeper auto-clears vibrabombs set within this many tons of its
/// carrier's mass
pub const VIBRA_SWEEP_MASS_WINDOW: i32 = 9;

/// Minefield flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineKind {
    Conventional,
    /// Threatens ground-contact movement only
    Active,
    Inferno,
    /// Mass-sensitive proximity trigger
    Vibrabomb,
}

impl MineKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            MineKind::Conventional => "conventional minefield",
            MineKind::Active => "active minefield",
            MineKind::Inferno => "inferno minefield",
            MineKind::Vibrabomb => "vibrabomb",
        }
    }
}

/// One minefield bound to a board coordinate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minefield {
    pub id: MinefieldId,
    pub coords: HexCoord,
    pub kind: MineKind,
    pub owner: PlayerId,
    /// Damage pool; the field is removed once this drops below the floor
    pub density: u32,
    /// Detonation target number (ignored for active mines and vibrabombs)
    pub trigger: i32,
    /// Mass setting for vibrabombs, in tons
    pub setting: i32,
    /// Depth setting for sea mines, in elevation steps
    pub depth: i32,
    /// Went off during the current resolution cycle; cleared by housekeeping
    pub detonated: bool,
}

impl Minefield {
    pub fn new(
        id: MinefieldId,
        coords: HexCoord,
        kind: MineKind,
        owner: PlayerId,
        density: u32,
    ) -> Self {
        Self {
            id,
            coords,
            kind,
            owner,
            density,
            trigger: 7,
            setting: 0,
            depth: 0,
            detonated: false,
        }
    }

    pub fn vibrabomb(
        id: MinefieldId,
        coords: HexCoord,
        owner: PlayerId,
        density: u32,
        setting: i32,
    ) -> Self {
        let mut field = Self::new(id, coords, MineKind::Vibrabomb, owner, density);
        field.setting = setting;
        field
    }

    /// Apply a density reduction check
    ///
    /// Direct reductions (a field that just went off) always take a step.
    /// Collateral reductions from a neighbor's detonation only bite on
    /// 2d6 + bonus at or above the collateral target. Density never goes
    /// negative.
    pub fn check_reduction(&mut self, bonus: i32, direct: bool, dice: &mut dyn Dice) {
        if direct || dice.roll_2d6() + bonus >= COLLATERAL_REDUCTION_TARGET {
            self.density = self.density.saturating_sub(REDUCTION_STEP);
        }
    }
}

/// All minefields in a game, indexed by id and by coordinate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinefieldStore {
    fields: AHashMap<MinefieldId, Minefield>,
    by_hex: AHashMap<HexCoord, Vec<MinefieldId>>,
    next_id: u32,
}

impl MinefieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, assigning its id
    pub fn add(&mut self, mut field: Minefield) -> MinefieldId {
        let id = MinefieldId(self.next_id);
        self.next_id += 1;
        field.id = id;
        self.by_hex.entry(field.coords).or_default().push(id);
        self.fields.insert(id, field);
        id
    }

    /// Remove a field; removing an absent field is a no-op
    pub fn remove(&mut self, id: MinefieldId) -> Option<Minefield> {
        let field = self.fields.remove(&id)?;
        if let Some(ids) = self.by_hex.get_mut(&field.coords) {
            ids.retain(|f| *f != id);
            if ids.is_empty() {
                self.by_hex.remove(&field.coords);
            }
        }
        Some(field)
    }

    pub fn get(&self, id: MinefieldId) -> Option<&Minefield> {
        self.fields.get(&id)
    }

    pub fn get_mut(&mut self, id: MinefieldId) -> Option<&mut Minefield> {
        self.fields.get_mut(&id)
    }

    pub fn contains(&self, id: MinefieldId) -> bool {
        self.fields.contains_key(&id)
    }

    /// Ids of all fields at a coordinate
    pub fn at(&self, coords: HexCoord) -> Vec<MinefieldId> {
        self.by_hex.get(&coords).cloned().unwrap_or_default()
    }

    /// Every coordinate currently holding at least one field
    pub fn mined_coords(&self) -> Vec<HexCoord> {
        self.by_hex.keys().copied().collect()
    }

    /// Ids of every vibrabomb on the board
    pub fn vibrabombs(&self) -> Vec<MinefieldId> {
        self.fields
            .values()
            .filter(|f| f.kind == MineKind::Vibrabomb)
            .map(|f| f.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use proptest::prelude::*;

    fn field(density: u32) -> Minefield {
        Minefield::new(
            MinefieldId(0),
            HexCoord::new(2, 2),
            MineKind::Conventional,
            PlayerId(0),
            density,
        )
    }

    #[test]
    fn test_direct_reduction_always_applies() {
        let mut dice = ScriptedDice::new(&[1, 1]);
        let mut mf = field(20);
        mf.check_reduction(0, true, &mut dice);
        assert_eq!(mf.density, 15);
    }

    #[test]
    fn test_collateral_reduction_needs_the_roll() {
        let mut mf = field(20);
        let mut low = ScriptedDice::new(&[4, 4]);
        mf.check_reduction(1, false, &mut low);
        assert_eq!(mf.density, 20);

        let mut high = ScriptedDice::new(&[5, 4]);
        mf.check_reduction(1, false, &mut high);
        assert_eq!(mf.density, 15);
    }

    #[test]
    fn test_store_indexes_by_hex() {
        let mut store = MinefieldStore::new();
        let id = store.add(field(10));
        assert_eq!(store.at(HexCoord::new(2, 2)), vec![id]);
        assert_eq!(store.at(HexCoord::new(0, 0)), Vec::new());

        store.remove(id);
        assert!(store.at(HexCoord::new(2, 2)).is_empty());
        assert!(store.mined_coords().is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = MinefieldStore::new();
        assert!(store.remove(MinefieldId(99)).is_none());
    }

    proptest! {
        #[test]
        fn prop_density_never_goes_negative(density in 0u32..40, rolls in proptest::collection::vec(1i32..=6, 8)) {
            let mut dice = ScriptedDice::new(&rolls);
            let mut mf = field(density);
            for _ in 0..6 {
                let before = mf.density;
                mf.check_reduction(0, true, &mut dice);
                prop_assert!(mf.density <= before);
            }
        }
    }
}
