//! Entry detonation: what happens when a unit walks into a mined hex
//!
//! Vibrabombs are proximity-triggered and handled in `vibrabomb`; this
//! path covers conventional, active, and inferno fields.

use crate::board::hex::HexCoord;
use crate::board::terrain::Terrain;
use crate::combat::{
    apply_chunked_damage, apply_damage, deliver_inferno_missiles, motive_check, HitTable,
};
use crate::core::dice::Dice;
use crate::core::types::{MinefieldId, UnitId};
use crate::game::events::{EventKind, EventLog};
use crate::game::state::GameState;
use crate::units::{MoveMode, Unit};

use super::reveal::{remove_minefield, reveal_minefield};
use super::{
    MineKind, ACTIVE_DETONATION_TARGET, DAMAGE_CHUNK, HOVER_WIGE_DETONATION_TARGET,
    SWEEP_ARMOR_COST, SWEEP_CLEAR_TARGET,
};

/// Resolve all non-vibrabomb minefields as a unit enters a hex
///
/// `cur_elev` is the entering unit's elevation (sea mines only fire at
/// their set depth); `on_ground` is false mid-jump. Returns whether
/// anything detonated.
pub fn enter_minefield(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    unit_id: UnitId,
    coords: HexCoord,
    cur_elev: i32,
    on_ground: bool,
    target_override: Option<i32>,
) -> bool {
    // Airborne units can't trip a mine
    if cur_elev > 0 {
        return false;
    }
    let field_ids = state.minefields.at(coords);
    if field_ids.is_empty() {
        return false;
    }

    let double_blind = state.rules.double_blind;
    let mut tripped = false;
    let mut fields_to_remove: Vec<MinefieldId> = Vec::new();

    state.with_unit_mut(unit_id, |state, unit| {
        for field_id in field_ids {
            let Some(field) = state.minefields.get(field_id) else {
                continue;
            };
            if field.kind == MineKind::Vibrabomb {
                continue;
            }
            let (kind, owner, field_coords, depth, density, trigger) = (
                field.kind,
                field.owner,
                field.coords,
                field.depth,
                field.density,
                field.trigger,
            );

            // Sea mines only fire at the right depth
            let in_water = state
                .board
                .hex(field_coords)
                .map(|h| h.contains_terrain(Terrain::Water))
                .unwrap_or(false);
            if in_water
                && cur_elev.abs() != depth
                && (cur_elev + unit.height()).abs() != depth
            {
                continue;
            }

            // A ready sweeper gets a shot at clearing the field first
            if unit.ready_sweeper().is_some() {
                let roll = dice.roll_2d6();
                if double_blind {
                    log.push_for(owner, Some(unit.id), EventKind::SweepRoll { coords, roll });
                }
                if roll >= SWEEP_CLEAR_TARGET {
                    log.push(Some(unit.id), EventKind::MinefieldSwept { coords });
                    fields_to_remove.push(field_id);
                    sweep_armor_cost(unit, log, SWEEP_ARMOR_COST);
                    continue;
                }
            }

            // Active mines threaten ground contact; everything else
            // threatens non-ground (jump) movement
            if kind == MineKind::Active && on_ground {
                continue;
            }
            if kind != MineKind::Active && !on_ground {
                continue;
            }

            let target = target_override.unwrap_or_else(|| detonation_target(unit, kind, trigger));
            let roll = dice.roll_2d6();
            let hit = roll >= target;
            if double_blind {
                log.push_for(
                    owner,
                    Some(unit.id),
                    EventKind::DetonationRoll {
                        coords,
                        target,
                        roll,
                        hit,
                    },
                );
            }
            if !hit {
                continue;
            }

            tripped = true;
            if let Some(field) = state.minefields.get_mut(field_id) {
                field.detonated = true;
            }

            if kind == MineKind::Inferno {
                log.push(Some(unit.id), EventKind::InfernoMineHit { coords });
                deliver_inferno_missiles(unit, dice, log, density / 2);
            } else {
                log.push(Some(unit.id), EventKind::MineHit { coords });
                // Mines hit the sweeper mount when one is carried
                let fixed = unit.sweeper.as_ref().map(|s| s.location);
                apply_chunked_damage(
                    unit,
                    dice,
                    log,
                    density as i32,
                    DAMAGE_CHUNK,
                    HitTable::Ground,
                    fixed,
                );
                if unit.class == crate::units::UnitClass::Vehicle {
                    motive_check(unit, dice, log, 0);
                }
            }

            if let Some(field) = state.minefields.get_mut(field_id) {
                field.check_reduction(0, true, dice);
            }
            reveal_minefield(state, field_id);
        }
    });

    for field_id in fields_to_remove {
        remove_minefield(state, field_id);
    }

    tripped
}

/// Detonation target for a unit entering a field
fn detonation_target(unit: &Unit, kind: MineKind, trigger: i32) -> i32 {
    let mut target = trigger;
    if kind == MineKind::Active {
        target = ACTIVE_DETONATION_TARGET;
    }
    if unit.is_infantry() {
        target += 1;
    }
    if unit.keen_sensors {
        target += 2;
    }
    if matches!(unit.move_mode, MoveMode::Hover | MoveMode::Wige) {
        target = HOVER_WIGE_DETONATION_TARGET;
    }
    target
}

/// Charge a sweep against the apparatus armor, spilling excess into the
/// carrying unit at the mount location
pub(super) fn sweep_armor_cost(unit: &mut Unit, log: &mut EventLog, cost: i32) {
    let Some(sweeper) = unit.sweeper.as_mut() else {
        return;
    };
    let remaining = sweeper.armor - cost;
    sweeper.armor = remaining.max(0);
    let location = sweeper.location;
    log.push(
        Some(unit.id),
        EventKind::SweeperCost {
            cost,
            remaining: remaining.max(0),
        },
    );
    if remaining <= 0 {
        sweeper.destroyed = true;
    }
    if remaining < 0 {
        let spill = remaining.abs();
        log.push(Some(unit.id), EventKind::SweeperOverload { damage: spill });
        apply_damage(unit, log, location, spill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::PlayerId;
    use crate::game::state::Player;
    use crate::minefield::Minefield;
    use crate::units::{Sweeper, UnitClass};

    fn fixture() -> (GameState, UnitId) {
        let mut state = GameState::new(Board::flat(10, 10));
        state.add_player(Player::new(PlayerId(0), "attacker", None));
        state.add_player(Player::new(PlayerId(1), "defender", None));
        let mut unit = Unit::new(UnitId(1), "walker", PlayerId(0), UnitClass::Walker);
        unit.position = Some(HexCoord::new(3, 3));
        state.add_unit(unit);
        (state, UnitId(1))
    }

    fn lay_conventional(state: &mut GameState, density: u32) -> MinefieldId {
        state.minefields.add(Minefield::new(
            crate::core::types::MinefieldId(0),
            HexCoord::new(3, 3),
            MineKind::Conventional,
            PlayerId(1),
            density,
        ))
    }

    #[test]
    fn test_airborne_units_are_exempt() {
        let (mut state, unit) = fixture();
        lay_conventional(&mut state, 10);
        let mut dice = ScriptedDice::new(&[6, 6]);
        let mut log = EventLog::new();
        assert!(!enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 2, true, None
        ));
    }

    #[test]
    fn test_detonation_damages_and_reduces() {
        let (mut state, unit) = fixture();
        let field = lay_conventional(&mut state, 10);
        // Detonation roll 8 >= trigger 7, then hit locations
        let mut dice = ScriptedDice::new(&[4, 4]);
        let mut log = EventLog::new();
        assert!(enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));
        let mf = state.minefields.get(field).unwrap();
        assert!(mf.detonated);
        assert_eq!(mf.density, 5);
        let total: i32 = log
            .events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::DamageApplied { amount, .. } => Some(amount),
                _ => None,
            })
            .sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_missed_roll_leaves_field_alone() {
        let (mut state, unit) = fixture();
        let field = lay_conventional(&mut state, 10);
        let mut dice = ScriptedDice::new(&[2, 2]);
        let mut log = EventLog::new();
        assert!(!enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));
        assert!(!state.minefields.get(field).unwrap().detonated);
        assert_eq!(state.minefields.get(field).unwrap().density, 10);
    }

    #[test]
    fn test_sweeper_clears_field_at_armor_cost() {
        let (mut state, unit) = fixture();
        let field = lay_conventional(&mut state, 10);
        state.unit_mut(unit).unwrap().sweeper = Some(Sweeper::new(8, 6));
        // Sweep roll 6 clears
        let mut dice = ScriptedDice::new(&[3, 3]);
        let mut log = EventLog::new();
        assert!(!enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));
        assert!(state.minefields.get(field).is_none());
        let sweeper = state.unit(unit).unwrap().sweeper.clone().unwrap();
        assert_eq!(sweeper.armor, 2);
        assert!(!sweeper.destroyed);
        // No damage chunks landed on the unit
        assert!(!log
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::DamageApplied { .. })));
    }

    #[test]
    fn test_sweeper_overload_transfers_damage() {
        let (mut state, unit) = fixture();
        lay_conventional(&mut state, 10);
        state.unit_mut(unit).unwrap().sweeper = Some(Sweeper::new(4, 6));
        let mut dice = ScriptedDice::new(&[3, 3]);
        let mut log = EventLog::new();
        enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None,
        );
        let u = state.unit(unit).unwrap();
        let sweeper = u.sweeper.as_ref().unwrap();
        assert_eq!(sweeper.armor, 0);
        assert!(sweeper.destroyed);
        // 2 points carried through to the mount location
        assert_eq!(u.armor[6], 6);
    }

    #[test]
    fn test_active_mine_ignores_ground_movement() {
        let (mut state, unit) = fixture();
        let field = state.minefields.add(Minefield::new(
            crate::core::types::MinefieldId(0),
            HexCoord::new(3, 3),
            MineKind::Active,
            PlayerId(1),
            10,
        ));
        let mut dice = ScriptedDice::new(&[6, 6]);
        let mut log = EventLog::new();
        // On the ground: active mines stay quiet
        assert!(!enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));
        assert!(!state.minefields.get(field).unwrap().detonated);

        // Jumping through: 12 >= 9 detonates
        let mut dice = ScriptedDice::new(&[6, 6]);
        assert!(enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, false, None
        ));
    }

    #[test]
    fn test_hover_target_override() {
        let (mut state, unit) = fixture();
        state.unit_mut(unit).unwrap().move_mode = MoveMode::Hover;
        state.unit_mut(unit).unwrap().class = UnitClass::Vehicle;
        state.unit_mut(unit).unwrap().armor = vec![8; 5];
        lay_conventional(&mut state, 10);
        // Roll 5 would miss trigger 7 but hits the hover override of 5
        let mut dice = ScriptedDice::new(&[2, 3]);
        let mut log = EventLog::new();
        assert!(enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));
    }

    #[test]
    fn test_sea_mine_depth_gate() {
        let (mut state, unit) = fixture();
        state.board.set_hex(
            HexCoord::new(3, 3),
            crate::board::terrain::Hex::new(0).with_terrain(Terrain::Water, 2),
        );
        let field = lay_conventional(&mut state, 10);
        state.minefields.get_mut(field).unwrap().depth = 2;
        let mut log = EventLog::new();

        // Standing at the surface: mine set for depth 2 stays quiet
        let mut dice = ScriptedDice::new(&[6, 6]);
        assert!(!enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), 0, true, None
        ));

        // At the bottom, depth matches
        let mut dice = ScriptedDice::new(&[6, 6]);
        assert!(enter_minefield(
            &mut state, &mut dice, &mut log, unit, HexCoord::new(3, 3), -2, true, None
        ));
    }
}
