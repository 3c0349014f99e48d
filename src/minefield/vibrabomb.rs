//! Vibrabombs: mass-sensitive proximity mines
//!
//! Only ground-contact legged movement sets them off. The trigger radius
//! grows with the gap between the walker's mass and the bomb's setting, so
//! a heavy frame can set off a distant bomb without ever entering its hex.

use crate::board::hex::HexCoord;
use crate::board::terrain::Terrain;
use crate::combat::{apply_chunked_damage, base_control_target, stability_check, HitTable};
use crate::core::dice::Dice;
use crate::core::types::{MinefieldId, UnitId};
use crate::game::events::{EventKind, EventLog};
use crate::game::state::GameState;
use crate::units::UnitClass;

use super::entry::sweep_armor_cost;
use super::reveal::{remove_minefield, reveal_minefield};
use super::{DAMAGE_CHUNK, VIBRA_SWEEP_ARMOR_COST, VIBRA_SWEEP_MASS_WINDOW};

/// Check whether a unit arriving at `coords` sets off any vibrabombs
///
/// `displaced` marks a unit thrown here rather than moving here under its
/// own power; displaced units skip the standing-in-the-hex direct hit.
/// Returns whether anything went off.
pub fn check_vibrabombs(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    unit_id: UnitId,
    coords: HexCoord,
    displaced: bool,
) -> bool {
    let Some(unit) = state.unit(unit_id) else {
        return false;
    };
    let mass = unit.weight as i32;
    let has_sweeper = unit.ready_sweeper().is_some();

    // A sweeper in the hex auto-clears bombs set near its carrier's mass
    if has_sweeper {
        let mut cleared: Vec<MinefieldId> = Vec::new();
        state.with_unit_mut(unit_id, |state, unit| {
            for field_id in state.minefields.vibrabombs() {
                let Some(field) = state.minefields.get(field_id) else {
                    continue;
                };
                if field.coords != coords {
                    continue;
                }
                if (mass - field.setting).abs() <= VIBRA_SWEEP_MASS_WINDOW {
                    log.push(Some(unit.id), EventKind::MinefieldSwept { coords });
                    cleared.push(field_id);
                    sweep_armor_cost(unit, log, VIBRA_SWEEP_ARMOR_COST);
                }
            }
        });
        for field_id in cleared {
            remove_minefield(state, field_id);
        }
    }

    let Some(unit) = state.unit(unit_id) else {
        return false;
    };
    if !unit.triggers_vibrabombs() {
        return false;
    }

    let mut boom = false;
    state.with_unit_mut(unit_id, |state, unit| {
        for field_id in state.minefields.vibrabombs() {
            let Some(field) = state.minefields.get(field_id) else {
                continue;
            };
            let (mf_coords, setting, density) = (field.coords, field.setting, field.density);

            // Submerged bombs are inert unless the hex is paved or iced over
            if let Some(hex) = state.board.hex(mf_coords) {
                if hex.contains_terrain(Terrain::Water)
                    && !hex.contains_terrain(Terrain::Pavement)
                    && !hex.contains_terrain(Terrain::Ice)
                {
                    continue;
                }
            }

            // Too light to wake the trigger
            if mass <= setting - 10 {
                continue;
            }

            let effective_radius = (mass - setting) / 10;
            let actual_distance = coords.distance(&mf_coords) as i32;

            if actual_distance <= effective_radius {
                log.push(Some(unit.id), EventKind::VibrabombExplodes { coords: mf_coords });
                // The mover only shares the hex blast when actually
                // standing in the bomb's hex
                let exclude = if coords != mf_coords { Some(unit.id) } else { None };
                explode_vibrabomb(state, dice, log, field_id, exclude);
            }

            // The mover isn't in the entity index mid-move; a bomb under
            // its feet hits it here
            if !displaced && actual_distance == 0 {
                log.push(Some(unit.id), EventKind::VibrabombDirectHit);
                apply_chunked_damage(
                    unit,
                    dice,
                    log,
                    density as i32,
                    DAMAGE_CHUNK,
                    HitTable::Ground,
                    None,
                );
                let target = base_control_target(unit);
                stability_check(unit, dice, log, &target);
            }

            let went_off = state
                .minefields
                .get(field_id)
                .map(|f| f.detonated)
                .unwrap_or(false);
            if went_off {
                boom = true;
                if let Some(field) = state.minefields.get_mut(field_id) {
                    field.check_reduction(0, true, dice);
                }
                reveal_minefield(state, field_id);
            }
        }
    });

    boom
}

/// Detonate a vibrabomb, damaging everything in its hex
///
/// `exclude` suppresses hex-centric damage for a unit that merely swept
/// the trigger radius without standing in the hex.
pub fn explode_vibrabomb(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    field_id: MinefieldId,
    exclude: Option<UnitId>,
) {
    let Some(field) = state.minefields.get_mut(field_id) else {
        return;
    };
    field.detonated = true;
    let (mf_coords, density) = (field.coords, field.density);

    for victim_id in state.units_at(mf_coords) {
        if Some(victim_id) == exclude {
            continue;
        }
        state.with_unit_mut(victim_id, |_, victim| {
            // Anything above the ground rides out the blast
            if victim.elevation > 0 {
                return;
            }
            apply_chunked_damage(
                victim,
                dice,
                log,
                density as i32,
                DAMAGE_CHUNK,
                HitTable::Ground,
                None,
            );
            if matches!(victim.class, UnitClass::Walker | UnitClass::Exoframe) {
                let target = base_control_target(victim);
                stability_check(victim, dice, log, &target);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::terrain::Hex;
    use crate::board::Board;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::PlayerId;
    use crate::game::state::Player;
    use crate::minefield::Minefield;
    use crate::units::{DriveMode, Sweeper, Unit};

    fn fixture() -> GameState {
        let mut state = GameState::new(Board::flat(12, 12));
        state.add_player(Player::new(PlayerId(0), "mover", None));
        state.add_player(Player::new(PlayerId(1), "miner", None));
        state
    }

    fn walker_at(state: &mut GameState, id: u32, coords: HexCoord, weight: f32) -> UnitId {
        let mut unit = Unit::new(UnitId(id), format!("walker-{id}"), PlayerId(0), UnitClass::Walker);
        unit.position = Some(coords);
        unit.weight = weight;
        state.add_unit(unit)
    }

    fn vibrabomb_at(state: &mut GameState, coords: HexCoord, setting: i32) -> MinefieldId {
        state.minefields.add(Minefield::vibrabomb(
            MinefieldId(0),
            coords,
            PlayerId(1),
            10,
            setting,
        ))
    }

    #[test]
    fn test_trigger_radius_by_mass() {
        // Mass 25, setting 10: radius = (25 - 10) / 10 = 1
        let mut state = fixture();
        let field = vibrabomb_at(&mut state, HexCoord::new(5, 5), 10);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 4), 25.0);

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        assert!(check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 4), false
        ));
        assert!(state.minefields.get(field).is_some());
    }

    #[test]
    fn test_out_of_radius_stays_quiet() {
        let mut state = fixture();
        let field = vibrabomb_at(&mut state, HexCoord::new(5, 5), 10);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 3), 25.0);

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        assert!(!check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 3), false
        ));
        assert!(!state.minefields.get(field).unwrap().detonated);
    }

    #[test]
    fn test_too_light_to_trigger() {
        let mut state = fixture();
        vibrabomb_at(&mut state, HexCoord::new(5, 5), 60);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 5), 50.0);

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        assert!(!check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 5), false
        ));
    }

    #[test]
    fn test_only_legged_movement_triggers() {
        let mut state = fixture();
        vibrabomb_at(&mut state, HexCoord::new(5, 5), 10);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 5), 50.0);
        state.unit_mut(mover).unwrap().drive_mode = Some(DriveMode::Wheels);

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        assert!(!check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 5), false
        ));
    }

    #[test]
    fn test_direct_hit_damages_and_checks_stability() {
        let mut state = fixture();
        vibrabomb_at(&mut state, HexCoord::new(5, 5), 40);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 5), 50.0);
        // Chunk locations (fallback), then stability roll 6,6 passes
        let mut dice = ScriptedDice::with_fallback(&[], 3);
        let mut log = EventLog::new();
        assert!(check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 5), false
        ));
        assert!(log
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::VibrabombDirectHit)));
        assert!(log
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::StabilityCheck { .. })));
        let total: i32 = log
            .events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::DamageApplied { amount, .. } => Some(amount),
                _ => None,
            })
            .sum();
        assert!(total >= 10);
    }

    #[test]
    fn test_bystander_in_hex_shares_blast() {
        let mut state = fixture();
        vibrabomb_at(&mut state, HexCoord::new(5, 5), 10);
        let bystander = walker_at(&mut state, 2, HexCoord::new(5, 5), 30.0);
        // Mover trips the bomb from one hex out; it takes no blast damage
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 4), 25.0);

        let mut dice = ScriptedDice::with_fallback(&[], 5);
        let mut log = EventLog::new();
        check_vibrabombs(&mut state, &mut dice, &mut log, mover, HexCoord::new(5, 4), false);

        assert!(state.unit(bystander).unwrap().total_armor() < 8 * 8);
        assert_eq!(state.unit(mover).unwrap().total_armor(), 8 * 8);
    }

    #[test]
    fn test_underwater_bomb_inert_without_ice() {
        let mut state = fixture();
        state.board.set_hex(
            HexCoord::new(5, 5),
            Hex::new(0).with_terrain(Terrain::Water, 1),
        );
        vibrabomb_at(&mut state, HexCoord::new(5, 5), 10);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 5), 50.0);

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        assert!(!check_vibrabombs(
            &mut state, &mut dice, &mut log, mover, HexCoord::new(5, 5), false
        ));
    }

    #[test]
    fn test_sweeper_autoclears_within_mass_window() {
        let mut state = fixture();
        let field = vibrabomb_at(&mut state, HexCoord::new(5, 5), 45);
        let mover = walker_at(&mut state, 1, HexCoord::new(5, 5), 50.0);
        state.unit_mut(mover).unwrap().sweeper = Some(Sweeper::new(12, 6));

        let mut dice = ScriptedDice::new(&[]);
        let mut log = EventLog::new();
        check_vibrabombs(&mut state, &mut dice, &mut log, mover, HexCoord::new(5, 5), false);

        assert!(state.minefields.get(field).is_none());
        let sweeper = state.unit(mover).unwrap().sweeper.clone().unwrap();
        assert_eq!(sweeper.armor, 2);
    }
}
