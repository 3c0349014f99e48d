//! Unloading: putting a carried unit back on the board
//!
//! The destination elevation depends on terrain and on how the carrier
//! flies; a unit lowered step by step from an airborne carrier is on a
//! rappel line and has to pass a skill check on the way down.

use crate::board::hex::{Facing, HexCoord};
use crate::board::terrain::{Hex, Terrain};
use crate::board::Board;
use crate::combat::{
    apply_damage, roll_hit_location, set_location_exposure, HitTable, RollTarget,
};
use crate::core::dice::Dice;
use crate::core::types::UnitId;
use crate::game::events::{EventKind, EventLog};
use crate::game::state::GameState;
use crate::units::{MoveMode, MoveType, Unit};

/// Damage taken from a failed rappel descent
const RAPPEL_FALL_DAMAGE: i32 = 5;

/// Step down from `start` until the unit finds a valid elevation in the
/// hex, giving up below the hex bottom
///
/// The movement type records how the descent happened: jump-capable units
/// jump down, everyone else walks a rappel line.
fn descend_to_valid(unit: &Unit, hex: &Hex, start: i32) -> Option<(i32, MoveType)> {
    let mut elevation = start;
    let mut moved = MoveType::None;
    while elevation >= -hex.depth() {
        if unit.elevation_valid(elevation, hex) {
            return Some((elevation, moved));
        }
        elevation -= 1;
        moved = if unit.jump_mp > 0 {
            MoveType::Jump
        } else {
            MoveType::Walk
        };
    }
    None
}

/// Work out where an unloaded unit comes to rest
///
/// Pure over (board, units, destination): callers mutate only after this
/// succeeds, so a failed resolution never leaves a half-placed unit.
fn resolve_unload_elevation(
    board: &Board,
    unloader: &Unit,
    unit: &Unit,
    pos: Option<HexCoord>,
    elevation: i32,
) -> Option<(i32, MoveType)> {
    let hex = pos.and_then(|p| board.hex(p));
    let Some(hex) = hex else {
        // Off-board destination: trust the caller's elevation
        return Some((elevation, MoveType::None));
    };
    let pos = pos.expect("hex implies position");

    if unloader.move_mode == MoveMode::Vtol {
        if unit.move_mode == MoveMode::Vtol {
            // Flyer to flyer: stay at the transport's elevation
            return Some((elevation, MoveType::None));
        }
        if board.building_at(pos) {
            // Lowered onto a roof
            return Some((hex.terrain_level(Terrain::BuildingElev), MoveType::None));
        }
        return descend_to_valid(unit, hex, elevation);
    }

    if board.building_at(pos) {
        // Ground unloader into a building: same floor as the carrier
        return Some((elevation, MoveType::None));
    }

    if hex.depth() > 0 {
        if unit.can_float()
            || hex.contains_terrain(Terrain::Ice)
            || hex.contains_terrain(Terrain::Bridge)
        {
            // Floaters and anything on ice or a bridge ride the surface
            return Some((0, MoveType::None));
        }
        // Everything else settles to the bottom
        return Some((hex.floor() - hex.level, MoveType::None));
    }

    Some((hex.floor() - hex.level, MoveType::None))
}

/// Have the unloader unload the indicated unit
///
/// `elevation` is the caller's elevation for airborne unloads; `evacuation`
/// marks units spilling out of a destroyed carrier; `during_deployment`
/// re-enables the unloaded unit to act. Returns false (and changes
/// nothing) when the unit isn't aboard, no elevation works, or a rappel
/// descent is required but not allowed.
pub fn unload_unit(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    unloader_id: UnitId,
    unit_id: UnitId,
    pos: Option<HexCoord>,
    facing: Facing,
    elevation: i32,
    evacuation: bool,
    during_deployment: bool,
) -> bool {
    let Some(unloader) = state.unit(unloader_id) else {
        return false;
    };
    let Some(unit) = state.unit(unit_id) else {
        return false;
    };
    // Must actually be aboard
    if unloader.bay_of(unit_id).is_none() {
        return false;
    }

    let Some((final_elevation, moved)) = resolve_unload_elevation(
        &state.board,
        unloader,
        unit,
        pos,
        elevation,
    ) else {
        return false;
    };

    // A walked descent is a rappel line: infantry-only, and only when the
    // optional rule allows it
    if moved == MoveType::Walk
        && !(state.rules.infantry_rappel && unit.is_infantry() && !unit.mechanized)
    {
        return false;
    }

    let unloader_elevation = unloader.elevation;
    let (unloader_tracks, unloader_small_craft) = {
        let u = state.unit(unloader_id).expect("checked above");
        (
            u.tracks_passengers(),
            matches!(
                u.class,
                crate::units::UnitClass::SmallCraft | crate::units::UnitClass::Dropship
            ),
        )
    };

    if !state.unload_from(unloader_id, unit_id) {
        return false;
    }

    state.with_unit_mut(unit_id, |state, unit| {
        unit.position = pos;
        if pos.is_some() {
            unit.deployed = true;
        }
        unit.facing = facing;
        unit.sec_facing = facing;
        unit.elevation = final_elevation;
        unit.moved = moved;

        if moved == MoveType::Walk {
            log.push(Some(unit.id), EventKind::RappelStart);
            let mut target = RollTarget::new(unit.antimek);
            if unloader_elevation > 0 {
                target.add_modifier(unloader_elevation, "elevation");
            }
            let roll = dice.roll_2d6();
            let success = roll >= target.value();
            log.push(
                Some(unit.id),
                EventKind::RappelCheck {
                    target: target.value(),
                    roll,
                    success,
                },
            );
            if !success {
                let location = roll_hit_location(dice, unit, HitTable::Standard);
                apply_damage(unit, log, location, RAPPEL_FALL_DAMAGE);
            }
        }

        if let Some(hex) = pos.and_then(|p| state.board.hex(p)) {
            set_location_exposure(unit, hex, final_elevation);
        }

        // Units coming off a dropship-style craft can still act this turn
        // at half speed, treated as having moved one hex
        if !evacuation && unloader_small_craft && !unit.is_infantry() {
            unit.unloaded_this_turn = false;
            unit.done = false;
            unit.mp_used = unit.walk_mp / 2;
            unit.delta_distance = 1;
        }

        if during_deployment {
            unit.unloaded_this_turn = false;
            unit.done = false;
        }
    });

    // Passenger manifest bookkeeping mirrors loading, floored at zero
    let (crew_size, unit_large) = {
        let unit = state.unit(unit_id).expect("checked above");
        (unit.crew.size, unit.is_large_craft())
    };
    if unloader_tracks && !unit_large {
        if let Some(unloader) = state.unit_mut(unloader_id) {
            unloader.passengers = unloader.passengers.saturating_sub(crew_size);
        }
    }

    state.unit_update(unit_id);
    true
}
