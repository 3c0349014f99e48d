//! Dropping cargo from a dropship onto a ground map
//!
//! Dropped units scatter into the ring two hexes out from the drop point,
//! biased by the carrier's facing. Aerodyne craft trail their cargo behind
//! them, so the search starts on the opposite side. Crowding and dangerous
//! terrain are avoided for as long as anything better exists: the
//! occupancy threshold only rises after danger-avoidance has been dropped.

use crate::board::hex::{Facing, HexCoord};
use crate::core::types::UnitId;
use crate::game::state::GameState;
use crate::units::MoveMode;

/// Pick a landing hex in the ring around the drop point
///
/// Scans the six directions from the biased facing, two ring cells per
/// direction, accepting the first candidate at or under the occupancy
/// threshold that isn't dangerous. When every on-board candidate is
/// dangerous the danger filter is dropped; after that the threshold rises
/// each pass, so the search always terminates. `None` when the entire
/// ring is off the board.
fn find_drop_position(
    state: &GameState,
    center: HexCoord,
    facing: Facing,
    altitude: i32,
) -> Option<HexCoord> {
    // Candidates in scan order: outward spoke, then the ring neighbor
    let mut candidates: Vec<HexCoord> = Vec::with_capacity(12);
    for i in 0..6 {
        let dir = facing.rotated(i);
        let spoke = center.translated(dir, 2);
        candidates.push(spoke);
        candidates.push(spoke.neighbor(dir.rotated(2)));
    }
    if !candidates.iter().any(|c| state.board.contains(*c)) {
        return None;
    }

    let occupancy = |coords: HexCoord| -> usize {
        state
            .units_at(coords)
            .iter()
            .filter(|id| {
                state
                    .unit(**id)
                    .map(|u| u.altitude == altitude && !u.is_aero())
                    .unwrap_or(false)
            })
            .count()
    };

    let mut threshold = 0usize;
    let mut check_danger = true;
    loop {
        let mut all_danger = true;
        for &coords in &candidates {
            let Some(hex) = state.board.hex(coords) else {
                continue;
            };
            let danger = hex.is_hazardous();
            if occupancy(coords) <= threshold && (!danger || !check_danger) {
                return Some(coords);
            }
            if !danger {
                all_danger = false;
            }
        }
        if all_danger && check_danger {
            check_danger = false;
        } else {
            threshold += 1;
        }
    }
}

/// Discharge cargo from a carrier onto the map at the given altitude
///
/// On a ground map with a known position the cargo scatters via the ring
/// search; anywhere else it appears at the drop point itself.
pub fn drop_unit(
    state: &mut GameState,
    cargo_id: UnitId,
    carrier_id: UnitId,
    pos: Option<HexCoord>,
    altitude: i32,
) -> bool {
    let Some(carrier) = state.unit(carrier_id) else {
        return false;
    };
    let carrier_facing = carrier.facing;
    // Cargo drops behind an aerodyne, ahead of everything else
    let search_facing = if carrier.move_mode == MoveMode::Aerodyne {
        carrier_facing.opposite()
    } else {
        carrier_facing
    };

    if !state.unload_from(carrier_id, cargo_id) {
        return false;
    }

    let mut final_pos = pos;
    if state.board.on_ground() {
        if let Some(center) = pos {
            if let Some(found) = find_drop_position(state, center, search_facing, altitude) {
                final_pos = Some(found);
            }
        }
    }

    if let Some(cargo) = state.unit_mut(cargo_id) {
        cargo.position = final_pos;
        if final_pos.is_some() {
            cargo.deployed = true;
        }
        cargo.facing = carrier_facing;
        cargo.sec_facing = carrier_facing;
        cargo.altitude = altitude;
    }
    state.unit_update(cargo_id);
    true
}
