//! Active minefield clearing and per-round housekeeping

use crate::board::hex::HexCoord;
use crate::combat::{apply_chunked_damage, HitTable};
use crate::core::dice::Dice;
use crate::core::types::{MinefieldId, UnitId};
use crate::game::events::{EventKind, EventLog};
use crate::game::state::{GameState, Notification};

use super::reveal::remove_minefield;
use super::{MineKind, DAMAGE_CHUNK, DENSITY_FLOOR};

/// Attempt to clear a minefield
///
/// Success is reported but the field is *not* removed here; callers loop
/// over fields and must remove afterwards. A roll at or below `botch`
/// detonates the field into everyone else clearing the same hex:
/// conventional fields lose density (floored), anything else clears
/// itself by blowing up. Returns whether the field ended up cleared.
pub fn clear_minefield(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    field_id: MinefieldId,
    clearer: UnitId,
    target: i32,
    botch: i32,
) -> bool {
    let Some(field) = state.minefields.get(field_id) else {
        return false;
    };
    let (coords, kind, density) = (field.coords, field.kind, field.density);

    let roll = dice.roll_2d6();
    if roll >= target {
        log.push(Some(clearer), EventKind::MinefieldCleared { target, roll });
        return true;
    }

    if roll <= botch {
        log.push(Some(clearer), EventKind::ClearBotched { target, roll });
        // Everyone else working this hex is caught in the blast
        let victims: Vec<UnitId> = state
            .units_at(coords)
            .into_iter()
            .filter(|id| {
                state
                    .unit(*id)
                    .map(|u| u.clearing_minefield)
                    .unwrap_or(false)
            })
            .collect();
        for victim_id in victims {
            log.push(Some(victim_id), EventKind::ClearCollateral);
            state.with_unit_mut(victim_id, |_, victim| {
                apply_chunked_damage(
                    victim,
                    dice,
                    log,
                    density as i32,
                    DAMAGE_CHUNK,
                    HitTable::Ground,
                    None,
                );
            });
        }
        if kind == MineKind::Conventional {
            if let Some(field) = state.minefields.get_mut(field_id) {
                field.density = field.density.saturating_sub(5).max(DENSITY_FLOOR);
            }
            return false;
        }
        // Cleared the field by setting it off
        return true;
    }

    log.push(Some(clearer), EventKind::ClearFailed { target, roll });
    false
}

/// Remove already-detonated fields at a coordinate on a successful roll
pub fn clear_detonated_mines(
    state: &mut GameState,
    dice: &mut dyn Dice,
    coords: HexCoord,
    target: i32,
) {
    let removed: Vec<MinefieldId> = state
        .minefields
        .at(coords)
        .into_iter()
        .filter(|id| {
            state
                .minefields
                .get(*id)
                .map(|f| f.detonated)
                .unwrap_or(false)
                && dice.roll_2d6() >= target
        })
        .collect();
    for id in removed {
        remove_minefield(state, id);
    }
}

/// Per-round minefield housekeeping
///
/// Detonated fields spread collateral reduction to their hex-mates (easier
/// against denser fields, harder against thinner ones), detonation flags
/// reset, and fields below the density floor are swept off the board.
/// Every mined coordinate is rebroadcast afterwards.
pub fn reset_mines(state: &mut GameState, dice: &mut dyn Dice) {
    for coords in state.minefields.mined_coords() {
        let ids = state.minefields.at(coords);
        for &id in &ids {
            let Some(field) = state.minefields.get(id) else {
                continue;
            };
            if !field.detonated {
                continue;
            }
            let detonated_density = field.density;
            if let Some(field) = state.minefields.get_mut(id) {
                field.detonated = false;
            }
            for &other_id in &ids {
                if other_id == id {
                    continue;
                }
                let Some(other) = state.minefields.get(other_id) else {
                    continue;
                };
                let bonus = match other.density.cmp(&detonated_density) {
                    std::cmp::Ordering::Greater => 1,
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                };
                if let Some(other) = state.minefields.get_mut(other_id) {
                    other.check_reduction(bonus, false, dice);
                }
            }
        }

        // Second pass: cull anything now below the floor
        let culled: Vec<MinefieldId> = ids
            .iter()
            .copied()
            .filter(|id| {
                state
                    .minefields
                    .get(*id)
                    .map(|f| f.density < DENSITY_FLOOR)
                    .unwrap_or(false)
            })
            .collect();
        for id in culled {
            remove_minefield(state, id);
        }

        state.outbox.push(Notification::MinefieldsChanged { coords });
    }
}
