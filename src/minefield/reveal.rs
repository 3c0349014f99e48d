//! Minefield visibility: who knows a field exists
//!
//! The owning team always knows. Everyone else has to spot the field being
//! laid, with detection gated on the best sight line any of their units
//! has. Reveal and removal are idempotent per player.

use crate::core::dice::Dice;
use crate::core::types::{MinefieldId, PlayerId, TeamId, UnitId};
use crate::game::state::{GameState, Notification};
use crate::units::MoveType;

/// Base detection target when a team saw the laying unit but not the hex
const DETECTION_BASE_TARGET: i32 = 4;

/// Reveal a minefield to every team
pub fn reveal_minefield(state: &mut GameState, field: MinefieldId) {
    for team in state.teams() {
        reveal_minefield_to_team(state, team, field);
    }
}

/// Reveal a minefield to every player on a team (idempotent)
pub fn reveal_minefield_to_team(state: &mut GameState, team: TeamId, field: MinefieldId) {
    if !state.minefields.contains(field) {
        return;
    }
    for player_id in state.team_players(team) {
        let Some(player) = state.players.get_mut(&player_id) else {
            continue;
        };
        if player.known_minefields.insert(field) {
            state.outbox.push(Notification::MinefieldRevealed {
                player: player_id,
                field,
            });
        }
    }
}

/// Reveal a minefield to one player; a teamed player shares with the team
pub fn reveal_minefield_to_player(state: &mut GameState, player_id: PlayerId, field: MinefieldId) {
    if let Some(team) = state.team_for_player(player_id) {
        reveal_minefield_to_team(state, team, field);
        return;
    }
    if !state.minefields.contains(field) {
        return;
    }
    if let Some(player) = state.players.get_mut(&player_id) {
        if player.known_minefields.insert(field) {
            state.outbox.push(Notification::MinefieldRevealed {
                player: player_id,
                field,
            });
        }
    }
}

/// Remove a minefield from the game and from every player who knew it
pub fn remove_minefield(state: &mut GameState, field: MinefieldId) {
    state.minefields.remove(field);
    let player_ids: Vec<PlayerId> = state.players.keys().copied().collect();
    for player_id in player_ids {
        remove_minefield_from_player(state, player_id, field);
    }
}

/// Forget a minefield for one player (idempotent)
pub fn remove_minefield_from_player(state: &mut GameState, player_id: PlayerId, field: MinefieldId) {
    if let Some(player) = state.players.get_mut(&player_id) {
        if player.known_minefields.remove(&field) {
            state.outbox.push(Notification::MinefieldRemoved {
                player: player_id,
                field,
            });
        }
    }
}

/// Check whether a newly laid minefield is spotted, team by team
///
/// The laying team sees it unconditionally. Every other team rolls against
/// the best sight line among its units: 0 for a clear line to the hex
/// itself, otherwise a base target adjusted by observer and layer movement
/// and intervening cover, minimized across the team.
pub fn check_for_reveal(
    state: &mut GameState,
    dice: &mut dyn Dice,
    field: MinefieldId,
    layer: UnitId,
) {
    let Some(mf) = state.minefields.get(field) else {
        return;
    };
    let mf_coords = mf.coords;
    let owner = mf.owner;
    let owning_team = state.team_for_player(owner);

    for team in state.teams() {
        let can_see = if Some(team) == owning_team {
            true
        } else {
            let target = detection_target(state, team, mf_coords, layer);
            match target {
                Some(target) => dice.roll_2d6() >= target,
                None => false,
            }
        };
        if can_see {
            reveal_minefield_to_team(state, team, field);
        }
    }
}

/// Best detection target across a team's units, `None` when nobody has a
/// sight line at all
fn detection_target(
    state: &GameState,
    team: TeamId,
    mf_coords: crate::board::hex::HexCoord,
    layer: UnitId,
) -> Option<i32> {
    let layer_unit = state.unit(layer);
    let mut best: Option<i32> = None;

    for unit in state.units.values() {
        if unit.destroyed || state.team_for_player(unit.owner) != Some(team) {
            continue;
        }
        let Some(pos) = unit.position else {
            continue;
        };
        // A clear line to the hex itself is an automatic spot
        if state.board.has_clear_sight(pos, mf_coords) {
            return Some(0);
        }
        // Otherwise they may have watched the layer do it
        let Some(layer_unit) = layer_unit else {
            continue;
        };
        let Some(layer_pos) = layer_unit.position else {
            continue;
        };
        let Some(cover) = state.board.sight_obstruction(pos, layer_pos) else {
            continue;
        };
        let target = DETECTION_BASE_TARGET
            + observer_movement_modifier(unit.moved)
            + target_movement_modifier(layer_unit.delta_distance)
            + cover;
        best = Some(best.map_or(target, |b| b.min(target)));
    }
    best
}

/// Modifier for how the observing unit moved this turn
fn observer_movement_modifier(moved: MoveType) -> i32 {
    match moved {
        MoveType::None => 0,
        MoveType::Walk => 1,
        MoveType::Run => 2,
        MoveType::Jump => 3,
    }
}

/// Modifier for how far the watched unit moved this turn
fn target_movement_modifier(hexes: u32) -> i32 {
    match hexes {
        0..=2 => 0,
        3..=4 => 1,
        5..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}
