//! Loading, towing, and trailer disconnection
//!
//! Loading or towing a unit consumes its pending turn (outside setup),
//! with the last same-side turn removed so opponents' planning survives.

use tracing::info;

use crate::core::types::UnitId;
use crate::game::events::{EventKind, EventLog};
use crate::game::state::GameState;
use crate::units::UnitClass;

/// Remove the cargo's pending turn unless its shared-turn pack still has
/// members waiting to act, then rebroadcast the queue
fn remove_pending_turn(state: &mut GameState, cargo_id: UnitId) {
    let Some(cargo) = state.unit(cargo_id).cloned() else {
        return;
    };
    // Exoframe packs share one turn: only the last member to go consumes it
    if cargo.class == UnitClass::Exoframe && cargo.turn_group.is_some() {
        let remaining = state.count_units(|u| {
            u.class == UnitClass::Exoframe
                && u.id != cargo.id
                && u.is_selectable()
                && u.owner == cargo.owner
                && u.turn_group == cargo.turn_group
        });
        if remaining > 0 {
            return;
        }
    }
    if state.phase.is_setup() || cargo.done {
        return;
    }
    state.turns.remove_last_for(&cargo);
    state.broadcast_turns();
}

/// Recompute a squadron's derived crew skills from its docked members
fn update_squadron_stats(state: &mut GameState, squadron_id: UnitId) {
    let Some(squadron) = state.unit(squadron_id) else {
        return;
    };
    let members: Vec<UnitId> = squadron.carried_units().collect();
    let mut piloting = None;
    let mut gunnery = None;
    for id in &members {
        if let Some(member) = state.unit(*id) {
            piloting = Some(piloting.map_or(member.crew.piloting, |p: i32| p.min(member.crew.piloting)));
            gunnery = Some(gunnery.map_or(member.crew.gunnery, |g: i32| g.min(member.crew.gunnery)));
        }
    }
    if let Some(squadron) = state.unit_mut(squadron_id) {
        if let Some(p) = piloting {
            squadron.crew.piloting = p;
        }
        if let Some(g) = gunnery {
            squadron.crew.gunnery = g;
        }
    }
}

/// Have the carrier load the indicated unit. The unit being loaded loses
/// its turn.
pub fn load_unit(
    state: &mut GameState,
    log: &mut EventLog,
    carrier_id: UnitId,
    cargo_id: UnitId,
    bay: Option<usize>,
) -> bool {
    if state.unit(carrier_id).is_none() || state.unit(cargo_id).is_none() {
        return false;
    }

    remove_pending_turn(state, cargo_id);

    // A docked squadron may have outgrown its bay
    let carrier = state.unit(carrier_id).expect("checked above");
    if carrier.class == UnitClass::Squadron {
        if let Some(host_id) = carrier.carried_by {
            let bay_full = state
                .unit(host_id)
                .and_then(|host| host.bay_of(carrier_id))
                .and_then(|idx| state.unit(host_id).map(|host| host.bays[idx].unused() < 1))
                .unwrap_or(false);
            if bay_full {
                if state.phase.is_setup() {
                    // In setup, undock the squadron instead of blocking
                    state.unload_from(host_id, carrier_id);
                    state.unit_update(host_id);
                } else {
                    state.unit_update(cargo_id);
                    state.unit_update(carrier_id);
                    return false;
                }
            }
        }
    }

    // Joining a squadron in setup: the squadron adopts the fighter's
    // ordnance loadout and refreshes its derived stats before the load,
    // because the load derives secondary effects from them
    if state.phase.is_setup()
        && state.unit(carrier_id).map(|c| c.class) == Some(UnitClass::Squadron)
    {
        let loadout = state.unit(cargo_id).map(|u| u.bomb_load.clone());
        if let (Some(loadout), Some(squadron)) = (loadout, state.unit_mut(carrier_id)) {
            squadron.bomb_load = loadout;
        }
        update_squadron_stats(state, carrier_id);
    }

    // Elevation legality only matters once units are actually on the board
    let check_elevation = !state.phase.is_setup() && !state.phase.is_deployment();
    if let Err(err) = state.load_into(carrier_id, cargo_id, bay, check_elevation) {
        info!(carrier = carrier_id.0, cargo = cargo_id.0, %err, "load rejected");
        state.send_chat(err.to_string());
        log.push(
            Some(cargo_id),
            EventKind::LoadRejected {
                reason: err.to_string(),
            },
        );
        state.unit_update(cargo_id);
        state.unit_update(carrier_id);
        return false;
    }

    let (carrier_deploy_round, carrier_tracks) = {
        let carrier = state.unit(carrier_id).expect("checked above");
        (carrier.deploy_round, carrier.tracks_passengers())
    };

    let mut crew_size = 0;
    let mut cargo_large = false;
    if let Some(cargo) = state.unit_mut(cargo_id) {
        // Carried units come off the board
        cargo.position = None;
        cargo.deploy_round = carrier_deploy_round;
        crew_size = cargo.crew.size;
        cargo_large = cargo.is_large_craft();
    }

    // Large-craft carriers track everyone else's crews as passengers
    if carrier_tracks && !cargo_large {
        if let Some(carrier) = state.unit_mut(carrier_id) {
            carrier.passengers += crew_size;
        }
    }

    state.unit_update(cargo_id);
    state.unit_update(carrier_id);
    true
}

/// Have the tractor tow the indicated unit. The unit being towed loses
/// its turn.
pub fn tow_unit(state: &mut GameState, tractor_id: UnitId, trailer_id: UnitId) -> bool {
    if state.unit(tractor_id).is_none() || state.unit(trailer_id).is_none() {
        return false;
    }

    remove_pending_turn(state, trailer_id);

    state.attach_trailer(tractor_id, trailer_id);

    let deploy_round = state.unit(tractor_id).map(|t| t.deploy_round).unwrap_or(0);
    if let Some(trailer) = state.unit_mut(trailer_id) {
        trailer.deploy_round = deploy_round;
    }

    state.unit_update(trailer_id);
    state.unit_update(tractor_id);
    true
}

/// Have the tractor drop a trailer, severing everything hitched behind it
///
/// The affected list is captured before mutation so every unit that was in
/// the train gets resynchronized, including the ones severed transitively.
pub fn disconnect_unit(state: &mut GameState, tractor_id: UnitId, trailer_id: UnitId) -> bool {
    let Some(trailer) = state.unit(trailer_id) else {
        return false;
    };
    let mut affected: Vec<UnitId> = trailer.tow_chain.clone();
    if let Some(puller) = trailer.towed_by {
        affected.push(puller);
    }

    if !state.disconnect_trailer(tractor_id, trailer_id) {
        return false;
    }

    for id in affected {
        state.unit_update(id);
    }
    state.unit_update(trailer_id);
    state.unit_update(tractor_id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::types::{GamePhase, PlayerId};
    use crate::game::state::{Notification, Player};
    use crate::game::turns::TurnSlot;
    use crate::units::{Bay, Unit};

    fn fixture() -> GameState {
        let mut state = GameState::new(Board::flat(10, 10));
        state.add_player(Player::new(PlayerId(0), "side-a", None));
        state.add_player(Player::new(PlayerId(1), "side-b", None));
        state.phase = GamePhase::Movement;
        state
    }

    fn add(state: &mut GameState, id: u32, owner: u32, class: UnitClass) -> UnitId {
        state.add_unit(Unit::new(
            UnitId(id),
            format!("unit-{id}"),
            PlayerId(owner),
            class,
        ))
    }

    #[test]
    fn test_load_consumes_exactly_one_turn() {
        let mut state = fixture();
        let carrier = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(carrier).unwrap().bays.push(Bay::new(4));
        let cargo = add(&mut state, 1, 0, UnitClass::Vehicle);
        state.turns.push(TurnSlot::for_unit(PlayerId(0), carrier));
        state.turns.push(TurnSlot::for_unit(PlayerId(1), UnitId(9)));
        state.turns.push(TurnSlot::for_unit(PlayerId(0), cargo));

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, carrier, cargo, None));
        assert_eq!(state.turns.len(), 2);
        assert!(state.outbox.contains(&Notification::TurnQueue));
        assert_eq!(state.unit(cargo).unwrap().carried_by, Some(carrier));
        assert_eq!(state.unit(cargo).unwrap().position, None);
    }

    #[test]
    fn test_load_in_setup_keeps_turns() {
        let mut state = fixture();
        state.phase = GamePhase::Setup;
        let carrier = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(carrier).unwrap().bays.push(Bay::new(4));
        let cargo = add(&mut state, 1, 0, UnitClass::Vehicle);
        state.turns.push(TurnSlot::for_unit(PlayerId(0), cargo));

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, carrier, cargo, None));
        assert_eq!(state.turns.len(), 1);
    }

    #[test]
    fn test_pack_member_keeps_shared_turn() {
        let mut state = fixture();
        let carrier = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(carrier).unwrap().bays.push(Bay::new(4));
        let cargo = add(&mut state, 1, 0, UnitClass::Exoframe);
        state.unit_mut(cargo).unwrap().turn_group = Some(3);
        let mate = add(&mut state, 2, 0, UnitClass::Exoframe);
        state.unit_mut(mate).unwrap().turn_group = Some(3);
        state.turns.push(TurnSlot::for_unit(PlayerId(0), cargo));

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, carrier, cargo, None));
        // A packmate still has to act; the shared turn survives
        assert_eq!(state.turns.len(), 1);
    }

    #[test]
    fn test_load_rejection_resyncs_without_mutation() {
        let mut state = fixture();
        let carrier = add(&mut state, 0, 0, UnitClass::Dropship);
        // No bays: physical load refuses
        let cargo = add(&mut state, 1, 0, UnitClass::Vehicle);
        state.unit_mut(cargo).unwrap().position = Some(crate::board::hex::HexCoord::new(2, 2));

        let mut log = EventLog::new();
        assert!(!load_unit(&mut state, &mut log, carrier, cargo, None));
        assert_eq!(state.unit(cargo).unwrap().carried_by, None);
        assert!(state.unit(cargo).unwrap().position.is_some());
        assert!(log
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::LoadRejected { .. })));
        let updates = state
            .outbox
            .iter()
            .filter(|n| matches!(n, Notification::UnitUpdate(_)))
            .count();
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_load_passenger_bookkeeping() {
        let mut state = fixture();
        state.phase = GamePhase::Setup;
        let carrier = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(carrier).unwrap().bays.push(Bay::new(4));
        let cargo = add(&mut state, 1, 0, UnitClass::Vehicle);
        state.unit_mut(cargo).unwrap().crew.size = 3;

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, carrier, cargo, None));
        assert_eq!(state.unit(carrier).unwrap().passengers, 3);
    }

    #[test]
    fn test_large_craft_crews_are_not_passengers() {
        let mut state = fixture();
        state.phase = GamePhase::Setup;
        let carrier = add(&mut state, 0, 0, UnitClass::Jumpship);
        state.unit_mut(carrier).unwrap().bays.push(Bay::new(4));
        let cargo = add(&mut state, 1, 0, UnitClass::Dropship);
        state.unit_mut(cargo).unwrap().crew.size = 12;

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, carrier, cargo, None));
        assert_eq!(state.unit(carrier).unwrap().passengers, 0);
    }

    #[test]
    fn test_full_docked_squadron_rejects_outside_setup() {
        let mut state = fixture();
        let host = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(host).unwrap().bays.push(Bay::new(1));
        let squadron = add(&mut state, 1, 0, UnitClass::Squadron);
        state.unit_mut(squadron).unwrap().bays.push(Bay::new(6));
        state.load_into(host, squadron, None, false).unwrap();
        let fighter = add(&mut state, 2, 0, UnitClass::Fighter);

        let mut log = EventLog::new();
        assert!(!load_unit(&mut state, &mut log, squadron, fighter, None));
        assert_eq!(state.unit(fighter).unwrap().carried_by, None);
        // Still docked
        assert_eq!(state.unit(squadron).unwrap().carried_by, Some(host));
    }

    #[test]
    fn test_full_docked_squadron_undocks_in_setup() {
        let mut state = fixture();
        state.phase = GamePhase::Setup;
        let host = add(&mut state, 0, 0, UnitClass::Dropship);
        state.unit_mut(host).unwrap().bays.push(Bay::new(1));
        let squadron = add(&mut state, 1, 0, UnitClass::Squadron);
        state.unit_mut(squadron).unwrap().bays.push(Bay::new(6));
        state.load_into(host, squadron, None, false).unwrap();
        let fighter = add(&mut state, 2, 0, UnitClass::Fighter);
        state.unit_mut(fighter).unwrap().crew.piloting = 3;
        state.unit_mut(fighter).unwrap().bomb_load = vec![2, 0, 1];

        let mut log = EventLog::new();
        assert!(load_unit(&mut state, &mut log, squadron, fighter, None));
        assert_eq!(state.unit(squadron).unwrap().carried_by, None);
        assert_eq!(state.unit(fighter).unwrap().carried_by, Some(squadron));
        // Loadout copied and stats refreshed before the physical load
        assert_eq!(state.unit(squadron).unwrap().bomb_load, vec![2, 0, 1]);
        assert_eq!(state.unit(squadron).unwrap().crew.piloting, 5);
    }

    #[test]
    fn test_tow_removes_turn_and_links() {
        let mut state = fixture();
        let tractor = add(&mut state, 0, 0, UnitClass::Vehicle);
        let trailer = add(&mut state, 1, 0, UnitClass::Vehicle);
        state.turns.push(TurnSlot::for_unit(PlayerId(0), trailer));

        assert!(tow_unit(&mut state, tractor, trailer));
        assert_eq!(state.turns.len(), 0);
        assert_eq!(state.unit(trailer).unwrap().towed_by, Some(tractor));
        assert_eq!(state.unit(tractor).unwrap().tow_chain, vec![trailer]);
    }

    #[test]
    fn test_disconnect_resyncs_whole_train() {
        let mut state = fixture();
        let tractor = add(&mut state, 0, 0, UnitClass::Vehicle);
        let t1 = add(&mut state, 1, 0, UnitClass::Vehicle);
        let t2 = add(&mut state, 2, 0, UnitClass::Vehicle);
        let t3 = add(&mut state, 3, 0, UnitClass::Vehicle);
        state.attach_trailer(tractor, t1);
        state.attach_trailer(tractor, t2);
        state.attach_trailer(tractor, t3);
        state.outbox.clear();

        assert!(disconnect_unit(&mut state, tractor, t2));
        assert_eq!(state.unit(tractor).unwrap().tow_chain, vec![t1]);

        let resynced: Vec<UnitId> = state
            .outbox
            .iter()
            .filter_map(|n| match n {
                Notification::UnitUpdate(id) => Some(*id),
                _ => None,
            })
            .collect();
        for id in [tractor, t1, t2, t3] {
            assert!(resynced.contains(&id), "{id:?} not resynced");
        }
    }

    #[test]
    fn test_disconnect_unlinked_is_rejected() {
        let mut state = fixture();
        let tractor = add(&mut state, 0, 0, UnitClass::Vehicle);
        let loose = add(&mut state, 1, 0, UnitClass::Vehicle);
        assert!(!disconnect_unit(&mut state, tractor, loose));
    }
}
