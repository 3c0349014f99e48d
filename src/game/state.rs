//! Shared game state mutated by the resolution engine
//!
//! One `GameState` per game instance; resolution operations take it by
//! `&mut` so multiple independent games can run in one process. Outbound
//! observer traffic (unit resyncs, turn-queue rebroadcasts, minefield
//! changes) accumulates in the outbox for the network layer to drain.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::Board;
use crate::core::config::RulesConfig;
use crate::core::types::{GamePhase, MinefieldId, PlayerId, RemovalCondition, TeamId, UnitId};
use crate::minefield::MinefieldStore;
use crate::units::{TransportError, Unit};

use super::turns::TurnQueue;

/// A participant in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Option<TeamId>,
    /// Minefields this player knows about
    pub known_minefields: AHashSet<MinefieldId>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, team: Option<TeamId>) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            known_minefields: AHashSet::new(),
        }
    }
}

/// Outbound observer traffic produced during resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// Resynchronize one unit to all observers
    UnitUpdate(UnitId),
    /// The turn queue changed; rebroadcast it
    TurnQueue,
    /// A unit left play
    UnitRemoved {
        unit: UnitId,
        condition: RemovalCondition,
    },
    /// The minefields at a coordinate changed
    MinefieldsChanged { coords: HexCoord },
    /// A player learned of a minefield
    MinefieldRevealed {
        player: PlayerId,
        field: MinefieldId,
    },
    /// A player's known minefield went away
    MinefieldRemoved {
        player: PlayerId,
        field: MinefieldId,
    },
    /// Server chat line
    Chat(String),
}

/// Complete mutable state of one game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub board: Board,
    pub rules: RulesConfig,
    pub units: AHashMap<UnitId, Unit>,
    /// Units removed from play, in removal order
    pub graveyard: Vec<UnitId>,
    pub players: AHashMap<PlayerId, Player>,
    pub turns: TurnQueue,
    pub minefields: MinefieldStore,
    #[serde(skip)]
    pub outbox: Vec<Notification>,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            ..Default::default()
        }
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        let id = unit.id;
        self.units.insert(id, unit);
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Run a closure with one unit detached from the map
    ///
    /// Lets resolution code mutate a unit and the rest of the game state
    /// in the same pass (damage plus minefield bookkeeping, say). The unit
    /// is reinserted afterwards no matter what the closure does.
    pub fn with_unit_mut<R>(
        &mut self,
        id: UnitId,
        f: impl FnOnce(&mut GameState, &mut Unit) -> R,
    ) -> Option<R> {
        let mut unit = self.units.remove(&id)?;
        let result = f(self, &mut unit);
        self.units.insert(id, unit);
        Some(result)
    }

    /// Live (not removed) units at a coordinate
    pub fn units_at(&self, coords: HexCoord) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| !u.destroyed && u.position == Some(coords))
            .map(|u| u.id)
            .collect()
    }

    /// Count live units matching a predicate
    pub fn count_units(&self, pred: impl Fn(&Unit) -> bool) -> usize {
        self.units
            .values()
            .filter(|u| !u.destroyed && pred(u))
            .count()
    }

    pub fn team_for_player(&self, player: PlayerId) -> Option<TeamId> {
        self.players.get(&player).and_then(|p| p.team)
    }

    /// All team ids present in the game
    pub fn teams(&self) -> Vec<TeamId> {
        let mut teams: Vec<TeamId> = self
            .players
            .values()
            .filter_map(|p| p.team)
            .collect();
        teams.sort_by_key(|t| t.0);
        teams.dedup();
        teams
    }

    /// Players on the given team
    pub fn team_players(&self, team: TeamId) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.team == Some(team))
            .map(|p| p.id)
            .collect();
        ids.sort_by_key(|p| p.0);
        ids
    }

    // --- observer traffic ---

    /// Queue a resynchronization of one unit to all observers
    pub fn unit_update(&mut self, id: UnitId) {
        self.outbox.push(Notification::UnitUpdate(id));
    }

    pub fn broadcast_turns(&mut self) {
        self.outbox.push(Notification::TurnQueue);
    }

    pub fn send_chat(&mut self, message: impl Into<String>) {
        self.outbox.push(Notification::Chat(message.into()));
    }

    /// Remove a destroyed unit from play and queue the removal notice
    pub fn move_to_graveyard(&mut self, id: UnitId, condition: RemovalCondition) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.destroyed = true;
            unit.position = None;
        }
        if !self.graveyard.contains(&id) {
            self.graveyard.push(id);
            self.outbox
                .push(Notification::UnitRemoved { unit: id, condition });
        }
    }

    // --- transport graph mutations ---
    //
    // These are the only places that touch both sides of a carry or tow
    // link, so a failed precondition never leaves a dangling half-link.

    /// Physically place cargo aboard a carrier bay
    pub fn load_into(
        &mut self,
        carrier_id: UnitId,
        cargo_id: UnitId,
        bay: Option<usize>,
        check_elevation: bool,
    ) -> Result<(), TransportError> {
        if carrier_id == cargo_id {
            return Err(TransportError::SelfLoad);
        }
        let cargo = self.units.get(&cargo_id).ok_or(TransportError::NotCarried)?;
        if cargo.carried_by.is_some() {
            return Err(TransportError::AlreadyCarried);
        }
        let (cargo_pos, cargo_elev) = (cargo.position, cargo.elevation);

        let carrier = self.units.get(&carrier_id).ok_or(TransportError::NoCapacity)?;
        if check_elevation
            && cargo_pos.is_some()
            && (cargo_pos != carrier.position || cargo_elev != carrier.elevation)
        {
            return Err(TransportError::ElevationMismatch);
        }
        let bay_idx = carrier.pick_bay(bay).ok_or(TransportError::NoCapacity)?;

        let carrier = self.units.get_mut(&carrier_id).expect("carrier checked above");
        carrier.bays[bay_idx].occupants.push(cargo_id);
        let cargo = self.units.get_mut(&cargo_id).expect("cargo checked above");
        cargo.carried_by = Some(carrier_id);
        Ok(())
    }

    /// Physically remove cargo from a carrier; `false` if it isn't aboard
    pub fn unload_from(&mut self, carrier_id: UnitId, cargo_id: UnitId) -> bool {
        let Some(carrier) = self.units.get_mut(&carrier_id) else {
            return false;
        };
        let Some(bay_idx) = carrier.bay_of(cargo_id) else {
            return false;
        };
        carrier.bays[bay_idx].occupants.retain(|u| *u != cargo_id);
        if let Some(cargo) = self.units.get_mut(&cargo_id) {
            cargo.carried_by = None;
        }
        true
    }

    /// Hitch a trailer to the back of a tractor's tow train
    pub fn attach_trailer(&mut self, tractor_id: UnitId, trailer_id: UnitId) {
        let Some(tractor) = self.units.get(&tractor_id) else {
            return;
        };
        // Direct puller is the current end of the train
        let puller = tractor.tow_chain.last().copied().unwrap_or(tractor_id);
        let ahead: Vec<UnitId> = tractor.tow_chain.clone();

        if let Some(trailer) = self.units.get_mut(&trailer_id) {
            trailer.towed_by = Some(puller);
        }
        if let Some(tractor) = self.units.get_mut(&tractor_id) {
            tractor.tow_chain.push(trailer_id);
        }
        for id in ahead {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.tow_chain.push(trailer_id);
            }
        }
    }

    /// Sever a trailer (and everything hitched behind it) from the train
    ///
    /// The trailer keeps its own chain: the severed group stays hitched to
    /// each other, it just isn't being pulled anymore.
    pub fn disconnect_trailer(&mut self, tractor_id: UnitId, trailer_id: UnitId) -> bool {
        let Some(tractor) = self.units.get(&tractor_id) else {
            return false;
        };
        if !tractor.tow_chain.contains(&trailer_id) {
            return false;
        }
        let Some(trailer) = self.units.get(&trailer_id) else {
            return false;
        };

        let mut severed: AHashSet<UnitId> = AHashSet::new();
        severed.insert(trailer_id);
        severed.extend(trailer.tow_chain.iter().copied());

        let ahead: Vec<UnitId> = tractor
            .tow_chain
            .iter()
            .copied()
            .filter(|id| !severed.contains(id))
            .chain(std::iter::once(tractor_id))
            .collect();

        if let Some(trailer) = self.units.get_mut(&trailer_id) {
            trailer.towed_by = None;
        }
        for id in ahead {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.tow_chain.retain(|u| !severed.contains(u));
            }
        }
        true
    }
}
