//! Core identifier and phase types shared across the engine
//!
//! Ids are plain integers: transport links are index-based back-references
//! between units, so a cheap copyable id is the unit of currency here.

use serde::{Deserialize, Serialize};

/// Unique identifier for a unit on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Unique identifier for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

/// Unique identifier for a minefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinefieldId(pub u32);

/// Game phases relevant to transport and minefield resolution
///
/// The full phase cycle lives in the orchestration layer; this engine only
/// needs to distinguish pre-game setup and deployment from live play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup, // pre-game lobby, units not yet on the board
    Deployment,
    Movement,
    Firing,
    Physical,
    End,
}

impl GamePhase {
    /// Pre-game setup: no elevation checks, no turn bookkeeping
    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::Setup)
    }

    pub fn is_deployment(&self) -> bool {
        matches!(self, GamePhase::Deployment)
    }
}

/// Condition a unit was in when removed from play
///
/// Wire codes from callers are validated through `try_from`; an unknown
/// code is a caller contract violation, not a game-rule outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCondition {
    Unknown,
    InRetreat,
    Pushed,
    Salvageable,
    Ejected,
    Captured,
    Devastated,
    NeverJoined,
}

impl TryFrom<u8> for RemovalCondition {
    type Error = crate::core::error::EngineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RemovalCondition::Unknown),
            1 => Ok(RemovalCondition::InRetreat),
            2 => Ok(RemovalCondition::Pushed),
            3 => Ok(RemovalCondition::Salvageable),
            4 => Ok(RemovalCondition::Ejected),
            5 => Ok(RemovalCondition::Captured),
            6 => Ok(RemovalCondition::Devastated),
            7 => Ok(RemovalCondition::NeverJoined),
            other => Err(crate::core::error::EngineError::UnknownRemovalCondition(other)),
        }
    }
}
