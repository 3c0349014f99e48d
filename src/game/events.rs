//! Narration events accumulated during resolution
//!
//! Each event references a template (the enum variant), a subject unit and
//! typed parameters. Events are appended to a caller-supplied log and never
//! mutated afterwards; presentation layers render them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::hex::HexCoord;
use crate::core::types::{PlayerId, UnitId};

/// Who may see an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Audience {
    #[default]
    Everyone,
    /// Double-blind narration: only this player sees the entry
    Player(PlayerId),
}

/// Typed narration templates
///
/// Serialize-only: logs flow outward to presentation layers and are never
/// read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    // Transport
    LoadRejected { reason: String },
    RappelStart,
    RappelCheck { target: i32, roll: i32, success: bool },
    Launched,
    LaunchCheck { target: i32, roll: i32, success: bool },
    LaunchStress { damage: i32 },
    LandingCheck { target: i32, roll: i32, success: bool },
    LandingDamage { damage: i32, margin: i32 },
    GearDamaged,
    SunkInWater,

    // Minefield
    SweepRoll { coords: HexCoord, roll: i32 },
    MinefieldSwept { coords: HexCoord },
    SweeperCost { cost: i32, remaining: i32 },
    SweeperOverload { damage: i32 },
    DetonationRoll { coords: HexCoord, target: i32, roll: i32, hit: bool },
    MineHit { coords: HexCoord },
    InfernoMineHit { coords: HexCoord },
    VibrabombExplodes { coords: HexCoord },
    VibrabombDirectHit,
    MinefieldCleared { target: i32, roll: i32 },
    ClearBotched { target: i32, roll: i32 },
    ClearFailed { target: i32, roll: i32 },
    ClearCollateral,

    // Damage library
    DamageApplied { location: &'static str, amount: i32 },
    UnitDestroyed { reason: String },
    MotiveDamage { severity: MotiveSeverity },
    StabilityCheck { target: i32, roll: i32, success: bool },
    UnitFell,
    InfernoDelivered { missiles: u32 },
}

/// Graded outcome of a motive-system check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotiveSeverity {
    None,
    Minor,
    Moderate,
    Heavy,
    Immobilized,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::LoadRejected { reason } => write!(f, "load rejected: {reason}"),
            EventKind::RappelStart => write!(f, "begins a rappel descent"),
            EventKind::RappelCheck { target, roll, success } => {
                let outcome = if *success { "succeeds" } else { "fails" };
                write!(f, "rappel check {outcome} (needed {target}, rolled {roll})")
            }
            EventKind::Launched => write!(f, "launches"),
            EventKind::LaunchCheck { target, roll, success } => {
                let outcome = if *success { "holds steady" } else { "loses control" };
                write!(f, "launch control check: {outcome} (needed {target}, rolled {roll})")
            }
            EventKind::LaunchStress { damage } => {
                write!(f, "takes {damage} launch stress damage")
            }
            EventKind::LandingCheck { target, roll, success } => {
                let outcome = if *success { "lands cleanly" } else { "lands hard" };
                write!(f, "landing check: {outcome} (needed {target}, rolled {roll})")
            }
            EventKind::LandingDamage { damage, margin } => {
                write!(f, "takes {damage} landing damage (missed by {margin})")
            }
            EventKind::GearDamaged => write!(f, "damages its landing gear"),
            EventKind::SunkInWater => write!(f, "sinks in deep water"),
            EventKind::SweepRoll { coords, roll } => {
                write!(f, "sweep roll at ({}, {}): {roll}", coords.q, coords.r)
            }
            EventKind::MinefieldSwept { coords } => {
                write!(f, "sweeps the minefield at ({}, {})", coords.q, coords.r)
            }
            EventKind::SweeperCost { cost, remaining } => {
                write!(f, "sweeper absorbs {cost} ({remaining} armor left)")
            }
            EventKind::SweeperOverload { damage } => {
                write!(f, "sweeper overloads, {damage} damage carries through")
            }
            EventKind::DetonationRoll { coords, target, roll, hit } => {
                let outcome = if *hit { "detonates" } else { "stays quiet" };
                write!(
                    f,
                    "minefield at ({}, {}) {outcome} (needed {target}, rolled {roll})",
                    coords.q, coords.r
                )
            }
            EventKind::MineHit { coords } => {
                write!(f, "sets off a minefield at ({}, {})", coords.q, coords.r)
            }
            EventKind::InfernoMineHit { coords } => {
                write!(f, "sets off an inferno minefield at ({}, {})", coords.q, coords.r)
            }
            EventKind::VibrabombExplodes { coords } => {
                write!(f, "triggers a vibrabomb at ({}, {})", coords.q, coords.r)
            }
            EventKind::VibrabombDirectHit => write!(f, "is caught in the vibrabomb blast"),
            EventKind::MinefieldCleared { target, roll } => {
                write!(f, "clears the minefield (needed {target}, rolled {roll})")
            }
            EventKind::ClearBotched { target, roll } => {
                write!(f, "botches the clearing attempt (needed {target}, rolled {roll})")
            }
            EventKind::ClearFailed { target, roll } => {
                write!(f, "fails to clear the minefield (needed {target}, rolled {roll})")
            }
            EventKind::ClearCollateral => write!(f, "is caught in the accidental detonation"),
            EventKind::DamageApplied { location, amount } => {
                write!(f, "takes {amount} damage to {location}")
            }
            EventKind::UnitDestroyed { reason } => write!(f, "is destroyed ({reason})"),
            EventKind::MotiveDamage { severity } => write!(f, "motive system check: {severity:?}"),
            EventKind::StabilityCheck { target, roll, success } => {
                let outcome = if *success { "stays upright" } else { "goes down" };
                write!(f, "stability check: {outcome} (needed {target}, rolled {roll})")
            }
            EventKind::UnitFell => write!(f, "falls"),
            EventKind::InfernoDelivered { missiles } => {
                write!(f, "is splashed by {missiles} inferno missiles")
            }
        }
    }
}

/// One immutable narration record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub subject: Option<UnitId>,
    pub audience: Audience,
    pub kind: EventKind,
}

/// Ordered log of events from one resolution call
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a public event
    pub fn push(&mut self, subject: Option<UnitId>, kind: EventKind) {
        self.events.push(Event {
            subject,
            audience: Audience::Everyone,
            kind,
        });
    }

    /// Append an event only one player may see
    pub fn push_for(&mut self, player: PlayerId, subject: Option<UnitId>, kind: EventKind) {
        self.events.push(Event {
            subject,
            audience: Audience::Player(player),
            kind,
        });
    }

    /// Events visible to the given player
    pub fn visible_to(&self, player: PlayerId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| match e.audience {
            Audience::Everyone => true,
            Audience::Player(p) => p == player,
        })
    }
}
