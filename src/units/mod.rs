//! Unit state: classes, movement, bays, tow links, damage pools
//!
//! Transport relationships are index-based back-references (`carried_by` /
//! bay occupants, `towed_by` / `tow_chain`). The mutation operations in
//! `game::state` keep both sides of each link consistent; constructors
//! never establish links.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::hex::{Facing, HexCoord};
use crate::board::terrain::{Hex, Terrain};
use crate::core::types::{PlayerId, UnitId};

/// Broad unit category, used for turn-slot class masks and legality rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Walker,
    /// Light walkers fielded in packs that share one turn per pack
    Exoframe,
    Infantry,
    Vehicle,
    Fighter,
    SmallCraft,
    Dropship,
    Jumpship,
    /// Fighter squadron: a docking container for fighters
    Squadron,
}

/// Movement mode, the terrain-interaction personality of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveMode {
    Biped,
    Foot,
    Tracked,
    Wheeled,
    Hover,
    Wige,
    Vtol,
    Naval,
    Hydrofoil,
    Submarine,
    /// Infantry with underwater flotation gear
    Amphibious,
    Aerodyne,
    Spheroid,
}

/// How the unit moved this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveType {
    #[default]
    None,
    Walk,
    Run,
    Jump,
}

/// Drive mode for convertible walkers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    Legs,
    Wheels,
}

/// Environmental exposure of a unit's locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Exposure {
    #[default]
    Normal,
    Wet,
    Underwater,
}

/// Crew aboard a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crew {
    pub size: u32,
    pub piloting: i32,
    pub gunnery: i32,
}

impl Default for Crew {
    fn default() -> Self {
        Self {
            size: 1,
            piloting: 5,
            gunnery: 4,
        }
    }
}

/// A transport bay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bay {
    pub capacity: u32,
    pub occupants: Vec<UnitId>,
}

impl Bay {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            occupants: Vec::new(),
        }
    }

    pub fn unused(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants.len() as u32)
    }
}

/// Mine-sweeping apparatus mounted on a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweeper {
    pub armor: i32,
    pub location: usize,
    pub destroyed: bool,
}

impl Sweeper {
    pub fn new(armor: i32, location: usize) -> Self {
        Self {
            armor,
            location,
            destroyed: false,
        }
    }

    /// Functional and with armor left to absorb a sweep
    pub fn is_ready(&self) -> bool {
        !self.destroyed && self.armor > 0
    }
}

/// Why a physical load or unload was refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("unit cannot carry itself")]
    SelfLoad,
    #[error("cargo is already aboard another carrier")]
    AlreadyCarried,
    #[error("no bay with free capacity")]
    NoCapacity,
    #[error("carrier and cargo are not at the same elevation")]
    ElevationMismatch,
    #[error("unit is not aboard this carrier")]
    NotCarried,
    #[error("unit is not tow-linked to this tractor")]
    NotTowed,
}

/// A board entity: anything that moves, carries, tows, or detonates mines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub owner: PlayerId,
    pub class: UnitClass,
    pub move_mode: MoveMode,
    /// Mass in tons
    pub weight: f32,
    pub crew: Crew,

    // Position; `None` while carried aboard another unit
    pub position: Option<HexCoord>,
    pub elevation: i32,
    pub altitude: i32,
    pub facing: Facing,
    pub sec_facing: Facing,

    // Turn state
    pub deployed: bool,
    pub deploy_round: u32,
    pub done: bool,
    pub unloaded_this_turn: bool,
    pub moved: MoveType,
    pub mp_used: u32,
    pub walk_mp: u32,
    pub jump_mp: u32,
    pub delta_distance: u32,
    /// Shared-turn pack this unit belongs to (exoframe packs)
    pub turn_group: Option<u16>,

    // Aerospace state
    pub velocity: i32,
    pub next_velocity: i32,
    pub vectors: [i32; 6],
    pub out_of_control: bool,
    pub gear_hit: bool,

    // Transport links
    pub carried_by: Option<UnitId>,
    pub bays: Vec<Bay>,
    pub passengers: u32,
    pub towed_by: Option<UnitId>,
    /// Every trailer transitively behind this unit, in hitch order
    pub tow_chain: Vec<UnitId>,

    // Damage pools
    pub armor: Vec<i32>,
    pub structure: i32,
    pub destroyed: bool,
    pub prone: bool,
    pub immobilized: bool,
    pub motive_penalty: u32,
    pub heat: u32,

    // Equipment and traits
    pub sweeper: Option<Sweeper>,
    pub bomb_load: Vec<u32>,
    pub keen_sensors: bool,
    pub mechanized: bool,
    pub flotation_hull: bool,
    /// Dismounted-skill target for rappel checks
    pub antimek: i32,
    pub drive_mode: Option<DriveMode>,
    pub converting: bool,

    pub clearing_minefield: bool,
    pub exposure: Exposure,
}

/// Location names per class; armor pools are indexed in this order
pub fn location_names(class: UnitClass) -> &'static [&'static str] {
    match class {
        UnitClass::Walker | UnitClass::Exoframe => &[
            "head",
            "center torso",
            "left torso",
            "right torso",
            "left arm",
            "right arm",
            "left leg",
            "right leg",
        ],
        UnitClass::Vehicle => &["front", "left side", "right side", "rear", "turret"],
        UnitClass::Infantry => &["squad"],
        UnitClass::Fighter | UnitClass::Squadron => &["nose", "left wing", "right wing", "aft"],
        UnitClass::SmallCraft | UnitClass::Dropship | UnitClass::Jumpship => {
            &["nose", "left side", "right side", "aft"]
        }
    }
}

impl Unit {
    pub fn new(id: UnitId, name: impl Into<String>, owner: PlayerId, class: UnitClass) -> Self {
        let locations = location_names(class).len();
        let move_mode = match class {
            UnitClass::Walker | UnitClass::Exoframe => MoveMode::Biped,
            UnitClass::Infantry => MoveMode::Foot,
            UnitClass::Vehicle => MoveMode::Tracked,
            UnitClass::Fighter | UnitClass::SmallCraft | UnitClass::Squadron => MoveMode::Aerodyne,
            UnitClass::Dropship | UnitClass::Jumpship => MoveMode::Spheroid,
        };
        Self {
            id,
            name: name.into(),
            owner,
            class,
            move_mode,
            weight: 50.0,
            crew: Crew::default(),
            position: None,
            elevation: 0,
            altitude: 0,
            facing: Facing::default(),
            sec_facing: Facing::default(),
            deployed: false,
            deploy_round: 0,
            done: false,
            unloaded_this_turn: false,
            moved: MoveType::None,
            mp_used: 0,
            walk_mp: 4,
            jump_mp: 0,
            delta_distance: 0,
            turn_group: None,
            velocity: 0,
            next_velocity: 0,
            vectors: [0; 6],
            out_of_control: false,
            gear_hit: false,
            carried_by: None,
            bays: Vec::new(),
            passengers: 0,
            towed_by: None,
            tow_chain: Vec::new(),
            armor: vec![8; locations],
            structure: 10,
            destroyed: false,
            prone: false,
            immobilized: false,
            motive_penalty: 0,
            heat: 0,
            sweeper: None,
            bomb_load: Vec::new(),
            keen_sensors: false,
            mechanized: false,
            flotation_hull: false,
            antimek: 8,
            drive_mode: None,
            converting: false,
            clearing_minefield: false,
            exposure: Exposure::default(),
        }
    }

    pub fn is_aero(&self) -> bool {
        matches!(
            self.class,
            UnitClass::Fighter
                | UnitClass::SmallCraft
                | UnitClass::Dropship
                | UnitClass::Jumpship
                | UnitClass::Squadron
        )
    }

    /// Dropships and jumpships: crews of carried units don't count as
    /// passengers aboard these
    pub fn is_large_craft(&self) -> bool {
        matches!(self.class, UnitClass::Dropship | UnitClass::Jumpship)
    }

    /// Carrier classes that track a passenger manifest
    pub fn tracks_passengers(&self) -> bool {
        matches!(
            self.class,
            UnitClass::SmallCraft | UnitClass::Dropship | UnitClass::Jumpship
        )
    }

    pub fn is_infantry(&self) -> bool {
        self.class == UnitClass::Infantry
    }

    /// Ground-contact legged movement: the only thing that sets off
    /// vibrabombs. Convertible walkers rolling on wheels don't qualify
    /// unless mid-conversion (conversion is leg movement).
    pub fn triggers_vibrabombs(&self) -> bool {
        if !matches!(self.class, UnitClass::Walker) {
            return false;
        }
        !(self.drive_mode == Some(DriveMode::Wheels) && !self.converting)
    }

    /// Can this unit stay on a water surface?
    pub fn can_float(&self) -> bool {
        matches!(
            self.move_mode,
            MoveMode::Hover
                | MoveMode::Wige
                | MoveMode::Hydrofoil
                | MoveMode::Naval
                | MoveMode::Submarine
        ) || (self.is_infantry() && self.move_mode == MoveMode::Amphibious)
    }

    /// Can a ground unit rest at `elevation` (relative to the hex surface)?
    pub fn elevation_valid(&self, elevation: i32, hex: &Hex) -> bool {
        let bottom = hex.floor() - hex.level;
        if elevation == bottom {
            return true;
        }
        if elevation == 0
            && (hex.contains_terrain(Terrain::Ice) || hex.contains_terrain(Terrain::Bridge))
        {
            return true;
        }
        elevation == 0 && hex.depth() > 0 && self.can_float()
    }

    /// First bay with free space, preferring the requested bay
    pub fn pick_bay(&self, requested: Option<usize>) -> Option<usize> {
        if let Some(idx) = requested {
            if self.bays.get(idx).map(|b| b.unused() > 0).unwrap_or(false) {
                return Some(idx);
            }
            return None;
        }
        self.bays.iter().position(|b| b.unused() > 0)
    }

    /// Bay index holding the given unit
    pub fn bay_of(&self, unit: UnitId) -> Option<usize> {
        self.bays.iter().position(|b| b.occupants.contains(&unit))
    }

    /// All units aboard, across bays
    pub fn carried_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.bays.iter().flat_map(|b| b.occupants.iter().copied())
    }

    /// Ready minesweeper, if mounted
    pub fn ready_sweeper(&self) -> Option<&Sweeper> {
        self.sweeper.as_ref().filter(|s| s.is_ready())
    }

    /// Height in elevation steps above the unit's own elevation
    pub fn height(&self) -> i32 {
        match self.class {
            UnitClass::Walker => 1,
            _ => 0,
        }
    }

    /// Still eligible to act this turn
    pub fn is_selectable(&self) -> bool {
        !self.done && !self.destroyed
    }

    /// Total armor remaining
    pub fn total_armor(&self) -> i32 {
        self.armor.iter().sum()
    }
}
