//! Turn queue: ordered pending-action slots
//!
//! Slots are either unit-specific or class-masked. Class-masked slots are
//! consumed by any eligible unit of a matching category, which is how
//! launched fighters get a turn without another unit type stealing it.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::units::{Unit, UnitClass};

/// Category filter for class-masked turn slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMask(u16);

impl ClassMask {
    pub const WALKER: ClassMask = ClassMask(1 << 0);
    pub const EXOFRAME: ClassMask = ClassMask(1 << 1);
    pub const INFANTRY: ClassMask = ClassMask(1 << 2);
    pub const VEHICLE: ClassMask = ClassMask(1 << 3);
    pub const FIGHTER: ClassMask = ClassMask(1 << 4);
    pub const SMALL_CRAFT: ClassMask = ClassMask(1 << 5);
    pub const DROPSHIP: ClassMask = ClassMask(1 << 6);
    pub const JUMPSHIP: ClassMask = ClassMask(1 << 7);

    /// Mask matching exactly one unit class
    pub fn of(class: UnitClass) -> Self {
        match class {
            UnitClass::Walker => Self::WALKER,
            UnitClass::Exoframe => Self::EXOFRAME,
            UnitClass::Infantry => Self::INFANTRY,
            UnitClass::Vehicle => Self::VEHICLE,
            UnitClass::Fighter | UnitClass::Squadron => Self::FIGHTER,
            UnitClass::SmallCraft => Self::SMALL_CRAFT,
            UnitClass::Dropship => Self::DROPSHIP,
            UnitClass::Jumpship => Self::JUMPSHIP,
        }
    }

    pub fn union(self, other: ClassMask) -> Self {
        ClassMask(self.0 | other.0)
    }

    pub fn matches(&self, class: UnitClass) -> bool {
        self.0 & Self::of(class).0 != 0
    }
}

/// What a slot will accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Only the named unit may take this turn
    Unit(UnitId),
    /// Any eligible unit of a matching category owned by the slot's player
    Class(ClassMask),
}

/// One pending turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSlot {
    pub player: PlayerId,
    pub kind: SlotKind,
}

impl TurnSlot {
    pub fn for_unit(player: PlayerId, unit: UnitId) -> Self {
        Self {
            player,
            kind: SlotKind::Unit(unit),
        }
    }

    pub fn for_class(player: PlayerId, mask: ClassMask) -> Self {
        Self {
            player,
            kind: SlotKind::Class(mask),
        }
    }

    /// Could this unit take this slot?
    pub fn accepts(&self, unit: &Unit) -> bool {
        if unit.owner != self.player {
            return false;
        }
        match self.kind {
            SlotKind::Unit(id) => id == unit.id,
            SlotKind::Class(mask) => mask.matches(unit.class),
        }
    }
}

/// Ordered queue of pending turns for the current phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnQueue {
    pub slots: Vec<TurnSlot>,
    /// Index of the turn currently being processed
    pub index: usize,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, slot: TurnSlot) {
        self.slots.push(slot);
    }

    /// Remove the *last* pending turn this unit could take
    ///
    /// Removing the first would penalize opponents who planned around the
    /// existing order; removing the last disturbs the least.
    pub fn remove_last_for(&mut self, unit: &Unit) -> bool {
        let floor = self.index.min(self.slots.len());
        for i in (floor..self.slots.len()).rev() {
            if self.slots[i].accepts(unit) {
                self.slots.remove(i);
                return true;
            }
        }
        false
    }

    /// First slot index at or after `from` that the unit could take
    pub fn first_accepting_at(&self, unit: &Unit, from: usize) -> usize {
        let mut idx = from;
        while idx < self.slots.len() {
            if self.slots[idx].accepts(unit) {
                break;
            }
            idx += 1;
        }
        idx
    }

    /// Insert a slot at the given position (appends when past the end)
    pub fn insert_at(&mut self, index: usize, slot: TurnSlot) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, slot);
    }
}
