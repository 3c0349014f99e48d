//! Narrow damage-and-checks library used by resolution paths
//!
//! Hit-location rolls, chunked damage application, control and stability
//! checks, motive-system damage, inferno delivery. Everything rolls
//! through the injected dice source.

use crate::board::terrain::Hex;
use crate::core::dice::Dice;
use crate::game::events::{EventKind, EventLog, MotiveSeverity};
use crate::units::{location_names, Exposure, Unit, UnitClass};

/// A roll target assembled from a base value plus named modifiers
///
/// Additive all the way down; the description keeps narration honest.
#[derive(Debug, Clone)]
pub struct RollTarget {
    pub base: i32,
    mods: Vec<(i32, String)>,
}

impl RollTarget {
    pub fn new(base: i32) -> Self {
        Self {
            base,
            mods: Vec::new(),
        }
    }

    pub fn add_modifier(&mut self, value: i32, why: impl Into<String>) {
        self.mods.push((value, why.into()));
    }

    pub fn value(&self) -> i32 {
        self.base + self.mods.iter().map(|(v, _)| v).sum::<i32>()
    }

    pub fn describe(&self) -> String {
        let mut out = format!("{}", self.base);
        for (v, why) in &self.mods {
            out.push_str(&format!(" {v:+} ({why})"));
        }
        out
    }
}

/// Which hit table to roll on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTable {
    Standard,
    /// Ground-level hits (mine blasts): biased to the legs of walkers
    Ground,
}

/// Roll a hit location index for the unit
pub fn roll_hit_location(dice: &mut dyn Dice, unit: &Unit, table: HitTable) -> usize {
    let count = unit.armor.len();
    if count <= 1 {
        return 0;
    }
    let roll = dice.roll_2d6() as usize;
    match (table, unit.class) {
        (HitTable::Ground, UnitClass::Walker | UnitClass::Exoframe) => {
            // Legs are the last two locations
            count - 2 + (roll % 2)
        }
        _ => roll % count,
    }
}

/// Apply damage to one location; spillover eats internal structure
///
/// Returns `true` if the unit was destroyed by this hit.
pub fn apply_damage(unit: &mut Unit, log: &mut EventLog, location: usize, amount: i32) -> bool {
    let location = location.min(unit.armor.len().saturating_sub(1));
    let name = location_names(unit.class)
        .get(location)
        .copied()
        .unwrap_or("hull");
    log.push(Some(unit.id), EventKind::DamageApplied { location: name, amount });

    let absorbed = unit.armor[location].min(amount);
    unit.armor[location] -= absorbed;
    let spill = amount - absorbed;
    if spill > 0 {
        unit.structure -= spill;
    }
    if unit.structure <= 0 && !unit.destroyed {
        unit.destroyed = true;
        log.push(
            Some(unit.id),
            EventKind::UnitDestroyed {
                reason: "structural collapse".into(),
            },
        );
        return true;
    }
    false
}

/// Apply `total` damage in fixed-size chunks, one hit location per chunk
///
/// A fixed location (a mounted sweeper) pins every chunk to that spot.
pub fn apply_chunked_damage(
    unit: &mut Unit,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    total: i32,
    chunk: i32,
    table: HitTable,
    fixed_location: Option<usize>,
) -> bool {
    let mut remaining = total;
    let mut destroyed = false;
    while remaining > 0 && !destroyed {
        let cur = remaining.min(chunk);
        remaining -= cur;
        let location = fixed_location.unwrap_or_else(|| roll_hit_location(dice, unit, table));
        destroyed = apply_damage(unit, log, location, cur);
    }
    destroyed
}

/// Base control check target for the unit's crew
pub fn base_control_target(unit: &Unit) -> RollTarget {
    RollTarget::new(unit.crew.piloting)
}

/// Stability check after a blast under the unit's feet
///
/// Failure drops the unit prone and applies fall damage scaled to weight.
pub fn stability_check(
    unit: &mut Unit,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    target: &RollTarget,
) -> bool {
    let roll = dice.roll_2d6();
    let success = roll >= target.value();
    log.push(
        Some(unit.id),
        EventKind::StabilityCheck {
            target: target.value(),
            roll,
            success,
        },
    );
    if !success {
        unit.prone = true;
        log.push(Some(unit.id), EventKind::UnitFell);
        let fall = ((unit.weight / 10.0).ceil() as i32).max(1);
        let location = roll_hit_location(dice, unit, HitTable::Standard);
        apply_damage(unit, log, location, fall);
    }
    success
}

/// Motive-system check for ground vehicles caught in a blast
pub fn motive_check(unit: &mut Unit, dice: &mut dyn Dice, log: &mut EventLog, modifier: i32) {
    let roll = dice.roll_2d6() + modifier;
    let severity = match roll {
        i32::MIN..=5 => MotiveSeverity::None,
        6..=7 => MotiveSeverity::Minor,
        8..=9 => MotiveSeverity::Moderate,
        10..=11 => MotiveSeverity::Heavy,
        _ => MotiveSeverity::Immobilized,
    };
    match severity {
        MotiveSeverity::None => {}
        MotiveSeverity::Minor => unit.motive_penalty += 1,
        MotiveSeverity::Moderate => unit.motive_penalty += 2,
        MotiveSeverity::Heavy => unit.motive_penalty += 3,
        MotiveSeverity::Immobilized => unit.immobilized = true,
    }
    log.push(Some(unit.id), EventKind::MotiveDamage { severity });
}

/// Splash a unit with inferno warheads
///
/// Heat-tracking frames soak it as heat; everything else burns.
pub fn deliver_inferno_missiles(
    unit: &mut Unit,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    missiles: u32,
) {
    log.push(Some(unit.id), EventKind::InfernoDelivered { missiles });
    match unit.class {
        UnitClass::Walker | UnitClass::Exoframe => {
            unit.heat += 2 * missiles;
        }
        _ => {
            apply_chunked_damage(
                unit,
                dice,
                log,
                (2 * missiles) as i32,
                2,
                HitTable::Standard,
                None,
            );
        }
    }
}

/// Update environmental exposure for a unit's new elevation
pub fn set_location_exposure(unit: &mut Unit, hex: &Hex, elevation: i32) {
    unit.exposure = if hex.depth() > 0 && elevation < 0 {
        Exposure::Underwater
    } else if hex.depth() > 0 && elevation == 0 {
        Exposure::Wet
    } else {
        Exposure::Normal
    };
}
