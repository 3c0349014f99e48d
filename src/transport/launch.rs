//! Aerospace launch and landing
//!
//! Launching skips terrain elevation entirely: the launched unit takes the
//! carrier's velocity and explicit vectors, then gets a class-masked turn
//! spliced into the queue so the canonical space order (capital ships,
//! small craft, dropships, fighters) survives.

use crate::board::hex::{Facing, HexCoord};
use crate::board::terrain::Terrain;
use crate::combat::{apply_chunked_damage, apply_damage, roll_hit_location, HitTable, RollTarget};
use crate::core::dice::Dice;
use crate::core::types::{RemovalCondition, UnitId};
use crate::game::events::{EventKind, EventLog};
use crate::game::state::GameState;
use crate::game::turns::{ClassMask, TurnSlot};
use crate::units::UnitClass;

/// Launch a carried aerospace unit from an airborne carrier
///
/// `bonus` above zero means the safe launch rate was exceeded and every
/// such unit rolls a control check on the way out. Returns false for
/// non-aero pairs, stations, or cargo that isn't aboard.
#[allow(clippy::too_many_arguments)]
pub fn launch_unit(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    carrier_id: UnitId,
    unit_id: UnitId,
    pos: Option<HexCoord>,
    facing: Facing,
    velocity: i32,
    altitude: i32,
    vectors: [i32; 6],
    bonus: i32,
) -> bool {
    let Some(carrier) = state.unit(carrier_id) else {
        return false;
    };
    if !carrier.is_aero() {
        return false;
    }
    let (carrier_ooc, carrier_velocity) = (carrier.out_of_control, carrier.velocity);

    let Some(unit) = state.unit(unit_id) else {
        return false;
    };
    // Fighters, small craft, and dropships launch; stations don't
    if !unit.is_aero() || unit.class == UnitClass::Jumpship {
        return false;
    }

    if !state.unload_from(carrier_id, unit_id) {
        return false;
    }

    let mut destroyed = false;
    state.with_unit_mut(unit_id, |state, unit| {
        unit.unloaded_this_turn = false;
        unit.position = pos;
        if pos.is_some() {
            unit.deployed = true;
        }
        unit.facing = facing;
        unit.sec_facing = facing;
        // Launched units inherit the carrier's motion
        unit.velocity = velocity;
        unit.next_velocity = velocity;
        unit.vectors = vectors;
        unit.altitude = altitude;
        unit.done = false;

        if bonus > 0 {
            let mut target = RollTarget::new(unit.crew.piloting);
            target.add_modifier(bonus, "safe launch rate exceeded");
            let roll = dice.roll_2d6();
            let success = roll >= target.value();
            log.push(
                Some(unit.id),
                EventKind::LaunchCheck {
                    target: target.value(),
                    roll,
                    success,
                },
            );
            if !success {
                let damage = 10 * (target.value() - roll);
                let location = roll_hit_location(dice, unit, HitTable::Standard);
                destroyed = apply_damage(unit, log, location, damage);
            }
        } else {
            log.push(Some(unit.id), EventKind::Launched);
        }

        // Launching from an out-of-control carrier hurts; so does leaving
        // at speed inside an atmosphere
        if (carrier_ooc && !unit.destroyed)
            || (carrier_velocity > 2 && !state.board.in_space())
        {
            let roll = dice.roll_2d6();
            let damage = roll * 10;
            log.push(Some(unit.id), EventKind::LaunchStress { damage });
            let location = roll_hit_location(dice, unit, HitTable::Standard);
            destroyed = apply_damage(unit, log, location, damage) || destroyed;
        }
    });

    if destroyed {
        state.move_to_graveyard(unit_id, RemovalCondition::Salvageable);
    }
    state.unit_update(unit_id);

    // Splice in a class-masked turn so nothing else can consume it, at the
    // first position where this unit's category already acts
    let Some(unit) = state.unit(unit_id) else {
        return true;
    };
    let mask = match unit.class {
        UnitClass::Dropship => ClassMask::of(UnitClass::Dropship),
        UnitClass::SmallCraft => ClassMask::of(UnitClass::SmallCraft),
        _ => ClassMask::of(UnitClass::Fighter),
    };
    let owner = unit.owner;
    let insert_at = state.turns.first_accepting_at(unit, state.turns.index + 1);
    state
        .turns
        .insert_at(insert_at, TurnSlot::for_class(owner, mask));
    state.broadcast_turns();

    true
}

/// Landing control check
///
/// On a failed roll the unit takes 10 damage per point of shortfall,
/// applied in 10-point chunks at rolled hit locations.
pub fn attempt_landing(
    state: &mut GameState,
    dice: &mut dyn Dice,
    log: &mut EventLog,
    unit_id: UnitId,
    target: &RollTarget,
) {
    // A 2d6 roll can't miss a target of 2 or less
    if target.value() <= 2 {
        return;
    }
    state.with_unit_mut(unit_id, |_, unit| {
        let roll = dice.roll_2d6();
        let success = roll >= target.value();
        log.push(
            Some(unit.id),
            EventKind::LandingCheck {
                target: target.value(),
                roll,
                success,
            },
        );
        if !success {
            let margin = target.value() - roll;
            let damage = 10 * margin;
            log.push(Some(unit.id), EventKind::LandingDamage { damage, margin });
            apply_chunked_damage(unit, dice, log, damage, 10, HitTable::Standard, None);
        }
    });
}

/// Terrain consequences of a landing run
///
/// Rolling across rough or rubble damages the landing gear. Coming to rest
/// in deep water destroys anything without a flotation hull, with a pass
/// for heavy dropships in shallow water.
pub fn check_landing_terrain_effects(
    state: &mut GameState,
    log: &mut EventLog,
    unit_id: UnitId,
    vertical: bool,
    touchdown: HexCoord,
    final_pos: HexCoord,
    facing: Facing,
) {
    let mut landing_path = vec![touchdown];
    if !vertical {
        landing_path.push(touchdown.translated(facing, 1));
        landing_path.push(touchdown.translated(facing, 2));
    }
    let rough_landing = landing_path.iter().any(|c| {
        state
            .board
            .hex(*c)
            .map(|h| h.contains_terrain(Terrain::Rough) || h.contains_terrain(Terrain::Rubble))
            .unwrap_or(false)
    });
    if rough_landing {
        if let Some(unit) = state.unit_mut(unit_id) {
            unit.gear_hit = true;
        }
        log.push(Some(unit_id), EventKind::GearDamaged);
    }

    let Some(hex) = state.board.hex(final_pos) else {
        return;
    };
    let deep_water = hex.contains_terrain(Terrain::Water)
        && !hex.contains_terrain(Terrain::Ice)
        && hex.depth() > 0;
    if !deep_water {
        return;
    }
    let Some(unit) = state.unit(unit_id) else {
        return;
    };
    if unit.flotation_hull {
        return;
    }
    if hex.depth() > 1 || unit.class != UnitClass::Dropship {
        log.push(Some(unit_id), EventKind::SunkInWater);
        log.push(
            Some(unit_id),
            EventKind::UnitDestroyed {
                reason: "landed in deep water".into(),
            },
        );
        state.move_to_graveyard(unit_id, RemovalCondition::Salvageable);
    }
}
