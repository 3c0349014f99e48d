//! Transport coordination: load, tow, disconnect, unload, launch, drop
//!
//! State transitions for one unit carrying or pulling another, with their
//! legality, placement, and turn-order consequences.

pub mod airdrop;
pub mod launch;
pub mod loading;
pub mod unloading;

pub use airdrop::drop_unit;
pub use launch::{attempt_landing, check_landing_terrain_effects, launch_unit};
pub use loading::{disconnect_unit, load_unit, tow_unit};
pub use unloading::unload_unit;
