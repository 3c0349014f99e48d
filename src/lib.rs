//! Hexfall - transport and minefield resolution for hex-grid combat

pub mod board;
pub mod combat;
pub mod core;
pub mod game;
pub mod minefield;
pub mod transport;
pub mod units;
