//! Headless skirmish runner
//!
//! Sets up a small scripted engagement (a dropship discharging cargo onto
//! a mined ground map), runs the transport and minefield resolution paths,
//! and prints the narration. Deterministic under a fixed seed.

use clap::Parser;

use hexfall::board::hex::{Facing, HexCoord};
use hexfall::board::terrain::{Hex, Terrain};
use hexfall::board::Board;
use hexfall::core::config::RulesConfig;
use hexfall::core::dice::SeededDice;
use hexfall::core::types::{GamePhase, PlayerId, TeamId, UnitId};
use hexfall::game::events::EventLog;
use hexfall::game::state::{GameState, Player};
use hexfall::minefield::clearing::reset_mines;
use hexfall::minefield::entry::enter_minefield;
use hexfall::minefield::{MineKind, Minefield};
use hexfall::transport::{drop_unit, load_unit};
use hexfall::units::{Bay, Sweeper, Unit, UnitClass};

/// Headless skirmish runner for the resolution engine
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a scripted drop-and-minefield skirmish")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Optional rules config (TOML)
    #[arg(long)]
    rules: Option<std::path::PathBuf>,

    /// Map edge length in hexes
    #[arg(long, default_value_t = 20)]
    map_size: i32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("skirmish=info,hexfall=debug")
        .init();

    let args = Args::parse();
    let rules = match &args.rules {
        Some(path) => RulesConfig::load(path).expect("rules config should parse"),
        None => RulesConfig::default(),
    };
    rules.validate().expect("rules config should validate");

    let mut state = GameState::new(Board::flat(args.map_size, args.map_size));
    state.rules = rules;
    state.phase = GamePhase::Setup;
    state.add_player(Player::new(PlayerId(0), "attacker", Some(TeamId(0))));
    state.add_player(Player::new(PlayerId(1), "defender", Some(TeamId(1))));

    let center = HexCoord::new(args.map_size / 2, args.map_size / 2);

    // Defender mines the landing zone
    let mined = center.translated(Facing::from_index(0), 2);
    state.board.set_hex(
        mined.translated(Facing::from_index(1), 1),
        Hex::new(0).with_terrain(Terrain::Rough, 1),
    );
    state.minefields.add(Minefield::new(
        hexfall::core::types::MinefieldId(0),
        mined,
        MineKind::Conventional,
        PlayerId(1),
        15,
    ));

    // Attacker brings a dropship with a sweeper-equipped walker aboard
    let mut ship = Unit::new(UnitId(0), "dropship", PlayerId(0), UnitClass::Dropship);
    ship.bays.push(Bay::new(4));
    ship.position = Some(center);
    state.add_unit(ship);
    let mut walker = Unit::new(UnitId(1), "vanguard", PlayerId(0), UnitClass::Walker);
    walker.sweeper = Some(Sweeper::new(8, 6));
    state.add_unit(walker);

    let mut dice = SeededDice::new(args.seed);
    let mut log = EventLog::new();

    if !load_unit(&mut state, &mut log, UnitId(0), UnitId(1), None) {
        tracing::warn!("load refused, aborting scenario");
        return;
    }
    state.phase = GamePhase::Movement;

    drop_unit(&mut state, UnitId(1), UnitId(0), Some(center), 0);
    let landing = state
        .unit(UnitId(1))
        .and_then(|u| u.position)
        .expect("dropped unit should be placed");
    tracing::info!(q = landing.q, r = landing.r, "vanguard down");

    let tripped = enter_minefield(&mut state, &mut dice, &mut log, UnitId(1), mined, 0, true, None);
    tracing::info!(tripped, "minefield entry resolved");

    reset_mines(&mut state, &mut dice);

    println!("--- narration ---");
    for event in &log.events {
        match event.subject {
            Some(id) => {
                let name = state
                    .unit(id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| format!("unit {}", id.0));
                println!("{name} {}", event.kind);
            }
            None => println!("{}", event.kind),
        }
    }

    println!("--- observer traffic ---");
    for note in &state.outbox {
        println!("{note:?}");
    }
}
