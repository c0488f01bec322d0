//! Replay, extend, and inspect time-travel chess games.
//!
//! Run with:
//! `cargo run --release --bin ttc-replay -- --moves game.json --goto 12`
//! `cargo run --release --bin ttc-replay -- --random 40 --seed 7 --pgn`
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ttc_chess::game::ply_history::{Game, GameRecord};
use ttc_chess::game_state::chess_types::{Color, PieceCode, ALL_ROLES};
use ttc_chess::utils::move_list::{read_record_json, write_game_json, write_pgn};
use ttc_chess::utils::random_playout::random_legal_move;
use ttc_chess::utils::snapshot_generator::Snapshot;

#[derive(Debug, Parser)]
#[command(name = "ttc-replay", about = "Time-travel chess game replay tool")]
struct Args {
    /// JSON move list: a bare array of moves or a {"start", "moves"} record
    #[arg(long)]
    moves: Option<PathBuf>,

    /// Start snapshot, overriding the one stored in the move list
    #[arg(long)]
    start: Option<String>,

    /// Extend the game by this many random legal plies
    #[arg(long, default_value_t = 0)]
    random: usize,

    /// Seed for --random (deterministic)
    #[arg(long, default_value_t = 0x00C0FFEEu64)]
    seed: u64,

    /// Ply to display after replaying (defaults to the tip)
    #[arg(long)]
    goto: Option<usize>,

    /// Print a PGN-like export of the game
    #[arg(long)]
    pgn: bool,

    /// Print the game as a JSON record
    #[arg(long)]
    json: bool,
}

fn load_record(args: &Args) -> Result<GameRecord, Box<dyn Error>> {
    let mut record = match &args.moves {
        Some(path) => read_record_json(&std::fs::read_to_string(path)?)?,
        None => GameRecord {
            start: None,
            moves: Vec::new(),
        },
    };
    if let Some(start) = &args.start {
        record.start = Some(Snapshot::from(start.clone()));
    }
    Ok(record)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let record = load_record(&args)?;
    let mut game = Game::from_record(&record)?;
    info!(plies = game.len(), "replayed move list");

    let mut rng = StdRng::seed_from_u64(args.seed);
    for _ in 0..args.random {
        let Some(mv) = random_legal_move(game.board(), &mut rng) else {
            info!(ply = game.ply(), "no legal moves left");
            break;
        };
        game.make_move(&mv)?;
    }

    if let Some(ply) = args.goto {
        game.goto_ply(ply)?;
    }

    println!("{}", game.board());
    println!("snapshot: {}", game.board().to_snapshot());
    println!("ply {}/{}", game.ply(), game.len());
    if let Some(mv) = game.last_move() {
        println!("last move: {mv:?}");
    }
    let panel: Vec<String> = [Color::White, Color::Black]
        .into_iter()
        .flat_map(|color| ALL_ROLES.map(|role| PieceCode::new(color, role)))
        .filter_map(|code| {
            let total = game.board().blink_total(code);
            (total > 0).then(|| format!("{code}x{total}"))
        })
        .collect();
    if !panel.is_empty() {
        println!("traces: {}", panel.join(" "));
    }
    if !game.notation().is_empty() {
        println!("moves: {}", game.notation().join(" "));
    }
    if game.can_claim_draw()? {
        println!("a draw can be claimed");
    }

    if args.pgn {
        print!("{}", write_pgn(&game)?);
    }
    if args.json {
        println!("{}", write_game_json(&game)?);
    }
    Ok(())
}
