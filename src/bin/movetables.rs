//! Move table inspector - query one square and measure lookup throughput
//!
//! Usage: cargo run --release --bin movetables -- \
//!          --square e4 --occupancy 0x0000001000100000 --opponent 0x0000001000000000 \
//!          --king e1 --positions 1000000 --threads 6 --verify

use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{bail, eyre, Result};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_tables::bitboard::{
    draw, parse_square, slide_attacks_slow, sq_rank, sq_to_bb, square_name, Bitboard,
    BitboardIter, LineFamily, Square, NO_SQUARE,
};
use chess_tables::{Move, MoveList, MoveSink, MoveTables};

#[derive(Parser, Debug)]
#[command(name = "movetables")]
#[command(about = "Build the precomputed move tables and query them")]
struct Args {
    /// Square to inspect
    #[arg(long, default_value = "e4")]
    square: String,

    /// Occupied squares as a hex bitboard (a1 = bit 0)
    #[arg(long, default_value = "0")]
    occupancy: String,

    /// Opponent pieces as a hex bitboard, restricted to the occupancy
    #[arg(long, default_value = "0")]
    opponent: String,

    /// Friendly king square, for pins
    #[arg(long)]
    king: Option<String>,

    /// Number of random positions for the throughput run
    #[arg(short, long, default_value_t = 1_000_000)]
    positions: usize,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Seed for the random positions
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Check every random position against a step-by-step ray walk
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    sq: Square,
    all: Bitboard,
    opponent: Bitboard,
    king: Square,
}

fn parse_bitboard(s: &str) -> Result<Bitboard> {
    let digits = s.trim_start_matches("0x").replace('_', "");
    u64::from_str_radix(&digits, 16).map_err(|e| eyre!("invalid bitboard {s:?}: {e}"))
}

fn parse_sq(s: &str) -> Result<Square> {
    parse_square(s).ok_or_else(|| eyre!("invalid square {s:?}"))
}

fn uci_list(moves: &[Move]) -> String {
    if moves.is_empty() {
        "-".to_string()
    } else {
        moves.iter().map(Move::to_uci).join(" ")
    }
}

fn random_positions(count: usize, seed: u64) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let sq = rng.gen_range(0..64u8);
            let all = (rng.gen::<u64>() & rng.gen::<u64>()) | sq_to_bb(sq);
            let opponent = all & rng.gen::<u64>() & !sq_to_bb(sq);
            let friendly: Vec<Square> = BitboardIter(all & !opponent & !sq_to_bb(sq)).collect();
            let king = if friendly.is_empty() {
                NO_SQUARE
            } else {
                friendly[rng.gen_range(0..friendly.len())]
            };
            Position {
                sq,
                all,
                opponent,
                king,
            }
        })
        .collect()
}

/// Every table a piece on `pos.sq` would hit during move generation
fn generate<S: MoveSink>(tables: &MoveTables, pos: &Position, sink: &mut S) {
    let Position {
        sq,
        all,
        opponent,
        king,
    } = *pos;
    tables.queen.append_moves(sq, all, opponent, sink);
    tables.knight.append_moves(sq, all, opponent, sink);
    if (2..=7).contains(&sq_rank(sq)) {
        tables.pawn.append_pinned_moves(sq, king, all, opponent, sink);
    }
}

fn inspect(tables: &MoveTables, pos: &Position) {
    let Position {
        sq,
        all,
        opponent,
        king,
    } = *pos;
    let hit = tables.rays.queen(sq, all, king);
    let king_name = if king == NO_SQUARE {
        "-".to_string()
    } else {
        square_name(king)
    };
    println!("Queen lines from {} (king {king_name}):", square_name(sq));
    println!("{}", draw(hit.attack, sq));
    let pinned = BitboardIter(hit.pinned).map(square_name).join(" ");
    println!("pinned: {}", if pinned.is_empty() { "-" } else { pinned.as_str() });
    println!(
        "squares seen: diagonal {}, straight {}",
        tables.rays.diagonal_square_count(sq, all),
        tables.rays.straight_square_count(sq, all)
    );

    let mut moves: Vec<Move> = Vec::new();
    tables.rook.append_moves(sq, all, opponent, &mut moves);
    println!("rook:   {}", uci_list(&moves));
    moves.clear();
    tables.bishop.append_moves(sq, all, opponent, &mut moves);
    println!("bishop: {}", uci_list(&moves));
    moves.clear();
    tables.queen.append_moves(sq, all, opponent, &mut moves);
    println!("queen:  {}", uci_list(&moves));
    moves.clear();
    tables.knight.append_moves(sq, all, opponent, &mut moves);
    println!("knight: {}", uci_list(&moves));
    if (2..=7).contains(&sq_rank(sq)) {
        moves.clear();
        tables.pawn.append_pinned_moves(sq, king, all, opponent, &mut moves);
        println!("pawn:   {}", uci_list(&moves));
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let sq = parse_sq(&args.square)?;
    let all = parse_bitboard(&args.occupancy)? | sq_to_bb(sq);
    let opponent = parse_bitboard(&args.opponent)? & all & !sq_to_bb(sq);
    let king = args.king.as_deref().map(parse_sq).transpose()?.unwrap_or(NO_SQUARE);

    let tables = MoveTables::shared();
    println!("{:#?}", tables.sizes());
    inspect(
        tables,
        &Position {
            sq,
            all,
            opponent,
            king,
        },
    );

    if args.positions == 0 {
        return Ok(());
    }
    let positions = random_positions(args.positions, args.seed);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()?;

    let start = Instant::now();
    let generated: usize = pool.install(|| {
        positions
            .par_chunks(4096)
            .map(|chunk| {
                let mut list = MoveList::new();
                let mut count = 0;
                for pos in chunk {
                    list.clear();
                    generate(tables, pos, &mut list);
                    count += list.len();
                }
                count
            })
            .sum()
    });
    let elapsed = start.elapsed();
    info!(
        threads = pool.current_num_threads(),
        positions = positions.len(),
        generated,
        ?elapsed,
        "throughput run finished"
    );
    println!(
        "{} moves from {} positions in {:.3}s ({:.1} M moves/s)",
        generated,
        positions.len(),
        elapsed.as_secs_f64(),
        generated as f64 / elapsed.as_secs_f64() / 1e6
    );

    if args.verify {
        let mismatches = pool.install(|| {
            positions
                .par_iter()
                .filter(|p| {
                    tables.rays.queen(p.sq, p.all, NO_SQUARE).attack
                        != slide_attacks_slow(p.sq, p.all, &LineFamily::ALL)
                })
                .count()
        });
        if mismatches > 0 {
            bail!("{mismatches} positions disagree with the ray walk");
        }
        println!("verified {} positions against the ray walk", positions.len());
    }
    Ok(())
}
