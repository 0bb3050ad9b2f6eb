#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, info};
use sparse_life::life106;
use sparse_life::{Board, EngineConfig, GenerationRuleEngine, TraversalOrder};

const DEFAULT_GENERATIONS: u64 = 10;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    /// Unsigned word order: non-negative coordinates before negative ones.
    Packed,
    /// Plain numeric (row, col) order.
    Numeric,
}

impl From<Order> for TraversalOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Packed => TraversalOrder::Packed,
            Order::Numeric => TraversalOrder::Numeric,
        }
    }
}

/// Run Conway's Game of Life on a Life 1.06 pattern and print the result.
#[derive(Debug, Parser)]
#[command(name = "sparse-life", version)]
struct Args {
    /// Life 1.06 input file; standard input when omitted.
    input: Option<PathBuf>,

    /// Number of generations to run.
    #[arg(short = 'n', long, default_value_t = DEFAULT_GENERATIONS)]
    generations: u64,

    /// Neighbor memo capacity used during each generation.
    #[arg(long, default_value_t = sparse_life::sparselife::DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// Output order of the final cells.
    #[arg(long, value_enum, default_value_t = Order::Packed)]
    order: Order,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn load(input: Option<&PathBuf>, board: &mut Board) -> Result<usize> {
    match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            life106::read_board(BufReader::new(file), board)
                .with_context(|| format!("reading {}", path.display()))
        }
        None => life106::read_board(io::stdin().lock(), board).context("reading standard input"),
    }
}

fn run(args: Args) -> Result<()> {
    let mut board = Board::with_order(args.order.into());
    let seeded = load(args.input.as_ref(), &mut board)?;
    info!("loaded {seeded} cells ({} live)", board.size());

    let config = EngineConfig::default().cache_capacity(args.cache_capacity);
    let mut engine = GenerationRuleEngine::with_config(config);
    let start = Instant::now();
    engine.step_n(&mut board, args.generations);
    info!(
        "ran {} generations in {:.3} ms, population {}",
        engine.generation(),
        start.elapsed().as_secs_f64() * 1000.0,
        board.size()
    );

    let out = BufWriter::new(io::stdout().lock());
    life106::write_board(&mut board, out).context("writing board")?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    simple_logger::SimpleLogger::new()
        .with_level(level_for(args.verbose))
        .init()
        .expect("logger installed once");

    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
