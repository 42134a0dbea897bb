use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
};
use tracing::Level;

use crate::{
    config::{ReplayConfig, SimConfig},
    orderbook::OrderBook,
    orders::Side,
    price::{DEFAULT_SCALE, PriceScaler},
    replay::{ReplaySummary, replay, replay_events},
    simulate,
};

/// Passive-order fill simulator for backtesting against historical quotes and trades
#[derive(Parser, Debug)]
#[command(name = "passive-fill-sim")]
#[command(
    version = "0.1",
    about = "Replays quote/trade/order events and reports simulated maker fills"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print the strategy's remaining resting orders after the run
    #[arg(long)]
    book: bool,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON-lines event file
    Replay {
        /// Event file, one JSON event per line
        input: PathBuf,

        /// Fixed-point multiplier for decimal prices and sizes
        #[arg(long, default_value_t = DEFAULT_SCALE)]
        scale: i64,

        /// Accept timestamps that go backwards
        #[arg(long)]
        allow_unordered: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a synthetic tape and run it through the book
    Simulate {
        /// Number of market events to generate
        #[arg(long, default_value_t = 1_000)]
        steps: usize,

        /// RNG seed
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Gaussian mid drift per step, in ticks
        #[arg(long, default_value_t = 0.3)]
        noise_sigma: f64,

        /// Probability a step is a trade print
        #[arg(long, default_value_t = 0.4)]
        trade_prob: f64,

        /// Initial mid price
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,

        /// Price increment
        #[arg(long, default_value_t = 0.5)]
        tick: f64,

        /// Average quoted / traded size
        #[arg(long, default_value_t = 5.0)]
        mean_qty: f64,

        /// Size of each strategy order
        #[arg(long, default_value_t = 2.0)]
        order_qty: f64,

        /// Re-rest the strategy orders every N steps (0 = only at the start)
        #[arg(long, default_value_t = 50)]
        requote_every: usize,

        /// Write the generated events as JSON lines to stdout instead of replaying them
        #[arg(long)]
        emit: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn print_summary(summary: &ReplaySummary, scaler: &PriceScaler, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("------ Replay ------");
    println!(
        "events: {} (quotes {}, trades {}, orders {})",
        summary.events, summary.quotes, summary.trades, summary.order_events
    );
    println!(
        "fills: {}, filled qty: {}",
        summary.fills.len(),
        scaler.to_float(summary.filled_qty)
    );
    for tf in &summary.fills {
        println!(
            "ts={} order={} price={} qty={}",
            tf.ts,
            tf.fill.order_id,
            scaler.to_float(tf.fill.price),
            scaler.to_float(tf.fill.quantity)
        );
    }
    println!("resting orders: {}", summary.resting);
    Ok(())
}

fn print_order_book(book: &OrderBook, scaler: &PriceScaler) {
    println!("------ Resting Orders ------");
    println!("Bids (highest first):");
    for level in book.depth(Side::Buy) {
        println!(
            "Price: {}, Total Qty: {}, Orders: {}",
            scaler.to_float(level.price),
            scaler.to_float(level.quantity),
            level.orders
        );
    }
    println!("Asks (lowest first):");
    for level in book.depth(Side::Sell) {
        println!(
            "Price: {}, Total Qty: {}, Orders: {}",
            scaler.to_float(level.price),
            scaler.to_float(level.quantity),
            level.orders
        );
    }
    println!("----------------------------");
}

fn finish(
    summary: &ReplaySummary,
    book: &OrderBook,
    scaler: &PriceScaler,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    print_summary(summary, scaler, output.json)?;
    if output.book {
        print_order_book(book, scaler);
    }
    Ok(())
}

fn handle_replay(
    input: PathBuf,
    cfg: ReplayConfig,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let mut book = OrderBook::new();
    let summary = replay(BufReader::new(file), &mut book, &cfg)
        .with_context(|| format!("replaying {}", input.display()))?;
    finish(&summary, &book, &cfg.scaler(), output)
}

fn handle_simulate(cfg: SimConfig, emit: bool, output: &OutputArgs) -> anyhow::Result<()> {
    let events = simulate::generate(&cfg)?;
    if emit {
        let mut out = BufWriter::new(io::stdout().lock());
        for ev in &events {
            serde_json::to_writer(&mut out, ev)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        return Ok(());
    }
    let scaler = PriceScaler::default();
    let mut book = OrderBook::new();
    let summary = replay_events(&events, &mut book, &scaler);
    finish(&summary, &book, &scaler, output)
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Replay {
            input,
            scale,
            allow_unordered,
            output,
        } => handle_replay(
            input,
            ReplayConfig {
                scale,
                allow_unordered,
            },
            &output,
        ),
        Commands::Simulate {
            steps,
            seed,
            noise_sigma,
            trade_prob,
            start_price,
            tick,
            mean_qty,
            order_qty,
            requote_every,
            emit,
            output,
        } => handle_simulate(
            SimConfig {
                steps,
                seed,
                start_price,
                tick,
                noise_sigma,
                trade_prob,
                mean_qty,
                order_qty,
                requote_every,
            },
            emit,
            &output,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_flags_cover_every_sim_setting() {
        let cli = Cli::try_parse_from([
            "passive-fill-sim",
            "simulate",
            "--steps",
            "10",
            "--seed",
            "3",
            "--noise-sigma",
            "0.1",
            "--trade-prob",
            "0.2",
            "--start-price",
            "250.0",
            "--tick",
            "0.01",
            "--mean-qty",
            "7.5",
            "--order-qty",
            "1.5",
            "--requote-every",
            "0",
        ])
        .unwrap();
        let Commands::Simulate {
            start_price,
            tick,
            mean_qty,
            order_qty,
            requote_every,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(start_price, 250.0);
        assert_eq!(tick, 0.01);
        assert_eq!(mean_qty, 7.5);
        assert_eq!(order_qty, 1.5);
        assert_eq!(requote_every, 0);
    }

    #[test]
    fn simulate_defaults_match_sim_config() {
        let cli = Cli::try_parse_from(["passive-fill-sim", "simulate"]).unwrap();
        let Commands::Simulate {
            steps,
            seed,
            noise_sigma,
            trade_prob,
            start_price,
            tick,
            mean_qty,
            order_qty,
            requote_every,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        let d = SimConfig::default();
        assert_eq!(
            (steps, seed, requote_every),
            (d.steps, d.seed, d.requote_every)
        );
        assert_eq!(
            (noise_sigma, trade_prob, start_price, tick, mean_qty, order_qty),
            (d.noise_sigma, d.trade_prob, d.start_price, d.tick, d.mean_qty, d.order_qty)
        );
    }
}
