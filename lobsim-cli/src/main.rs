//! Non-interactive driver for the limit order book simulator: the original
//! tool's stdin prompt loop, replaced with flags so the simulation can be
//! scripted and reproduced.

use anyhow::Result;
use clap::Parser;

use lobsim_core::config::SimConfig;
use lobsim_core::sim::simulation::Simulation;
use lobsim_core::{init_logger, prelude::CohortStats};

#[derive(Parser, Debug)]
#[command(name = "lobsim", about = "Discrete-event limit order book market simulator")]
struct Cli {
    #[arg(long, default_value_t = default_config().n_random)]
    n_random: usize,
    #[arg(long, default_value_t = default_config().n_market_maker)]
    n_market_maker: usize,
    #[arg(long, default_value_t = default_config().n_momentum_trader)]
    n_momentum_trader: usize,

    #[arg(long, default_value_t = default_config().random_rate)]
    random_rate: f64,
    #[arg(long, default_value_t = default_config().market_maker_rate)]
    market_maker_rate: f64,
    #[arg(long, default_value_t = default_config().momentum_trader_rate)]
    momentum_trader_rate: f64,

    /// Standard deviation, in cents, of the random strategy's price offset.
    #[arg(long, default_value_t = default_config().random_sigma)]
    sigma: i64,
    /// Quoted half-spread, in cents, for the market-maker strategy.
    #[arg(long, default_value_t = default_config().market_maker_spread)]
    spread: i64,
    /// Momentum signal threshold, in cents, between short/long moving averages.
    #[arg(long, default_value_t = default_config().momentum_threshold)]
    threshold: i64,

    #[arg(long, default_value_t = default_config().starting_cash)]
    starting_cash: i64,
    #[arg(long, default_value_t = default_config().starting_units)]
    starting_units: i64,

    /// Logical time units to run the simulation for (max 1e9).
    #[arg(long, default_value_t = default_config().max_time)]
    max_time: u64,

    #[arg(long, default_value_t = default_config().arena_capacity)]
    arena_capacity: usize,
    #[arg(long, default_value_t = default_config().ring_capacity)]
    ring_capacity: usize,
    #[arg(long, default_value_t = default_config().calendar_buckets)]
    calendar_buckets: usize,
    #[arg(long, default_value_t = default_config().calendar_bucket_width)]
    calendar_bucket_width: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
    #[arg(long)]
    json_logs: bool,

    /// Run single-threaded with deterministic action/fill interleaving
    /// instead of the three-thread engine/incoming/outgoing architecture.
    #[arg(long)]
    cooperative: bool,
}

fn default_config() -> SimConfig {
    SimConfig::default()
}

impl From<Cli> for SimConfig {
    fn from(cli: Cli) -> Self {
        SimConfig {
            n_random: cli.n_random,
            n_market_maker: cli.n_market_maker,
            n_momentum_trader: cli.n_momentum_trader,
            random_rate: cli.random_rate,
            market_maker_rate: cli.market_maker_rate,
            momentum_trader_rate: cli.momentum_trader_rate,
            random_sigma: cli.sigma,
            market_maker_spread: cli.spread,
            momentum_threshold: cli.threshold,
            starting_cash: cli.starting_cash,
            starting_units: cli.starting_units,
            max_time: cli.max_time,
            arena_capacity: cli.arena_capacity,
            ring_capacity: cli.ring_capacity,
            calendar_buckets: cli.calendar_buckets,
            calendar_bucket_width: cli.calendar_bucket_width,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.json_logs);
    let cooperative = cli.cooperative;

    let config: SimConfig = cli.into();
    config.validate()?;

    tracing::info!(
        n_random = config.n_random,
        n_market_maker = config.n_market_maker,
        n_momentum_trader = config.n_momentum_trader,
        max_time = config.max_time,
        "starting simulation"
    );

    let report = if cooperative { Simulation::new(config).run_cooperative() } else { Simulation::new(config).run() };

    println!("{}", report.final_book);
    print_cohort("Random agents", &report.random);
    print_cohort("Market maker agents", &report.market_maker);
    print_cohort("Momentum trader agents", &report.momentum);
    println!("agent actions: {}", report.agent_actions);

    Ok(())
}

fn print_cohort(name: &str, stats: &CohortStats) {
    println!("{name} mean profit: {:.3}", stats.mean_profit);
    println!("{name} profit stddev: {:.3}", stats.profit_stddev);
    println!("{name} mean cash: {:.3}", stats.mean_cash);
    println!("{name} cash stddev: {:.3}", stats.cash_stddev);
    println!("{name} mean units: {:.3}", stats.mean_units);
    println!("{name} units stddev: {:.3}", stats.units_stddev);
}
