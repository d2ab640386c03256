//! Discrete-event limit order book simulator: a price-time-priority matching
//! engine, a slab-allocated order arena, SPSC ring buffers carrying orders in
//! and trade reports out, and a roster of agents trading against the book
//! under one of three strategies.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod agent;
pub mod arena;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod hashmap;
pub mod ring;
pub mod sim;

pub mod prelude {
    pub use crate::agent::prelude::*;
    pub use crate::config::*;
    pub use crate::engine::prelude::*;
    pub use crate::sim::prelude::*;
}

/// Initializes the global `tracing` subscriber from `log_level` (used as the
/// default filter when `RUST_LOG` is unset). `json_logs` selects structured
/// JSON output over human-readable formatting; set for production log
/// shipping, unset for local runs.
pub fn init_logger(log_level: &str, json_logs: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_logs {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }
}
