//! Simulation parameters and their validation.

use crate::engine::types::Price;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: usize },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("max_time must be positive and at most {MAX_TIME_LIMIT}, got {0}")]
    InvalidMaxTime(u64),
}

/// Upper bound on `max_time`, matching the original tool's stdin prompt limit.
pub const MAX_TIME_LIMIT: u64 = 1_000_000_000;

/// Per-strategy-class agent counts and behavior parameters, plus the sizing
/// knobs for the shared arena and rings. Constructed by the CLI binary from
/// command-line flags; the interactive stdin prompt loop of the original
/// tool is intentionally not reproduced here.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of random-strategy agents.
    pub n_random: usize,
    /// Number of market-maker agents.
    pub n_market_maker: usize,
    /// Number of momentum-trader agents.
    pub n_momentum_trader: usize,

    /// Rate parameter of the exponential inter-arrival distribution per
    /// agent class (mean inter-arrival time is `1 / rate`).
    pub random_rate: f64,
    pub market_maker_rate: f64,
    pub momentum_trader_rate: f64,

    /// Standard deviation (in cents) of the random strategy's price offset.
    pub random_sigma: Price,
    /// Quoted half-spread (in cents) for the market-maker strategy.
    pub market_maker_spread: Price,
    /// Momentum signal threshold (in cents) between short/long moving averages.
    pub momentum_threshold: Price,

    /// Starting cash (in cents) and inventory (in units) per agent.
    pub starting_cash: i64,
    pub starting_units: i64,

    /// Logical time at which the outgoing loop stops scheduling new events.
    pub max_time: u64,

    /// Arena capacity (max live orders at once).
    pub arena_capacity: usize,
    /// Ring buffer capacity for engine ingress and each agent's trade egress;
    /// rounded up to a power of two.
    pub ring_capacity: usize,
    /// Calendar queue bucket count; must be a power of two.
    pub calendar_buckets: usize,
    pub calendar_bucket_width: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_random: 20,
            n_market_maker: 4,
            n_momentum_trader: 8,
            random_rate: 1.0,
            market_maker_rate: 2.0,
            momentum_trader_rate: 0.5,
            random_sigma: 50,
            market_maker_spread: 2,
            momentum_threshold: 50,
            starting_cash: 1_000_000,
            starting_units: 100,
            max_time: 100_000,
            arena_capacity: 1 << 20,
            ring_capacity: 1024,
            calendar_buckets: 1024,
            calendar_bucket_width: 1,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ring_capacity.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "ring_capacity",
                value: self.ring_capacity,
            });
        }
        if !self.calendar_buckets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "calendar_buckets",
                value: self.calendar_buckets,
            });
        }
        for (field, rate) in [
            ("random_rate", self.random_rate),
            ("market_maker_rate", self.market_maker_rate),
            ("momentum_trader_rate", self.momentum_trader_rate),
        ] {
            if rate <= 0.0 {
                return Err(ConfigError::NotPositive { field, value: rate });
            }
        }
        if self.max_time == 0 || self.max_time > MAX_TIME_LIMIT {
            return Err(ConfigError::InvalidMaxTime(self.max_time));
        }
        Ok(())
    }

    pub fn total_agents(&self) -> usize {
        self.n_random + self.n_market_maker + self.n_momentum_trader
    }
}
