//! Wires a [`SimConfig`] into an arena, order book, matching engine, and
//! agent roster, runs the three-thread simulation to completion, and reports
//! a per-strategy-class summary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::info;

use parking_lot::RwLock;

use crate::agent::runtime::Agent;
use crate::agent::strategies::market_maker::MarketMakerStrategy;
use crate::agent::strategies::momentum::MomentumStrategy;
use crate::agent::strategies::random::RandomStrategy;
use crate::agent::strategy::{Strategy, StrategyKind};
use crate::arena::OrderArena;
use crate::config::SimConfig;
use crate::engine::book::OrderBook;
use crate::engine::dispatcher::TradeDispatcher;
use crate::engine::matching::MatchingEngine;
use crate::ring::RingBuffer;

use super::manager::{run_engine_loop, run_incoming_loop, AgentManager};

pub struct Simulation {
    config: SimConfig,
}

/// Mean and population standard deviation of one metric across a cohort of
/// agents, plus the book rendered at the end of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohortStats {
    pub mean_profit: f64,
    pub profit_stddev: f64,
    pub mean_cash: f64,
    pub cash_stddev: f64,
    pub mean_units: f64,
    pub units_stddev: f64,
}

pub struct SimulationReport {
    pub agent_actions: u64,
    pub random: CohortStats,
    pub market_maker: CohortStats,
    pub momentum: CohortStats,
    pub final_book: String,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Builds the shared arena/book/engine, constructs every configured
    /// agent, and wires them to a warmed-up [`AgentManager`]. Shared by both
    /// [`Simulation::run`] and [`Simulation::run_cooperative`], which differ
    /// only in how they drive the three roles (threaded vs. single-threaded
    /// interleaving) from this point on.
    fn build(config: &SimConfig) -> (MatchingEngine, Arc<RwLock<OrderBook>>, AgentManager) {
        let arena = Arc::new(OrderArena::new(config.arena_capacity));
        let ingress = Arc::new(RingBuffer::new(config.ring_capacity));

        let mut engine = MatchingEngine::new(arena.clone(), TradeDispatcher::new(), ingress.clone());
        let book = engine.book_handle();

        let mut dispatcher = TradeDispatcher::new();
        let mut agents = Vec::with_capacity(config.total_agents());
        let mut client_ref = 0u64;

        let cohorts: [(usize, f64, fn(&SimConfig) -> Strategy); 3] = [
            (config.n_random, config.random_rate, |c| Strategy::Random(RandomStrategy::new(c.random_sigma))),
            (config.n_market_maker, config.market_maker_rate, |c| {
                Strategy::MarketMaker(MarketMakerStrategy::new(c.market_maker_spread))
            }),
            (config.n_momentum_trader, config.momentum_trader_rate, |c| {
                Strategy::Momentum(MomentumStrategy::new(c.momentum_threshold))
            }),
        ];
        for (count, rate, make_strategy) in cohorts {
            for _ in 0..count {
                client_ref += 1;
                let trades = Arc::new(RingBuffer::new(config.ring_capacity));
                dispatcher.attach(client_ref, trades.clone());
                agents.push(Agent::new(
                    client_ref,
                    make_strategy(config),
                    rate,
                    arena.clone(),
                    ingress.clone(),
                    trades,
                    book.clone(),
                    config.starting_cash,
                    config.starting_units,
                ));
            }
        }

        *engine.dispatcher_mut() = dispatcher;

        let mut manager = AgentManager::new(agents, config.max_time, config.calendar_buckets, config.calendar_bucket_width);
        manager.warm_up();

        (engine, book, manager)
    }

    /// Builds the shared arena/book/engine, constructs every configured
    /// agent, and runs the outgoing loop on the calling thread while the
    /// matching engine and incoming-trade drain each run on their own
    /// thread. Blocks until the outgoing loop reaches `max_time`, then stops
    /// the other two loops and joins them before reporting.
    pub fn run(self) -> SimulationReport {
        let config = self.config;
        let (engine, book, mut manager) = Self::build(&config);

        let running = Arc::new(AtomicBool::new(true));

        let engine_thread = {
            let running = running.clone();
            thread::Builder::new()
                .name("matching-engine".into())
                .spawn(move || run_engine_loop(engine, running))
                .expect("failed to spawn matching engine thread")
        };
        let incoming_thread = {
            let running = running.clone();
            let agents = manager.agents();
            thread::Builder::new()
                .name("incoming-drain".into())
                .spawn(move || run_incoming_loop(agents, running))
                .expect("failed to spawn incoming drain thread")
        };

        manager.run_outgoing_loop();
        running.store(false, Ordering::Release);

        engine_thread.join().expect("matching engine thread panicked");
        incoming_thread.join().expect("incoming drain thread panicked");

        info!(actions = manager.agent_actions(), "simulation complete");

        let final_book = book.read().render();
        let agents = manager.agents();
        let snapshot: Vec<(StrategyKind, i64, i64)> = agents
            .iter()
            .map(|a| {
                let agent = a.lock();
                (agent.kind(), agent.cash_total(), agent.units())
            })
            .collect();

        SimulationReport {
            agent_actions: manager.agent_actions(),
            random: cohort_stats(&snapshot, StrategyKind::Random, config.starting_cash),
            market_maker: cohort_stats(&snapshot, StrategyKind::MarketMaker, config.starting_cash),
            momentum: cohort_stats(&snapshot, StrategyKind::Momentum, config.starting_cash),
            final_book,
        }
    }

    /// Runs the same simulation on a single thread, with no logical
    /// suspension points: each scheduled agent action is followed
    /// immediately by draining the engine's ingress ring and every agent's
    /// trade ring, fully in lockstep, before the next event is stepped. This
    /// removes the three-thread model's scheduling nondeterminism — no fill
    /// can ever race ahead of the agent action that caused it, or be
    /// observed out of order relative to another agent's — the mode used by
    /// tests that need a reproducible interleaving rather than a throughput
    /// measurement.
    pub fn run_cooperative(self) -> SimulationReport {
        let config = self.config;
        let (mut engine, book, mut manager) = Self::build(&config);
        let roster = manager.agents();

        while manager.step() {
            while engine.process_next() {}
            for agent in &roster {
                agent.lock().drain_trades();
            }
        }
        while engine.process_next() {}
        for agent in &roster {
            agent.lock().drain_trades();
        }

        info!(actions = manager.agent_actions(), "cooperative simulation complete");

        let final_book = book.read().render();
        let agents = manager.agents();
        let snapshot: Vec<(StrategyKind, i64, i64)> = agents
            .iter()
            .map(|a| {
                let agent = a.lock();
                (agent.kind(), agent.cash_total(), agent.units())
            })
            .collect();

        SimulationReport {
            agent_actions: manager.agent_actions(),
            random: cohort_stats(&snapshot, StrategyKind::Random, config.starting_cash),
            market_maker: cohort_stats(&snapshot, StrategyKind::MarketMaker, config.starting_cash),
            momentum: cohort_stats(&snapshot, StrategyKind::Momentum, config.starting_cash),
            final_book,
        }
    }
}

fn cohort_stats(snapshot: &[(StrategyKind, i64, i64)], kind: StrategyKind, starting_cash: i64) -> CohortStats {
    let cash: Vec<f64> = snapshot.iter().filter(|(k, _, _)| *k == kind).map(|(_, c, _)| *c as f64 / 100.0).collect();
    let units: Vec<f64> = snapshot.iter().filter(|(k, _, _)| *k == kind).map(|(_, _, u)| *u as f64).collect();
    let profit: Vec<f64> = cash.iter().map(|c| c - starting_cash as f64 / 100.0).collect();
    CohortStats {
        mean_profit: mean(&profit),
        profit_stddev: stddev(&profit),
        mean_cash: mean(&cash),
        cash_stddev: stddev(&cash),
        mean_units: mean(&units),
        units_stddev: stddev(&units),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sq_sum: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sq_sum / values.len() as f64).sqrt()
}
