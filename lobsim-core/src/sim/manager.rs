//! Schedules agent actions in logical time and drives the engine/incoming
//! sides of the three concurrent loops.
//!
//! Each agent is shared behind its own [`Mutex`] rather than the scheduler
//! owning the whole roster exclusively: the outgoing loop (this agent
//! acting) and the incoming loop (this agent's trade reports arriving) run
//! on different threads and both touch the same cash/inventory/active-order
//! state, so per-agent locking is the actual synchronization boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

use crate::agent::runtime::Agent;
use crate::calendar::{CalendarQueue, TimeOf};
use crate::engine::matching::MatchingEngine;
use crate::engine::types::Timestamp;

/// One scheduled "an agent gets to act" event, ordered by `time`.
pub struct AgentEvent {
    pub time: Timestamp,
    pub agent_index: usize,
}

impl TimeOf for AgentEvent {
    fn time(&self) -> u64 {
        self.time
    }
}

/// Drives the outgoing loop: pops the next-due agent, lets it act, applies
/// whatever it submits, and reschedules it from an exponential inter-arrival
/// draw at its configured rate.
pub struct AgentManager {
    agents: Vec<Arc<Mutex<Agent>>>,
    queue: CalendarQueue<AgentEvent>,
    current_time: Timestamp,
    max_time: Timestamp,
    agent_actions: u64,
    rng: SmallRng,
}

impl AgentManager {
    pub fn new(agents: Vec<Agent>, max_time: Timestamp, calendar_buckets: usize, calendar_bucket_width: u64) -> Self {
        Self {
            agents: agents.into_iter().map(|a| Arc::new(Mutex::new(a))).collect(),
            queue: CalendarQueue::new(calendar_buckets, calendar_bucket_width),
            current_time: 0,
            max_time,
            agent_actions: 0,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Shared handles to every agent, for the incoming loop to drain on its
    /// own thread alongside this scheduler.
    pub fn agents(&self) -> Vec<Arc<Mutex<Agent>>> {
        self.agents.clone()
    }

    pub fn agent_actions(&self) -> u64 {
        self.agent_actions
    }

    /// Schedules each agent's first action from time zero.
    pub fn warm_up(&mut self) {
        for index in 0..self.agents.len() {
            let rate = self.agents[index].lock().rate;
            let time = self.next_event_time(self.current_time, rate);
            self.queue.push(AgentEvent { time, agent_index: index });
        }
    }

    fn next_event_time(&mut self, from: Timestamp, rate: f64) -> Timestamp {
        let draw = Exp::new(rate).unwrap().sample(&mut self.rng);
        from + draw.max(1.0).round() as Timestamp
    }

    /// Processes exactly one scheduled event: the next-due agent acts, its
    /// actions are applied, and it is rescheduled from a fresh inter-arrival
    /// draw. Returns `false` once `max_time` is reached or the queue runs
    /// dry, meaning there is nothing left to step.
    pub fn step(&mut self) -> bool {
        if self.current_time >= self.max_time {
            return false;
        }
        let Some(event) = self.queue.pop() else {
            return false;
        };
        self.current_time = event.time;
        let rate = {
            let mut agent = self.agents[event.agent_index].lock();
            let actions = agent.act();
            for action in actions {
                agent.apply(action, self.current_time);
            }
            agent.rate
        };
        self.agent_actions += 1;
        let next_time = self.next_event_time(self.current_time, rate);
        self.queue.push(AgentEvent { time: next_time, agent_index: event.agent_index });
        true
    }

    /// Runs until logical time reaches `max_time`. Meant to run on its own
    /// thread (or the caller's) alongside the engine and incoming loops.
    pub fn run_outgoing_loop(&mut self) {
        while self.step() {}
    }
}

/// The incoming loop's thread body: repeatedly drains every agent's trade
/// ring while `running` holds, then performs one final pass so reports
/// delivered right at shutdown aren't lost.
pub fn run_incoming_loop(agents: Vec<Arc<Mutex<Agent>>>, running: Arc<AtomicBool>) {
    while running.load(Ordering::Acquire) {
        for agent in &agents {
            agent.lock().drain_trades();
        }
    }
    for agent in &agents {
        agent.lock().drain_trades();
    }
}

/// The matching engine's dedicated thread body: process ingress until told
/// to stop, then drain whatever the outgoing loop queued right before it
/// stopped.
pub fn run_engine_loop(mut engine: MatchingEngine, running: Arc<AtomicBool>) {
    while running.load(Ordering::Acquire) {
        engine.process_next();
    }
    while engine.process_next() {}
}
