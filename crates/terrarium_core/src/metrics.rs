//! Runtime counters and structured logging for the simulation.
//!
//! Counters are atomics so read-only observers may sample them while the
//! world is being stepped elsewhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of the world handed to [`Metrics::record_tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub alive_agents: usize,
    pub resource_cells: usize,
    pub water_cells: usize,
    pub sim_time: f64,
}

pub struct Metrics {
    tick_count: AtomicU64,
    alive_agents: AtomicU64,
    resource_cells: AtomicU64,
    collections: AtomicU64,
    dried_cells: AtomicU64,
    deaths: AtomicU64,
    log_interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    #[must_use]
    pub fn new(log_interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            alive_agents: AtomicU64::new(0),
            resource_cells: AtomicU64::new(0),
            collections: AtomicU64::new(0),
            dried_cells: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            log_interval: log_interval.max(1),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick; logs a summary every `log_interval` ticks.
    pub fn record_tick(&self, duration: Duration, stats: TickStats) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.alive_agents
            .store(stats.alive_agents as u64, Ordering::Relaxed);
        self.resource_cells
            .store(stats.resource_cells as u64, Ordering::Relaxed);

        if tick.is_multiple_of(self.log_interval) {
            tracing::info!(
                tick,
                sim_time = stats.sim_time,
                alive = stats.alive_agents,
                resources = stats.resource_cells,
                water = stats.water_cells,
                collections = self.collections(),
                dried = self.dried_cells(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_collection(&self) {
        self.collections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dried(&self, cells: usize) {
        self.dried_cells.fetch_add(cells as u64, Ordering::Relaxed);
    }

    pub fn record_death(&self) {
        self.deaths.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn alive_agents(&self) -> u64 {
        self.alive_agents.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn resource_cells(&self) -> u64 {
        self.resource_cells.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn collections(&self) -> u64 {
        self.collections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn dried_cells(&self) -> u64 {
        self.dried_cells.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    /// Wall-clock time since the collector was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` level. Safe to call more than once.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
