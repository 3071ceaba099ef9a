//! Per-generator sampling state shared by every backend.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use crate::error::QueryGenError;
use crate::interval::TimeInterval;
use crate::universe::{sample_names, EntityKind, EntityUniverse};

/// Golden-ratio increment used to spread worker seeds apart.
const SEED_GAMMA: u64 = 0x9E3779B97F4A7C15;

/// Derive the seed of worker `worker` from a base seed.
///
/// Worker 0 uses the base seed itself, so a single-worker run matches a
/// plain `Core::new(.., seed)`.
pub fn worker_seed(base_seed: u64, worker: u64) -> u64 {
    base_seed.wrapping_add(worker.wrapping_mul(SEED_GAMMA))
}

/// Sampling state owned by one backend instance.
///
/// Each `Core` owns its random stream, so parallel generators never share
/// one: give every worker its own `Core` seeded through [`worker_seed`].
#[derive(Debug, Clone)]
pub struct Core {
    interval: TimeInterval,
    universe: EntityUniverse,
    rng: StdRng,
}

impl Core {
    pub fn new(interval: TimeInterval, universe: EntityUniverse, seed: u64) -> Self {
        Self {
            interval,
            universe,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The global benchmark time range.
    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn universe(&self) -> &EntityUniverse {
        &self.universe
    }

    /// A fresh random window of `duration` inside the benchmark range.
    pub fn rand_window(&mut self, duration: Duration) -> Result<TimeInterval, QueryGenError> {
        self.interval.rand_window(&mut self.rng, duration)
    }

    /// A fresh random set of `count` distinct names of `kind`.
    pub fn random_names(
        &mut self,
        kind: EntityKind,
        count: usize,
    ) -> Result<Vec<String>, QueryGenError> {
        let total = self.universe.total(kind);
        sample_names(&mut self.rng, count, total, kind)
    }

    pub fn random_hosts(&mut self, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.random_names(EntityKind::Host, count)
    }

    pub fn random_clusters(&mut self, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.random_names(EntityKind::Cluster, count)
    }

    pub fn random_replica_sets(&mut self, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.random_names(EntityKind::ReplicaSet, count)
    }

    pub fn random_groups(&mut self, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.random_names(EntityKind::Group, count)
    }

    pub fn random_orgs(&mut self, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.random_names(EntityKind::Org, count)
    }
}
