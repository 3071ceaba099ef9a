//! The synthetic entity universe and the sampler that picks names from it.
//!
//! The simulator that produces the ingested dataset lays hosts out as
//! clusters of shards, each shard being a replica set of a few hosts:
//!
//! ```text
//! cluster_0 ── replica_0 ── host_0 (PRIMARY), host_1, host_2
//!           ├─ replica_1 ── host_3 (PRIMARY), host_4, host_5
//!           ...
//! ```
//!
//! Replica-set names restart in every cluster, and each cluster also owns the
//! group and org with its own suffix. Queries only ever need *names*, so the
//! universe is reduced to per-kind totals.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QueryGenError;

/// Kinds of named entities a scenario can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Host,
    Cluster,
    ReplicaSet,
    Group,
    Org,
}

impl EntityKind {
    /// Prefix used in generated names (`host_12`, `replica_3`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Host => "host",
            EntityKind::Cluster => "cluster",
            EntityKind::ReplicaSet => "replica",
            EntityKind::Group => "group",
            EntityKind::Org => "org",
        }
    }

    /// Tag key the dataset stores this kind under.
    pub fn tag_key(&self) -> &'static str {
        match self {
            EntityKind::Host => "hostname",
            EntityKind::Cluster => "clusterName",
            EntityKind::ReplicaSet => "replicaSetName",
            EntityKind::Group => "groupId",
            EntityKind::Org => "orgId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Default topology: 100 clusters of 30 shards, 3 hosts each (9000 hosts).
pub const DEFAULT_CLUSTERS: usize = 100;
pub const DEFAULT_SHARDS_PER_CLUSTER: usize = 30;
pub const DEFAULT_REPLICAS_PER_SHARD: usize = 3;

/// Sizes of the synthetic entity population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityUniverse {
    pub clusters: usize,
    pub shards_per_cluster: usize,
    pub replicas_per_shard: usize,
    pub groups: usize,
    pub orgs: usize,
}

impl Default for EntityUniverse {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            shards_per_cluster: DEFAULT_SHARDS_PER_CLUSTER,
            replicas_per_shard: DEFAULT_REPLICAS_PER_SHARD,
            groups: DEFAULT_CLUSTERS,
            orgs: DEFAULT_CLUSTERS,
        }
    }
}

impl EntityUniverse {
    /// Derive a universe from a host scale factor using the default shard
    /// layout. Clusters are rounded up so that at least `scale` hosts exist.
    pub fn from_scale(scale: usize) -> Self {
        let hosts_per_cluster = DEFAULT_SHARDS_PER_CLUSTER * DEFAULT_REPLICAS_PER_SHARD;
        let clusters = scale.div_ceil(hosts_per_cluster).max(1);
        Self {
            clusters,
            groups: clusters,
            orgs: clusters,
            ..Self::default()
        }
    }

    pub fn hosts(&self) -> usize {
        self.clusters * self.hosts_per_cluster()
    }

    pub fn hosts_per_cluster(&self) -> usize {
        self.shards_per_cluster * self.replicas_per_shard
    }

    /// Total number of distinct names of the given kind.
    pub fn total(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Host => self.hosts(),
            EntityKind::Cluster => self.clusters,
            EntityKind::ReplicaSet => self.shards_per_cluster,
            EntityKind::Group => self.groups,
            EntityKind::Org => self.orgs,
        }
    }

    /// Check that `count` names of `kind` can be sampled.
    pub fn check(&self, kind: EntityKind, count: usize) -> Result<(), QueryGenError> {
        check_bounds(kind, count, self.total(kind))
    }

    /// Check a top-K request against a single cluster: its hosts, or its
    /// primaries (one per shard) when `primaries_only` is set.
    pub fn check_top_k(&self, k: usize, primaries_only: bool) -> Result<(), QueryGenError> {
        let (kind, total) = if primaries_only {
            ("primary", self.shards_per_cluster)
        } else {
            (EntityKind::Host.prefix(), self.hosts_per_cluster())
        };
        if k < 1 || k > total {
            return Err(QueryGenError::Bounds {
                kind,
                count: k,
                total,
            });
        }
        Ok(())
    }
}

fn check_bounds(kind: EntityKind, count: usize, total: usize) -> Result<(), QueryGenError> {
    if count < 1 || count > total {
        return Err(QueryGenError::Bounds {
            kind: kind.prefix(),
            count,
            total,
        });
    }
    Ok(())
}

/// Pick `count` distinct names of `kind` out of `total`.
///
/// The names are the first `count` elements of a uniformly random
/// permutation of `0..total`, so a single call never repeats an index.
/// Callers must not rely on any ordering.
pub fn sample_names<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    total: usize,
    kind: EntityKind,
) -> Result<Vec<String>, QueryGenError> {
    check_bounds(kind, count, total)?;

    let mut indices: Vec<usize> = (0..total).collect();
    let (chosen, _) = indices.partial_shuffle(rng, count);

    Ok(chosen
        .iter()
        .map(|i| format!("{}_{i}", kind.prefix()))
        .collect())
}
