//! Capability traits, one per scenario kind.
//!
//! A backend opts into a scenario by implementing its capability trait and
//! overriding the matching accessor on [`QueryGenerator`]. Accessors default
//! to `None`, which dispatch turns into an explicit
//! [`QueryGenError::UnsupportedScenario`].

use querygen_core::{MetricCount, Query, QueryGenError};
use std::time::Duration;

pub trait AllMetricsForHostsFiller {
    /// Every metric of `hosts` random hosts over a random window.
    fn all_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait AllMetricsForClustersFiller {
    /// Every metric of every host in `clusters` random clusters.
    fn all_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait HourlyAvgMetricsForHostsFiller {
    /// Hourly averages of the first `metrics` metrics over random hosts.
    fn hourly_avg_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        metrics: MetricCount,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait HourlyAvgMetricsForClustersFiller {
    /// Hourly averages of the first `metrics` metrics over random clusters.
    fn hourly_avg_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        metrics: MetricCount,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait LastPointForHostsFiller {
    /// The most recent reading of each of `hosts` random hosts.
    fn last_point_for_hosts(&mut self, query: &mut Query, hosts: usize)
        -> Result<(), QueryGenError>;
}

pub trait LastPointPrimaryFiller {
    /// The most recent reading of every primary replica.
    fn last_point_primary(&mut self, query: &mut Query) -> Result<(), QueryGenError>;
}

pub trait TopKHostsFromClusterFiller {
    /// The `hosts` hosts of one random cluster with the highest user CPU time.
    fn top_k_hosts_from_cluster(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait TopKPrimariesFromClusterFiller {
    /// Like [`TopKHostsFromClusterFiller`], restricted to primaries.
    fn top_k_primaries_from_cluster(
        &mut self,
        query: &mut Query,
        primaries: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

pub trait CounterRateHostFiller {
    /// Per-minute rate of a monotonic counter for random hosts.
    fn counter_rate_host(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError>;
}

/// A backend compiler.
///
/// Backends implement [`name`](QueryGenerator::name) plus the accessors of
/// the capabilities they support, each returning `Some(self)`.
pub trait QueryGenerator {
    /// Backend identifier used in labels, logs and errors.
    fn name(&self) -> &str;

    fn as_all_metrics_for_hosts(&mut self) -> Option<&mut dyn AllMetricsForHostsFiller> {
        None
    }

    fn as_all_metrics_for_clusters(&mut self) -> Option<&mut dyn AllMetricsForClustersFiller> {
        None
    }

    fn as_hourly_avg_metrics_for_hosts(
        &mut self,
    ) -> Option<&mut dyn HourlyAvgMetricsForHostsFiller> {
        None
    }

    fn as_hourly_avg_metrics_for_clusters(
        &mut self,
    ) -> Option<&mut dyn HourlyAvgMetricsForClustersFiller> {
        None
    }

    fn as_last_point_for_hosts(&mut self) -> Option<&mut dyn LastPointForHostsFiller> {
        None
    }

    fn as_last_point_primary(&mut self) -> Option<&mut dyn LastPointPrimaryFiller> {
        None
    }

    fn as_top_k_hosts_from_cluster(&mut self) -> Option<&mut dyn TopKHostsFromClusterFiller> {
        None
    }

    fn as_top_k_primaries_from_cluster(
        &mut self,
    ) -> Option<&mut dyn TopKPrimariesFromClusterFiller> {
        None
    }

    fn as_counter_rate_host(&mut self) -> Option<&mut dyn CounterRateHostFiller> {
        None
    }
}
