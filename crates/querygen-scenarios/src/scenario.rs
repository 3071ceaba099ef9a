//! The fixed scenario catalog and capability-checked dispatch.

use querygen_core::{
    format_duration, EntityKind, EntityUniverse, MetricCatalog, MetricCount, Query,
    QueryGenError, TimeInterval,
};
use std::fmt;
use std::time::Duration;

use crate::capability::QueryGenerator;

/// Scenario kinds, independent of their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    AllMetricsForHosts,
    AllMetricsForClusters,
    HourlyAvgMetricsForHosts,
    HourlyAvgMetricsForClusters,
    LastPointForHosts,
    LastPointPrimary,
    TopKHostsFromCluster,
    TopKPrimariesFromCluster,
    CounterRateHost,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 9] = [
        ScenarioKind::AllMetricsForHosts,
        ScenarioKind::AllMetricsForClusters,
        ScenarioKind::HourlyAvgMetricsForHosts,
        ScenarioKind::HourlyAvgMetricsForClusters,
        ScenarioKind::LastPointForHosts,
        ScenarioKind::LastPointPrimary,
        ScenarioKind::TopKHostsFromCluster,
        ScenarioKind::TopKPrimariesFromCluster,
        ScenarioKind::CounterRateHost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::AllMetricsForHosts => "AllMetricsForHosts",
            ScenarioKind::AllMetricsForClusters => "AllMetricsForClusters",
            ScenarioKind::HourlyAvgMetricsForHosts => "HourlyAvgMetricsForHosts",
            ScenarioKind::HourlyAvgMetricsForClusters => "HourlyAvgMetricsForClusters",
            ScenarioKind::LastPointForHosts => "LastPointForHosts",
            ScenarioKind::LastPointPrimary => "LastPointPrimary",
            ScenarioKind::TopKHostsFromCluster => "TopKHostsFromCluster",
            ScenarioKind::TopKPrimariesFromCluster => "TopKPrimariesFromCluster",
            ScenarioKind::CounterRateHost => "CounterRateHost",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scenario bound to its parameters: the "filler".
///
/// Built once per benchmark configuration and reused for every generated
/// query; each [`fill`](Scenario::fill) samples new entities and a new
/// window through the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    AllMetricsForHosts {
        hosts: usize,
        duration: Duration,
    },
    AllMetricsForClusters {
        clusters: usize,
        duration: Duration,
    },
    HourlyAvgMetricsForHosts {
        metrics: MetricCount,
        hosts: usize,
        duration: Duration,
    },
    HourlyAvgMetricsForClusters {
        metrics: MetricCount,
        clusters: usize,
        duration: Duration,
    },
    LastPointForHosts {
        hosts: usize,
    },
    LastPointPrimary,
    TopKHostsFromCluster {
        hosts: usize,
        duration: Duration,
    },
    TopKPrimariesFromCluster {
        primaries: usize,
        duration: Duration,
    },
    CounterRateHost {
        hosts: usize,
        duration: Duration,
    },
}

impl Scenario {
    pub fn all_metrics_for_hosts(hosts: usize, duration: Duration) -> Self {
        Scenario::AllMetricsForHosts { hosts, duration }
    }

    pub fn all_metrics_for_clusters(clusters: usize, duration: Duration) -> Self {
        Scenario::AllMetricsForClusters { clusters, duration }
    }

    pub fn hourly_avg_metrics_for_hosts(
        metrics: MetricCount,
        hosts: usize,
        duration: Duration,
    ) -> Self {
        Scenario::HourlyAvgMetricsForHosts {
            metrics: metrics.normalized(),
            hosts,
            duration,
        }
    }

    pub fn hourly_avg_metrics_for_clusters(
        metrics: MetricCount,
        clusters: usize,
        duration: Duration,
    ) -> Self {
        Scenario::HourlyAvgMetricsForClusters {
            metrics: metrics.normalized(),
            clusters,
            duration,
        }
    }

    pub fn last_point_for_hosts(hosts: usize) -> Self {
        Scenario::LastPointForHosts { hosts }
    }

    pub fn last_point_primary() -> Self {
        Scenario::LastPointPrimary
    }

    pub fn top_k_hosts_from_cluster(hosts: usize, duration: Duration) -> Self {
        Scenario::TopKHostsFromCluster { hosts, duration }
    }

    pub fn top_k_primaries_from_cluster(primaries: usize, duration: Duration) -> Self {
        Scenario::TopKPrimariesFromCluster {
            primaries,
            duration,
        }
    }

    pub fn counter_rate_host(hosts: usize, duration: Duration) -> Self {
        Scenario::CounterRateHost { hosts, duration }
    }

    pub fn kind(&self) -> ScenarioKind {
        match self {
            Scenario::AllMetricsForHosts { .. } => ScenarioKind::AllMetricsForHosts,
            Scenario::AllMetricsForClusters { .. } => ScenarioKind::AllMetricsForClusters,
            Scenario::HourlyAvgMetricsForHosts { .. } => ScenarioKind::HourlyAvgMetricsForHosts,
            Scenario::HourlyAvgMetricsForClusters { .. } => {
                ScenarioKind::HourlyAvgMetricsForClusters
            }
            Scenario::LastPointForHosts { .. } => ScenarioKind::LastPointForHosts,
            Scenario::LastPointPrimary => ScenarioKind::LastPointPrimary,
            Scenario::TopKHostsFromCluster { .. } => ScenarioKind::TopKHostsFromCluster,
            Scenario::TopKPrimariesFromCluster { .. } => ScenarioKind::TopKPrimariesFromCluster,
            Scenario::CounterRateHost { .. } => ScenarioKind::CounterRateHost,
        }
    }

    /// Window length, if the scenario samples one.
    pub fn duration(&self) -> Option<Duration> {
        match *self {
            Scenario::AllMetricsForHosts { duration, .. }
            | Scenario::AllMetricsForClusters { duration, .. }
            | Scenario::HourlyAvgMetricsForHosts { duration, .. }
            | Scenario::HourlyAvgMetricsForClusters { duration, .. }
            | Scenario::TopKHostsFromCluster { duration, .. }
            | Scenario::TopKPrimariesFromCluster { duration, .. }
            | Scenario::CounterRateHost { duration, .. } => Some(duration),
            Scenario::LastPointForHosts { .. } | Scenario::LastPointPrimary => None,
        }
    }

    /// Check the scenario's fixed cardinalities against the universe and the
    /// benchmark time range.
    ///
    /// Cardinalities never change after construction, so a failure here is a
    /// configuration error to report before generating anything.
    pub fn validate(
        &self,
        universe: &EntityUniverse,
        range: &TimeInterval,
    ) -> Result<(), QueryGenError> {
        match *self {
            Scenario::AllMetricsForHosts { hosts, .. }
            | Scenario::LastPointForHosts { hosts }
            | Scenario::CounterRateHost { hosts, .. } => {
                universe.check(EntityKind::Host, hosts)?;
            }
            Scenario::AllMetricsForClusters { clusters, .. } => {
                universe.check(EntityKind::Cluster, clusters)?;
            }
            Scenario::HourlyAvgMetricsForHosts { metrics, hosts, .. } => {
                MetricCatalog::resolve(metrics)?;
                universe.check(EntityKind::Host, hosts)?;
            }
            Scenario::HourlyAvgMetricsForClusters {
                metrics, clusters, ..
            } => {
                MetricCatalog::resolve(metrics)?;
                universe.check(EntityKind::Cluster, clusters)?;
            }
            Scenario::TopKHostsFromCluster { hosts: k, .. } => {
                universe.check(EntityKind::Cluster, 1)?;
                universe.check_top_k(k, false)?;
            }
            Scenario::TopKPrimariesFromCluster { primaries: k, .. } => {
                universe.check(EntityKind::Cluster, 1)?;
                universe.check_top_k(k, true)?;
            }
            Scenario::LastPointPrimary => {}
        }

        if let Some(duration) = self.duration() {
            range.check_window(duration)?;
        }
        Ok(())
    }

    /// Compile this scenario with `generator` into `query`.
    ///
    /// Fails with [`QueryGenError::UnsupportedScenario`] when the backend
    /// lacks the capability, before anything is written to `query`. That
    /// error means the backend/scenario pairing is misconfigured and must
    /// abort the run.
    pub fn fill(
        &self,
        generator: &mut dyn QueryGenerator,
        query: &mut Query,
    ) -> Result<(), QueryGenError> {
        tracing::trace!(scenario = %self, backend = generator.name(), "filling query");

        match *self {
            Scenario::AllMetricsForHosts { hosts, duration } => {
                match generator.as_all_metrics_for_hosts() {
                    Some(f) => f.all_metrics_for_hosts(query, hosts, duration),
                    None => Err(self.unsupported(generator)),
                }
            }
            Scenario::AllMetricsForClusters { clusters, duration } => {
                match generator.as_all_metrics_for_clusters() {
                    Some(f) => f.all_metrics_for_clusters(query, clusters, duration),
                    None => Err(self.unsupported(generator)),
                }
            }
            Scenario::HourlyAvgMetricsForHosts {
                metrics,
                hosts,
                duration,
            } => match generator.as_hourly_avg_metrics_for_hosts() {
                Some(f) => f.hourly_avg_metrics_for_hosts(query, metrics, hosts, duration),
                None => Err(self.unsupported(generator)),
            },
            Scenario::HourlyAvgMetricsForClusters {
                metrics,
                clusters,
                duration,
            } => match generator.as_hourly_avg_metrics_for_clusters() {
                Some(f) => f.hourly_avg_metrics_for_clusters(query, metrics, clusters, duration),
                None => Err(self.unsupported(generator)),
            },
            Scenario::LastPointForHosts { hosts } => match generator.as_last_point_for_hosts() {
                Some(f) => f.last_point_for_hosts(query, hosts),
                None => Err(self.unsupported(generator)),
            },
            Scenario::LastPointPrimary => match generator.as_last_point_primary() {
                Some(f) => f.last_point_primary(query),
                None => Err(self.unsupported(generator)),
            },
            Scenario::TopKHostsFromCluster { hosts, duration } => {
                match generator.as_top_k_hosts_from_cluster() {
                    Some(f) => f.top_k_hosts_from_cluster(query, hosts, duration),
                    None => Err(self.unsupported(generator)),
                }
            }
            Scenario::TopKPrimariesFromCluster {
                primaries,
                duration,
            } => match generator.as_top_k_primaries_from_cluster() {
                Some(f) => f.top_k_primaries_from_cluster(query, primaries, duration),
                None => Err(self.unsupported(generator)),
            },
            Scenario::CounterRateHost { hosts, duration } => {
                match generator.as_counter_rate_host() {
                    Some(f) => f.counter_rate_host(query, hosts, duration),
                    None => Err(self.unsupported(generator)),
                }
            }
        }
    }

    fn unsupported(&self, generator: &dyn QueryGenerator) -> QueryGenError {
        QueryGenError::UnsupportedScenario {
            scenario: self.kind().name(),
            backend: generator.name().to_string(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match *self {
            Scenario::AllMetricsForHosts { hosts, duration }
            | Scenario::CounterRateHost { hosts, duration } => {
                write!(f, "(hosts={hosts}, duration={})", format_duration(duration))
            }
            Scenario::AllMetricsForClusters { clusters, duration } => write!(
                f,
                "(clusters={clusters}, duration={})",
                format_duration(duration)
            ),
            Scenario::HourlyAvgMetricsForHosts {
                metrics,
                hosts,
                duration,
            } => write!(
                f,
                "(metrics={}, hosts={hosts}, duration={})",
                metrics.count(),
                format_duration(duration)
            ),
            Scenario::HourlyAvgMetricsForClusters {
                metrics,
                clusters,
                duration,
            } => write!(
                f,
                "(metrics={}, clusters={clusters}, duration={})",
                metrics.count(),
                format_duration(duration)
            ),
            Scenario::LastPointForHosts { hosts } => write!(f, "(hosts={hosts})"),
            Scenario::LastPointPrimary => Ok(()),
            Scenario::TopKHostsFromCluster { hosts: k, duration }
            | Scenario::TopKPrimariesFromCluster {
                primaries: k,
                duration,
            } => write!(f, "(k={k}, duration={})", format_duration(duration)),
        }
    }
}
