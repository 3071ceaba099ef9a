//! MetricsQL queries for the intel scenarios.
//!
//! Last-point scenarios have no range-query equivalent here, so this backend
//! leaves those capability accessors at their `None` default.

use std::time::Duration;

use querygen_core::{
    format_duration, Core, EntityKind, MetricCount, Payload, Query, QueryGenError, TimeInterval,
    COUNTER_METRIC, TOP_K_METRIC,
};
use querygen_scenarios::{
    AllMetricsForClustersFiller, AllMetricsForHostsFiller, CounterRateHostFiller,
    HourlyAvgMetricsForClustersFiller, HourlyAvgMetricsForHostsFiller, QueryGenerator,
    TopKHostsFromClusterFiller, TopKPrimariesFromClusterFiller,
};
use tracing::debug;

use crate::selector::{select, select_one, tag_matcher};

const BACKEND: &str = "VictoriaMetrics";

/// Resolution of raw and rate queries.
pub const RAW_STEP_SECS: u64 = 60;

/// Resolution of hourly aggregates.
pub const HOURLY_STEP_SECS: u64 = 3600;

/// VictoriaMetrics query generator.
pub struct VictoriaMetrics {
    core: Core,
}

impl VictoriaMetrics {
    pub fn new(core: Core) -> Self {
        Self { core }
    }

    fn matcher(&mut self, kind: EntityKind, count: usize) -> Result<String, QueryGenError> {
        let names = self.core.random_names(kind, count)?;
        Ok(tag_matcher(kind.tag_key(), &names))
    }

    /// Fill `query` with a range query over `window`.
    ///
    /// A range query evaluates at `start`, `start + step`, .. `end`, each
    /// looking back one step. Starting one step into the window keeps every
    /// lookback inside `(window.start, window.end]`.
    fn fill(
        &self,
        query: &mut Query,
        label: String,
        window: &TimeInterval,
        expr: String,
        step_secs: u64,
    ) {
        debug!("{}: {} [step {}s]", label, expr, step_secs);
        let description = format!("{label}: {}", window.start_string());
        query.fill(
            label,
            description,
            Payload::Selector {
                expr,
                start: first_evaluation(window, step_secs),
                end: window.end().timestamp(),
                step_secs,
            },
        );
    }

    fn all_metrics(
        &mut self,
        query: &mut Query,
        kind: EntityKind,
        count: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let tags = self.matcher(kind, count)?;
        let expr = select(MetricCount::All, &tags)?;

        let label = format!(
            "{BACKEND} all metric(s) for random {count:4} {}s, duration: {}",
            kind.prefix(),
            format_duration(duration)
        );
        self.fill(query, label, &window, expr, RAW_STEP_SECS);
        Ok(())
    }

    fn hourly_avg(
        &mut self,
        query: &mut Query,
        metrics: MetricCount,
        kind: EntityKind,
        count: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let tags = self.matcher(kind, count)?;
        let selector = select(metrics, &tags)?;
        let expr = format!(
            "avg(avg_over_time({selector}[1h])) by (__name__, {})",
            kind.tag_key()
        );

        let label = format!(
            "{BACKEND} {} metric(s), random {count:4} {}s, random {} by 1h",
            metrics.count(),
            kind.prefix(),
            format_duration(duration)
        );
        self.fill(query, label, &window, expr, HOURLY_STEP_SECS);
        Ok(())
    }

    fn top_k(
        &mut self,
        query: &mut Query,
        k: usize,
        duration: Duration,
        primaries_only: bool,
    ) -> Result<(), QueryGenError> {
        self.core.universe().check_top_k(k, primaries_only)?;
        let window = self.core.rand_window(duration)?;
        let mut tags = self.matcher(EntityKind::Cluster, 1)?;
        if primaries_only {
            tags.push_str(", replicaSetState='PRIMARY'");
        }
        let expr = format!(
            "topk({k}, max by ({}) (max_over_time({}[{}])))",
            EntityKind::Host.tag_key(),
            select_one(TOP_K_METRIC, &tags),
            range_literal(duration)
        );

        let what = if primaries_only { "primaries" } else { "hosts" };
        let label = format!(
            "{BACKEND} top {k} {what} for random cluster, duration: {}",
            format_duration(duration)
        );
        // Step equals the window, so the only evaluation is at its end.
        self.fill(query, label, &window, expr, duration.as_secs().max(1));
        Ok(())
    }
}

/// First evaluation instant of a range query over `window`, capped at the
/// window end.
fn first_evaluation(window: &TimeInterval, step_secs: u64) -> i64 {
    let start = window.start().timestamp();
    let end = window.end().timestamp();
    start.saturating_add(step_secs as i64).min(end)
}

/// MetricsQL range literal in whole seconds, e.g. `3600s`.
fn range_literal(duration: Duration) -> String {
    format!("{}s", duration.as_secs().max(1))
}

impl QueryGenerator for VictoriaMetrics {
    fn name(&self) -> &str {
        BACKEND
    }

    fn as_all_metrics_for_hosts(&mut self) -> Option<&mut dyn AllMetricsForHostsFiller> {
        Some(self)
    }

    fn as_all_metrics_for_clusters(&mut self) -> Option<&mut dyn AllMetricsForClustersFiller> {
        Some(self)
    }

    fn as_hourly_avg_metrics_for_hosts(
        &mut self,
    ) -> Option<&mut dyn HourlyAvgMetricsForHostsFiller> {
        Some(self)
    }

    fn as_hourly_avg_metrics_for_clusters(
        &mut self,
    ) -> Option<&mut dyn HourlyAvgMetricsForClustersFiller> {
        Some(self)
    }

    fn as_top_k_hosts_from_cluster(&mut self) -> Option<&mut dyn TopKHostsFromClusterFiller> {
        Some(self)
    }

    fn as_top_k_primaries_from_cluster(
        &mut self,
    ) -> Option<&mut dyn TopKPrimariesFromClusterFiller> {
        Some(self)
    }

    fn as_counter_rate_host(&mut self) -> Option<&mut dyn CounterRateHostFiller> {
        Some(self)
    }
}

impl AllMetricsForHostsFiller for VictoriaMetrics {
    fn all_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Host, hosts, duration)
    }
}

impl AllMetricsForClustersFiller for VictoriaMetrics {
    fn all_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Cluster, clusters, duration)
    }
}

impl HourlyAvgMetricsForHostsFiller for VictoriaMetrics {
    fn hourly_avg_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        metrics: MetricCount,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.hourly_avg(query, metrics, EntityKind::Host, hosts, duration)
    }
}

impl HourlyAvgMetricsForClustersFiller for VictoriaMetrics {
    fn hourly_avg_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        metrics: MetricCount,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.hourly_avg(query, metrics, EntityKind::Cluster, clusters, duration)
    }
}

impl TopKHostsFromClusterFiller for VictoriaMetrics {
    fn top_k_hosts_from_cluster(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, hosts, duration, false)
    }
}

impl TopKPrimariesFromClusterFiller for VictoriaMetrics {
    fn top_k_primaries_from_cluster(
        &mut self,
        query: &mut Query,
        primaries: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, primaries, duration, true)
    }
}

impl CounterRateHostFiller for VictoriaMetrics {
    fn counter_rate_host(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let tags = self.matcher(EntityKind::Host, hosts)?;
        let expr = format!("rate({}[1m])", select_one(COUNTER_METRIC, &tags));

        let label = format!(
            "{BACKEND} counter rate for random {hosts:4} hosts, duration: {}",
            format_duration(duration)
        );
        self.fill(query, label, &window, expr, RAW_STEP_SECS);
        Ok(())
    }
}
