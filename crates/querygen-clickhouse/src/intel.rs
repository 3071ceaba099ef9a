//! SQL builders for the intel scenarios.

use std::time::Duration;

use querygen_core::{
    format_duration, Core, EntityKind, MetricCatalog, MetricCount, Payload, Query, QueryGenError,
    TimeInterval, COUNTER_METRIC, MEASUREMENT, TOP_K_METRIC,
};
use querygen_scenarios::{
    AllMetricsForClustersFiller, AllMetricsForHostsFiller, CounterRateHostFiller,
    HourlyAvgMetricsForClustersFiller, HourlyAvgMetricsForHostsFiller, LastPointForHostsFiller,
    LastPointPrimaryFiller, QueryGenerator, TopKHostsFromClusterFiller,
    TopKPrimariesFromClusterFiller,
};
use tracing::debug;

use crate::tags::{quote, TagStorage};

/// Data table.
pub const TABLE: &str = MEASUREMENT;

/// Timestamp column of [`TABLE`].
pub const TIME_COLUMN: &str = "created_at";

/// Literal format ClickHouse accepts for `DateTime` comparisons.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BACKEND: &str = "ClickHouse";
const REPLICA_STATE: &str = "replicaSetState";
const PRIMARY: &str = "PRIMARY";

/// ClickHouse query generator.
pub struct ClickHouse {
    core: Core,
    tags: TagStorage,
}

impl ClickHouse {
    pub fn new(core: Core, tags: TagStorage) -> Self {
        Self { core, tags }
    }

    pub fn tags(&self) -> TagStorage {
        self.tags
    }

    fn host_filter(&mut self, hosts: usize) -> Result<String, QueryGenError> {
        let names = self.core.random_hosts(hosts)?;
        Ok(self.tags.entity_filter(EntityKind::Host.tag_key(), &names))
    }

    fn cluster_filter(&mut self, clusters: usize) -> Result<String, QueryGenError> {
        let names = self.core.random_clusters(clusters)?;
        Ok(self.tags.entity_filter(EntityKind::Cluster.tag_key(), &names))
    }

    /// Time column for queries that join the tags table.
    fn time_column(&self) -> String {
        self.tags.data_column(TABLE, TIME_COLUMN)
    }

    fn fill(&self, query: &mut Query, label: String, description: String, sql: String) {
        debug!("{}: {}", label, sql);
        query.fill(
            label,
            description,
            Payload::Sql {
                table: TABLE.to_string(),
                sql,
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
        let filter = match kind {
            EntityKind::Cluster => self.cluster_filter(count)?,
            _ => self.host_filter(count)?,
        };

        let sql = statement(&[
            "SELECT *".to_string(),
            format!("FROM {TABLE}"),
            format!("WHERE {filter} AND {}", time_range(TIME_COLUMN, &window)),
        ]);

        let label = format!(
            "{BACKEND} all metric(s) for random {count:4} {}s, duration: {}",
            kind.prefix(),
            format_duration(duration)
        );
        let description = format!("{label}: {}", window.start_string());
        self.fill(query, label, description, sql);
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
        let metrics = MetricCatalog::resolve(metrics)?;
        let window = self.core.rand_window(duration)?;
        let filter = match kind {
            EntityKind::Cluster => self.cluster_filter(count)?,
            _ => self.host_filter(count)?,
        };
        let entity = self.tags.tag_column(kind.tag_key());
        let time = self.time_column();

        let sql = statement(&[
            "SELECT".to_string(),
            format!("    toStartOfHour({time}) AS hour,"),
            format!("    {entity},"),
            format!("    {}", aggregate_clauses("avg", metrics).join(", ")),
            format!("FROM {TABLE}"),
            self.tags.join(TABLE),
            format!("WHERE {filter} AND {}", time_range(&time, &window)),
            format!("GROUP BY hour, {entity}"),
            format!("ORDER BY hour ASC, {entity} ASC"),
        ]);

        let label = format!(
            "{BACKEND} {} metric(s), random {count:4} {}s, random {} by 1h",
            metrics.len(),
            kind.prefix(),
            format_duration(duration)
        );
        let description = format!("{label}: {}", window.start_string());
        self.fill(query, label, description, sql);
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
        let filter = self.cluster_filter(1)?;
        let host = self.tags.tag_column(EntityKind::Host.tag_key());
        let max_column = format!("max_{TOP_K_METRIC}");

        let mut predicate = format!(
            "WHERE {filter} AND {}",
            time_range(&self.time_column(), &window)
        );
        if primaries_only {
            predicate.push_str(&format!(
                " AND {} = {}",
                self.tags.tag_column(REPLICA_STATE),
                quote(PRIMARY)
            ));
        }

        let sql = statement(&[
            "SELECT".to_string(),
            format!("    max({TABLE}.{TOP_K_METRIC}) AS {max_column},"),
            format!("    {host}"),
            format!("FROM {TABLE}"),
            self.tags.join(TABLE),
            predicate,
            format!("GROUP BY {host}"),
            format!("ORDER BY {max_column} DESC"),
            format!("LIMIT {k}"),
        ]);

        let what = if primaries_only { "primaries" } else { "hosts" };
        let label = format!(
            "{BACKEND} top {k} {what} for random cluster, duration: {}",
            format_duration(duration)
        );
        let description = format!("{label}: {}", window.start_string());
        self.fill(query, label, description, sql);
        Ok(())
    }

    /// Latest row per series, optionally restricted by `filter` and to
    /// primaries.
    fn last_point_sql(&self, filter: Option<&str>, primaries_only: bool) -> String {
        let key = self.tags.series_key();

        match self.tags {
            TagStorage::Separate => {
                let mut lines = vec![
                    "SELECT *".to_string(),
                    "FROM".to_string(),
                    "(".to_string(),
                    "    SELECT *".to_string(),
                    format!("    FROM {TABLE}"),
                    format!("    WHERE ({key}, {TIME_COLUMN}) IN"),
                    "    (".to_string(),
                    format!("        SELECT {key}, max({TIME_COLUMN})"),
                    format!("        FROM {TABLE}"),
                ];
                lines.extend(filter.map(|f| format!("        WHERE {f}")));
                lines.push(format!("        GROUP BY {key}"));
                lines.push("    )".to_string());
                lines.push(") AS c".to_string());
                lines.push(self.tags.join("c"));
                if primaries_only {
                    lines.push(format!("WHERE t.{REPLICA_STATE} = {}", quote(PRIMARY)));
                }
                lines.push(format!("ORDER BY t.hostname ASC, c.{TIME_COLUMN} DESC"));
                statement(&lines)
            }
            TagStorage::Inlined => {
                let mut lines = vec![
                    "SELECT *".to_string(),
                    format!("FROM {TABLE}"),
                    format!("WHERE ({key}, {TIME_COLUMN}) IN"),
                    "(".to_string(),
                    format!("    SELECT {key}, max({TIME_COLUMN})"),
                    format!("    FROM {TABLE}"),
                ];
                lines.extend(filter.map(|f| format!("    WHERE {f}")));
                lines.push(format!("    GROUP BY {key}"));
                lines.push(")".to_string());
                if primaries_only {
                    lines.push(format!("AND {REPLICA_STATE} = {}", quote(PRIMARY)));
                }
                lines.push(format!("ORDER BY hostname ASC, {TIME_COLUMN} DESC"));
                statement(&lines)
            }
        }
    }
}

impl QueryGenerator for ClickHouse {
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

    fn as_last_point_for_hosts(&mut self) -> Option<&mut dyn LastPointForHostsFiller> {
        Some(self)
    }

    fn as_last_point_primary(&mut self) -> Option<&mut dyn LastPointPrimaryFiller> {
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

impl AllMetricsForHostsFiller for ClickHouse {
    fn all_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Host, hosts, duration)
    }
}

impl AllMetricsForClustersFiller for ClickHouse {
    fn all_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Cluster, clusters, duration)
    }
}

impl HourlyAvgMetricsForHostsFiller for ClickHouse {
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

impl HourlyAvgMetricsForClustersFiller for ClickHouse {
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

impl LastPointForHostsFiller for ClickHouse {
    fn last_point_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
    ) -> Result<(), QueryGenError> {
        let filter = self.host_filter(hosts)?;
        let sql = self.last_point_sql(Some(&filter), false);
        let label = format!("{BACKEND} last point for {hosts} hosts");
        self.fill(query, label.clone(), label, sql);
        Ok(())
    }
}

impl LastPointPrimaryFiller for ClickHouse {
    fn last_point_primary(&mut self, query: &mut Query) -> Result<(), QueryGenError> {
        let sql = self.last_point_sql(None, true);
        let label = format!("{BACKEND} last point per primary host");
        self.fill(query, label.clone(), label, sql);
        Ok(())
    }
}

impl TopKHostsFromClusterFiller for ClickHouse {
    fn top_k_hosts_from_cluster(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, hosts, duration, false)
    }
}

impl TopKPrimariesFromClusterFiller for ClickHouse {
    fn top_k_primaries_from_cluster(
        &mut self,
        query: &mut Query,
        primaries: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, primaries, duration, true)
    }
}

impl CounterRateHostFiller for ClickHouse {
    fn counter_rate_host(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let filter = self.host_filter(hosts)?;
        let host = self.tags.tag_column(EntityKind::Host.tag_key());
        let time = self.time_column();

        let sql = statement(&[
            "SELECT".to_string(),
            format!("    toStartOfMinute({time}) AS minute,"),
            format!("    {host},"),
            format!("    (max({COUNTER_METRIC}) - min({COUNTER_METRIC})) / 60 AS rate_{COUNTER_METRIC}"),
            format!("FROM {TABLE}"),
            self.tags.join(TABLE),
            format!("WHERE {filter} AND {}", time_range(&time, &window)),
            format!("GROUP BY minute, {host}"),
            format!("ORDER BY minute ASC, {host} ASC"),
        ]);

        let label = format!(
            "{BACKEND} counter rate for random {hosts:4} hosts, duration: {}",
            format_duration(duration)
        );
        let description = format!("{label}: {}", window.start_string());
        self.fill(query, label, description, sql);
        Ok(())
    }
}

/// `(column >= '..') AND (column < '..')` for a half-open window.
fn time_range(column: &str, window: &TimeInterval) -> String {
    format!(
        "({column} >= '{}') AND ({column} < '{}')",
        window.start().format(TIME_FORMAT),
        window.end().format(TIME_FORMAT)
    )
}

/// `fn(metric) AS fn_metric` for each metric.
fn aggregate_clauses(function: &str, metrics: &[&str]) -> Vec<String> {
    assert!(!metrics.is_empty(), "aggregate over zero metrics");
    metrics
        .iter()
        .map(|m| format!("{function}({m}) AS {function}_{m}"))
        .collect()
}

/// Join statement lines, skipping empty ones.
fn statement<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
