//! Generator configuration.
//!
//! A run is described by a [`GeneratorConfig`], loaded from YAML and then
//! overridden by command-line flags:
//!
//! ```yaml
//! use_case: intel
//! query_type: topk-hosts-cluster-1-10-1
//! format: clickhouse
//! scale: 9000
//! timestamp_start: 2016-01-01T00:00:00Z
//! span: 7d
//! queries: 1000
//! seed: 123
//! workers: 4
//! clickhouse_use_tags: true
//! ```

mod duration;

pub use duration::{parse_duration, parse_duration_to_secs};

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use querygen_core::{EntityUniverse, TimeInterval};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// 2016-01-01T00:00:00Z
const DEFAULT_START_SECS: i64 = 1_451_606_400;

/// Seven days, enough for every query type of the intel use case.
const DEFAULT_SPAN_SECS: i64 = 7 * 86_400;

/// Query language targeted by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    ClickHouse,
    Mongo,
    VictoriaMetrics,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::ClickHouse => write!(f, "clickhouse"),
            Backend::Mongo => write!(f, "mongo"),
            Backend::VictoriaMetrics => write!(f, "victoriametrics"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clickhouse" => Ok(Backend::ClickHouse),
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            "victoriametrics" | "vm" => Ok(Backend::VictoriaMetrics),
            _ => Err(format!("Unknown format: {s}")),
        }
    }
}

/// Everything a generation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub use_case: String,
    pub query_type: String,
    pub format: Backend,
    /// Number of hosts to simulate; ignored when `universe` is set.
    pub scale: usize,
    pub timestamp_start: DateTime<Utc>,
    pub timestamp_end: DateTime<Utc>,
    /// Length of the benchmark range (e.g. "7d"); overrides `timestamp_end`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    pub queries: u64,
    /// Base seed; a random one is drawn (and logged) when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub workers: usize,
    /// Tags live in a separate `tags` table (ClickHouse only).
    pub clickhouse_use_tags: bool,
    /// Explicit topology; takes precedence over `scale`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe: Option<EntityUniverse>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let start = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(DEFAULT_START_SECS);
        Self {
            use_case: "intel".to_string(),
            query_type: "all-metrics-host-1-1".to_string(),
            format: Backend::ClickHouse,
            scale: EntityUniverse::default().hosts(),
            timestamp_start: start,
            timestamp_end: start + TimeDelta::seconds(DEFAULT_SPAN_SECS),
            span: None,
            queries: 1000,
            seed: None,
            workers: 1,
            clickhouse_use_tags: true,
            universe: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {path:?}"))
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// The benchmark time range, honouring `span` when set.
    pub fn interval(&self) -> anyhow::Result<TimeInterval> {
        let end = match &self.span {
            Some(span) => {
                let span = parse_duration(span).context("Invalid span")?;
                let span = TimeDelta::from_std(span).context("Span out of range")?;
                self.timestamp_start
                    .checked_add_signed(span)
                    .context("Span out of range")?
            }
            None => self.timestamp_end,
        };
        Ok(TimeInterval::new(self.timestamp_start, end)?)
    }

    /// The entity population queries sample from.
    pub fn universe(&self) -> EntityUniverse {
        self.universe
            .unwrap_or_else(|| EntityUniverse::from_scale(self.scale))
    }

    /// Reject configurations that cannot produce any output.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queries == 0 {
            anyhow::bail!("queries must be at least 1");
        }
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        if self.universe.is_none() && self.scale == 0 {
            anyhow::bail!("scale must be at least 1");
        }
        self.interval()?;

        if self.universe.is_some() && self.scale != GeneratorConfig::default().scale {
            warn!(
                "Both scale ({}) and an explicit universe are set; using the universe",
                self.scale
            );
        }
        if self.workers as u64 > self.queries {
            warn!(
                "{} workers for {} queries; some workers will be idle",
                self.workers, self.queries
            );
        }
        if self.format != Backend::ClickHouse && !self.clickhouse_use_tags {
            warn!("clickhouse_use_tags has no effect with format {}", self.format);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.use_case, "intel");
        assert_eq!(config.format, Backend::ClickHouse);
        assert_eq!(config.universe(), EntityUniverse::default());
        assert_eq!(
            config.interval().unwrap().duration(),
            std::time::Duration::from_secs(7 * 86_400)
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = GeneratorConfig::from_yaml(
            r#"
query_type: topk-hosts-cluster-1-10-1
format: mongo
scale: 100
queries: 10
seed: 7
"#,
        )
        .unwrap();
        assert_eq!(config.query_type, "topk-hosts-cluster-1-10-1");
        assert_eq!(config.format, Backend::Mongo);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.universe().clusters, 2);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_universe_override() {
        let config = GeneratorConfig::from_yaml(
            r#"
universe:
  clusters: 4
  shards_per_cluster: 2
"#,
        )
        .unwrap();
        let universe = config.universe();
        assert_eq!(universe.clusters, 4);
        assert_eq!(universe.shards_per_cluster, 2);
        assert_eq!(universe.replicas_per_shard, 3);
        assert_eq!(universe.hosts(), 24);
    }

    #[test]
    fn test_span_overrides_end() {
        let config = GeneratorConfig::from_yaml(
            r#"
timestamp_start: 2016-01-01T00:00:00Z
timestamp_end: 2016-01-02T00:00:00Z
span: 3d
"#,
        )
        .unwrap();
        let interval = config.interval().unwrap();
        assert_eq!(interval.end_string(), "2016-01-04T00:00:00Z");
    }

    #[test]
    fn test_span_past_calendar_limit_is_an_error() {
        let config = GeneratorConfig {
            span: Some("300000000d".to_string()),
            ..GeneratorConfig::default()
        };
        let err = config.interval().unwrap_err();
        assert!(format!("{err:#}").contains("Span out of range"), "{err:#}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GeneratorConfig {
            queries: 0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());

        config.queries = 1;
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = 1;
        config.timestamp_end = config.timestamp_start - TimeDelta::hours(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_values_fail() {
        assert!(GeneratorConfig::from_yaml("format: influx").is_err());
        assert!(GeneratorConfig::from_yaml("timestamp_start: yesterday").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "format: victoriametrics\nworkers: 3").unwrap();
        let config = GeneratorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.format, Backend::VictoriaMetrics);
        assert_eq!(config.workers, 3);

        assert!(GeneratorConfig::from_file("/nonexistent/querygen.yaml").is_err());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("ClickHouse".parse::<Backend>().unwrap(), Backend::ClickHouse);
        assert_eq!("mongodb".parse::<Backend>().unwrap(), Backend::Mongo);
        assert_eq!(Backend::VictoriaMetrics.to_string(), "victoriametrics");
        assert!("influx".parse::<Backend>().is_err());
    }
}
