//! CLI argument definitions for querygen.

use crate::config::{Backend, GeneratorConfig};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Benchmark query generator for time-series databases.
#[derive(Parser)]
#[command(name = "querygen")]
#[command(about = "Generate benchmark queries for ClickHouse, MongoDB and VictoriaMetrics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate queries as JSON lines
    Generate(GenerateArgs),

    /// List use cases and their query types
    List,
}

/// Target query language for CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatChoice {
    Clickhouse,
    Mongo,
    Victoriametrics,
}

impl From<FormatChoice> for Backend {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Clickhouse => Backend::ClickHouse,
            FormatChoice::Mongo => Backend::Mongo,
            FormatChoice::Victoriametrics => Backend::VictoriaMetrics,
        }
    }
}

/// Arguments for the generate command.
///
/// Every option overrides the matching field of the config file, if any.
#[derive(Args, Clone, Default)]
pub struct GenerateArgs {
    /// Path to a YAML generator config
    #[arg(long, short = 'c', env = "QUERYGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use case (e.g. "intel")
    #[arg(long)]
    pub use_case: Option<String>,

    /// Query type within the use case (see `querygen list`)
    #[arg(long, short = 'q')]
    pub query_type: Option<String>,

    /// Target query language
    #[arg(long, short = 'f')]
    pub format: Option<FormatChoice>,

    /// Store ClickHouse tags in a separate table (true) or inline (false)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub clickhouse_use_tags: Option<bool>,

    /// Number of simulated hosts
    #[arg(long)]
    pub scale: Option<usize>,

    /// Start of the benchmark range (RFC3339)
    #[arg(long)]
    pub timestamp_start: Option<DateTime<Utc>>,

    /// End of the benchmark range (RFC3339)
    #[arg(long)]
    pub timestamp_end: Option<DateTime<Utc>>,

    /// Length of the benchmark range (e.g. "7d", "36h"); overrides --timestamp-end
    #[arg(long)]
    pub span: Option<String>,

    /// Number of queries to generate
    #[arg(long, short = 'n')]
    pub queries: Option<u64>,

    /// Base random seed (workers derive their own from it)
    #[arg(long, env = "QUERYGEN_SEED")]
    pub seed: Option<u64>,

    /// Number of generator threads
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Output file (defaults to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn resolve(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(use_case) = &self.use_case {
            config.use_case = use_case.clone();
        }
        if let Some(query_type) = &self.query_type {
            config.query_type = query_type.clone();
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        if let Some(use_tags) = self.clickhouse_use_tags {
            config.clickhouse_use_tags = use_tags;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(start) = self.timestamp_start {
            config.timestamp_start = start;
        }
        if let Some(end) = self.timestamp_end {
            config.timestamp_end = end;
            // An explicit end on the command line beats a span from the file.
            if self.span.is_none() {
                config.span = None;
            }
        }
        if let Some(span) = &self.span {
            config.span = Some(span.clone());
        }
        if let Some(queries) = self.queries {
            config.queries = queries;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "querygen",
            "generate",
            "--query-type",
            "last-point-host-30",
            "--format",
            "victoriametrics",
            "--clickhouse-use-tags",
            "false",
            "--timestamp-start",
            "2016-02-01T00:00:00Z",
            "-n",
            "5",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.query_type, "last-point-host-30");
        assert_eq!(config.format, Backend::VictoriaMetrics);
        assert!(!config.clickhouse_use_tags);
        assert_eq!(config.queries, 5);
        assert_eq!(
            config.timestamp_start.to_rfc3339(),
            "2016-02-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_bare_use_tags_flag_means_true() {
        let cli = Cli::try_parse_from(["querygen", "generate", "--clickhouse-use-tags"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.clickhouse_use_tags, Some(true));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "query_type: counter-rate-host-1-48\nformat: mongo\nqueries: 50\nspan: 3d"
        )
        .unwrap();

        let args = GenerateArgs {
            config: Some(file.path().to_path_buf()),
            queries: Some(7),
            timestamp_end: Some("2016-01-05T00:00:00Z".parse().unwrap()),
            ..GenerateArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.query_type, "counter-rate-host-1-48");
        assert_eq!(config.format, Backend::Mongo);
        assert_eq!(config.queries, 7);
        assert_eq!(config.span, None);
        assert_eq!(config.interval().unwrap().end_string(), "2016-01-05T00:00:00Z");
    }
}
