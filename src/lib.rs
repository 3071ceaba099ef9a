//! querygen library
//!
//! Generates benchmark queries for time-series databases. A run picks a use
//! case and query type from the [`matrix`], compiles that scenario with one
//! backend per worker and emits the filled queries as JSON lines.
//!
//! # Workspace crates
//!
//! - `querygen_core` - entity universe, metric catalog, time windows, query envelope
//! - `querygen_scenarios` - scenario catalog and capability dispatch
//! - `querygen_clickhouse` - SQL, with separate or inlined tags
//! - `querygen_mongodb` - aggregation pipelines
//! - `querygen_victoriametrics` - MetricsQL selectors
//!
//! # CLI Usage
//!
//! ```bash
//! # 1000 ClickHouse queries, tags in a separate table
//! querygen generate --query-type all-metrics-host-1-1 --format clickhouse --clickhouse-use-tags
//!
//! # Same run driven by a config file, four worker threads
//! querygen generate --config querygen.yaml --workers 4 --output queries.jsonl
//!
//! # Show every use case and query type
//! querygen list
//! ```

pub mod cli;
pub mod config;
pub mod generate;
pub mod matrix;

pub use config::{Backend, GeneratorConfig};
pub use generate::{generate, write_queries};

