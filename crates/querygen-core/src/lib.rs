//! Core types for the querygen benchmark query generator.
//!
//! This crate provides the pieces every backend compiler shares:
//!
//! - [`EntityUniverse`] and [`sample_names`] - the synthetic host/cluster
//!   population and the sampler that draws distinct names from it
//! - [`MetricCatalog`] - the fixed, ordered metric list
//! - [`TimeInterval`] - the benchmark time range and random windows in it
//! - [`Core`] - per-backend sampling state with its own seeded RNG
//! - [`Query`] - the envelope a backend fills
//!
//! # Architecture
//!
//! ```text
//! querygen-core (this crate)
//!    │
//!    ├─── querygen-scenarios        (scenario catalog, capability dispatch)
//!    │
//!    ├─── querygen-clickhouse       (SQL)
//!    ├─── querygen-mongodb          (aggregation pipelines)
//!    └─── querygen-victoriametrics  (label selectors)
//! ```

pub mod duration;
pub mod error;
pub mod generator;
pub mod interval;
pub mod metrics;
pub mod query;
pub mod universe;

// Re-exports for convenience
pub use duration::{format_duration, GoDuration};
pub use error::QueryGenError;
pub use generator::{worker_seed, Core};
pub use interval::TimeInterval;
pub use metrics::{MetricCatalog, MetricCount, COUNTER_METRIC, MEASUREMENT, TOP_K_METRIC};
pub use query::{Payload, Query};
pub use universe::{sample_names, EntityKind, EntityUniverse};
