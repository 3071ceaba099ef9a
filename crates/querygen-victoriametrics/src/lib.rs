//! VictoriaMetrics label selector compiler for querygen.
//!
//! Scenarios compile to MetricsQL expressions evaluated as range queries
//! over the sampled window. Last-point scenarios are not supported.

pub mod intel;
pub mod selector;

pub use intel::VictoriaMetrics;
pub use selector::METRIC_PREFIX;
