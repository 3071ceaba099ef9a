//! Benchmark scenario catalog and capability dispatch.
//!
//! A [`Scenario`] is a backend-independent query shape bound to its
//! parameters. Backends declare which shapes they can compile by implementing
//! the capability traits in [`capability`] and exposing them through
//! [`QueryGenerator`]:
//!
//! ```text
//! Scenario::fill(&mut dyn QueryGenerator, &mut Query)
//!        │
//!        ├── generator.as_<capability>() == Some(f)  ──▶ f.<capability>(query, params..)
//!        │
//!        └── None ──▶ QueryGenError::UnsupportedScenario { scenario, backend }
//! ```
//!
//! Adding a backend never touches the catalog: it implements the subset of
//! capabilities it can express and every other scenario fails loudly.

pub mod capability;
pub mod scenario;

pub use capability::{
    AllMetricsForClustersFiller, AllMetricsForHostsFiller, CounterRateHostFiller,
    HourlyAvgMetricsForClustersFiller, HourlyAvgMetricsForHostsFiller, LastPointForHostsFiller,
    LastPointPrimaryFiller, QueryGenerator, TopKHostsFromClusterFiller,
    TopKPrimariesFromClusterFiller,
};
pub use scenario::{Scenario, ScenarioKind};
