//! Use-case matrix: `(use case, query type) -> scenario`.

use querygen_core::MetricCount;
use querygen_scenarios::Scenario;
use std::collections::BTreeMap;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3600);

/// A named, fully parameterised query type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryType {
    pub name: &'static str,
    pub scenario: Scenario,
}

/// Query types of the `intel` use case.
pub fn intel_query_types() -> Vec<QueryType> {
    vec![
        QueryType {
            name: "all-metrics-host-1-1",
            scenario: Scenario::all_metrics_for_hosts(1, HOUR),
        },
        QueryType {
            name: "all-metrics-host-1-48",
            scenario: Scenario::all_metrics_for_hosts(1, 48 * HOUR),
        },
        QueryType {
            name: "all-metrics-cluster-1-48",
            scenario: Scenario::all_metrics_for_clusters(1, 48 * HOUR),
        },
        QueryType {
            name: "last-point-primary-host",
            scenario: Scenario::last_point_primary(),
        },
        QueryType {
            name: "last-point-host-30",
            scenario: Scenario::last_point_for_hosts(30),
        },
        QueryType {
            name: "topk-hosts-cluster-1-10-1",
            scenario: Scenario::top_k_hosts_from_cluster(10, HOUR),
        },
        QueryType {
            name: "topk-primaries-cluster-1-1-1",
            scenario: Scenario::top_k_primaries_from_cluster(1, HOUR),
        },
        QueryType {
            name: "avg-metrics-host-10-1-1",
            scenario: Scenario::hourly_avg_metrics_for_hosts(
                MetricCount::Exactly(10),
                1,
                6 * 24 * HOUR,
            ),
        },
        QueryType {
            name: "cluster-daily-average",
            scenario: Scenario::hourly_avg_metrics_for_clusters(MetricCount::All, 1, 24 * HOUR),
        },
        QueryType {
            name: "counter-rate-host-1-48",
            scenario: Scenario::counter_rate_host(1, 48 * HOUR),
        },
    ]
}

/// Every use case and its query types.
pub fn use_case_matrix() -> BTreeMap<&'static str, Vec<QueryType>> {
    let mut matrix = BTreeMap::new();
    matrix.insert("intel", intel_query_types());
    matrix
}

/// Resolve a query type name within a use case.
pub fn lookup(use_case: &str, query_type: &str) -> anyhow::Result<Scenario> {
    let matrix = use_case_matrix();
    let Some(types) = matrix.get(use_case) else {
        let known: Vec<&str> = matrix.keys().copied().collect();
        anyhow::bail!(
            "Unknown use case '{use_case}' (known: {})",
            known.join(", ")
        );
    };

    types
        .iter()
        .find(|t| t.name == query_type)
        .map(|t| t.scenario)
        .ok_or_else(|| {
            let known: Vec<&str> = types.iter().map(|t| t.name).collect();
            anyhow::anyhow!(
                "Unknown query type '{query_type}' for use case '{use_case}' (known: {})",
                known.join(", ")
            )
        })
}
