//! Aggregation pipelines for the intel scenarios.

use std::time::Duration;

use bson::{doc, Bson, Document};
use querygen_core::{
    format_duration, Core, EntityKind, MetricCatalog, MetricCount, Payload, Query, QueryGenError,
    TimeInterval, COUNTER_METRIC, TOP_K_METRIC,
};
use querygen_scenarios::{
    AllMetricsForClustersFiller, AllMetricsForHostsFiller, CounterRateHostFiller,
    HourlyAvgMetricsForClustersFiller, HourlyAvgMetricsForHostsFiller, LastPointForHostsFiller,
    LastPointPrimaryFiller, QueryGenerator, TopKHostsFromClusterFiller,
    TopKPrimariesFromClusterFiller,
};
use tracing::debug;

use crate::stages::{bucket_key, field_accumulator, match_stage, sort_ascending, tag_ref};

/// Collection holding the points.
pub const COLLECTION: &str = "point_data";

const BACKEND: &str = "Mongo";

/// MongoDB query generator.
pub struct Mongo {
    core: Core,
}

impl Mongo {
    pub fn new(core: Core) -> Self {
        Self { core }
    }

    fn fill(&self, query: &mut Query, label: String, description: String, stages: Vec<Document>) {
        debug!("{}: {} stage(s)", label, stages.len());
        query.fill(
            label,
            description,
            Payload::Pipeline {
                collection: COLLECTION.to_string(),
                stages,
            },
        );
    }

    fn sample(&mut self, kind: EntityKind, count: usize) -> Result<Vec<String>, QueryGenError> {
        self.core.random_names(kind, count)
    }

    fn all_metrics(
        &mut self,
        query: &mut Query,
        kind: EntityKind,
        count: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let names = self.sample(kind, count)?;

        let stages = vec![
            match_stage(Some((kind.tag_key(), names.as_slice())), Some(&window), false),
            doc! { "$project": { "_id": 0, "time": 1, "tags": 1, "fields": 1 } },
            doc! { "$sort": { "time": 1 } },
        ];

        let label = format!(
            "{BACKEND} all metric(s) for random {count:4} {}s, duration: {}",
            kind.prefix(),
            format_duration(duration)
        );
        let description = described(&label, &window);
        self.fill(query, label, description, stages);
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
        assert!(!metrics.is_empty(), "hourly average over zero metrics");
        let window = self.core.rand_window(duration)?;
        let names = self.sample(kind, count)?;
        let tag = kind.tag_key();

        let mut group = doc! { "_id": bucket_key("hour", "hour", tag) };
        for metric in metrics {
            group.insert(format!("avg_{metric}"), field_accumulator("$avg", metric));
        }

        let stages = vec![
            match_stage(Some((tag, names.as_slice())), Some(&window), false),
            doc! { "$group": group },
            sort_ascending(&["_id.hour".to_string(), format!("_id.{tag}")]),
        ];

        let label = format!(
            "{BACKEND} {} metric(s), random {count:4} {}s, random {} by 1h",
            metrics.len(),
            kind.prefix(),
            format_duration(duration)
        );
        let description = described(&label, &window);
        self.fill(query, label, description, stages);
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
        let clusters = self.sample(EntityKind::Cluster, 1)?;
        let cluster_tag = EntityKind::Cluster.tag_key();
        let host_tag = EntityKind::Host.tag_key();
        let max_field = format!("max_{TOP_K_METRIC}");
        let n = k as i64;

        let mut per_host_key = Document::new();
        per_host_key.insert(cluster_tag, tag_ref(cluster_tag));
        per_host_key.insert(host_tag, tag_ref(host_tag));
        let mut per_host = doc! { "_id": per_host_key };
        per_host.insert(max_field.as_str(), field_accumulator("$max", TOP_K_METRIC));

        let mut sort_by = Document::new();
        sort_by.insert(max_field.as_str(), -1);
        let mut output = Document::new();
        output.insert(host_tag, format!("$_id.{host_tag}"));
        output.insert(max_field.as_str(), format!("${max_field}"));

        let stages = vec![
            match_stage(
                Some((cluster_tag, clusters.as_slice())),
                Some(&window),
                primaries_only,
            ),
            doc! { "$group": per_host },
            doc! {
                "$group": {
                    "_id": format!("$_id.{cluster_tag}"),
                    "top": {
                        "$topN": {
                            "n": n,
                            "sortBy": sort_by,
                            "output": output,
                        }
                    },
                }
            },
        ];

        let what = if primaries_only { "primaries" } else { "hosts" };
        let label = format!(
            "{BACKEND} top {k} {what} for random cluster, duration: {}",
            format_duration(duration)
        );
        let description = described(&label, &window);
        self.fill(query, label, description, stages);
        Ok(())
    }

    fn last_point(entity: Option<(&str, &[String])>, primaries_only: bool) -> Vec<Document> {
        let host_tag = EntityKind::Host.tag_key();
        vec![
            match_stage(entity, None, primaries_only),
            doc! { "$sort": { "time": -1 } },
            doc! {
                "$group": {
                    "_id": tag_ref(host_tag),
                    "doc": { "$first": "$$ROOT" },
                }
            },
            doc! { "$sort": { "_id": 1 } },
        ]
    }
}

fn described(label: &str, window: &TimeInterval) -> String {
    format!("{label}: {}", window.start_string())
}

impl QueryGenerator for Mongo {
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

impl AllMetricsForHostsFiller for Mongo {
    fn all_metrics_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Host, hosts, duration)
    }
}

impl AllMetricsForClustersFiller for Mongo {
    fn all_metrics_for_clusters(
        &mut self,
        query: &mut Query,
        clusters: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.all_metrics(query, EntityKind::Cluster, clusters, duration)
    }
}

impl HourlyAvgMetricsForHostsFiller for Mongo {
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

impl HourlyAvgMetricsForClustersFiller for Mongo {
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

impl LastPointForHostsFiller for Mongo {
    fn last_point_for_hosts(
        &mut self,
        query: &mut Query,
        hosts: usize,
    ) -> Result<(), QueryGenError> {
        let names = self.sample(EntityKind::Host, hosts)?;
        let stages = Self::last_point(Some((EntityKind::Host.tag_key(), names.as_slice())), false);
        let label = format!("{BACKEND} last point for {hosts} hosts");
        self.fill(query, label.clone(), label, stages);
        Ok(())
    }
}

impl LastPointPrimaryFiller for Mongo {
    fn last_point_primary(&mut self, query: &mut Query) -> Result<(), QueryGenError> {
        let stages = Self::last_point(None, true);
        let label = format!("{BACKEND} last point per primary host");
        self.fill(query, label.clone(), label, stages);
        Ok(())
    }
}

impl TopKHostsFromClusterFiller for Mongo {
    fn top_k_hosts_from_cluster(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, hosts, duration, false)
    }
}

impl TopKPrimariesFromClusterFiller for Mongo {
    fn top_k_primaries_from_cluster(
        &mut self,
        query: &mut Query,
        primaries: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        self.top_k(query, primaries, duration, true)
    }
}

impl CounterRateHostFiller for Mongo {
    fn counter_rate_host(
        &mut self,
        query: &mut Query,
        hosts: usize,
        duration: Duration,
    ) -> Result<(), QueryGenError> {
        let window = self.core.rand_window(duration)?;
        let names = self.sample(EntityKind::Host, hosts)?;
        let host_tag = EntityKind::Host.tag_key();
        let max_field = format!("max_{COUNTER_METRIC}");
        let min_field = format!("min_{COUNTER_METRIC}");

        let mut group = doc! { "_id": bucket_key("minute", "minute", host_tag) };
        group.insert(max_field.as_str(), field_accumulator("$max", COUNTER_METRIC));
        group.insert(min_field.as_str(), field_accumulator("$min", COUNTER_METRIC));

        let rate = doc! {
            "$divide": [
                { "$subtract": [format!("${max_field}"), format!("${min_field}")] },
                60,
            ]
        };
        let mut project = doc! { "_id": 1 };
        project.insert(format!("rate_{COUNTER_METRIC}"), Bson::Document(rate));

        let stages = vec![
            match_stage(Some((host_tag, names.as_slice())), Some(&window), false),
            doc! { "$group": group },
            doc! { "$project": project },
            sort_ascending(&["_id.minute".to_string(), format!("_id.{host_tag}")]),
        ];

        let label = format!(
            "{BACKEND} counter rate for random {hosts:4} hosts, duration: {}",
            format_duration(duration)
        );
        let description = described(&label, &window);
        self.fill(query, label, description, stages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use querygen_core::EntityUniverse;
    use querygen_scenarios::Scenario;

    const HOUR: Duration = Duration::from_secs(3600);

    fn generator() -> Mongo {
        let interval = TimeInterval::new(
            Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2016, 1, 8, 0, 0, 0).unwrap(),
        )
        .unwrap();
        Mongo::new(Core::new(interval, EntityUniverse::default(), 7))
    }

    fn compile(gen: &mut Mongo, scenario: Scenario) -> Query {
        let mut query = Query::new(0);
        scenario.fill(gen, &mut query).unwrap();
        query
    }

    fn stage_names(query: &Query) -> Vec<String> {
        query
            .pipeline()
            .unwrap()
            .iter()
            .map(|stage| stage.keys().next().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_top_k_hosts_from_cluster() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::top_k_hosts_from_cluster(10, HOUR));
        let stages = query.pipeline().unwrap();
        assert_eq!(stage_names(&query), ["$match", "$group", "$group"]);

        let filter = stages[0].get_document("$match").unwrap();
        let clusters = filter
            .get_document("tags.clusterName")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].as_str().unwrap().starts_with("cluster_"));
        assert!(!filter.contains_key("tags.replicaSetState"));

        let top_n = stages[2]
            .get_document("$group")
            .unwrap()
            .get_document("top")
            .unwrap()
            .get_document("$topN")
            .unwrap();
        assert_eq!(top_n.get_i64("n").unwrap(), 10);
        assert_eq!(
            top_n
                .get_document("sortBy")
                .unwrap()
                .get_i32("max_mongodb_extra_info_user_time_us")
                .unwrap(),
            -1
        );
        assert_eq!(
            query.human_label,
            "Mongo top 10 hosts for random cluster, duration: 1h0m0s"
        );
        if let Payload::Pipeline { collection, .. } = &query.payload {
            assert_eq!(collection, "point_data");
        }
    }

    #[test]
    fn test_top_k_primaries_matches_primary_state() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::top_k_primaries_from_cluster(1, HOUR));
        let filter = query.pipeline().unwrap()[0].get_document("$match").unwrap();
        assert_eq!(filter.get_str("tags.replicaSetState").unwrap(), "PRIMARY");
    }

    #[test]
    fn test_all_metrics_for_hosts() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::all_metrics_for_hosts(2, HOUR));
        assert_eq!(stage_names(&query), ["$match", "$project", "$sort"]);

        let filter = query.pipeline().unwrap()[0].get_document("$match").unwrap();
        let time = filter.get_document("time").unwrap();
        let start = time.get_datetime("$gte").unwrap().to_chrono();
        let end = time.get_datetime("$lt").unwrap().to_chrono();
        assert_eq!(end - start, chrono::Duration::hours(1));
        assert_eq!(
            query.human_label,
            "Mongo all metric(s) for random    2 hosts, duration: 1h0m0s"
        );
        assert!(query.human_description.ends_with(&format!(
            ": {}",
            start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        )));
    }

    #[test]
    fn test_hourly_avg_groups_by_hour_and_host() {
        let mut gen = generator();
        let query = compile(
            &mut gen,
            Scenario::hourly_avg_metrics_for_hosts(
                MetricCount::Exactly(10),
                1,
                Duration::from_secs(6 * 24 * 3600),
            ),
        );
        let stages = query.pipeline().unwrap();
        assert_eq!(stage_names(&query), ["$match", "$group", "$sort"]);

        let group = stages[1].get_document("$group").unwrap();
        let id = group.get_document("_id").unwrap();
        assert_eq!(id.get_document("hour").unwrap(), &crate::stages::truncate_time("hour"));
        assert_eq!(id.get_str("hostname").unwrap(), "$tags.hostname");
        // _id plus one accumulator per metric
        assert_eq!(group.len(), 11);

        let first = MetricCatalog::all()[0];
        assert_eq!(
            group
                .get_document(format!("avg_{first}"))
                .unwrap()
                .get_str("$avg")
                .unwrap(),
            format!("$fields.{first}")
        );
    }

    #[test]
    fn test_hourly_avg_all_metrics_for_cluster() {
        let mut gen = generator();
        let query = compile(
            &mut gen,
            Scenario::hourly_avg_metrics_for_clusters(MetricCount::All, 1, 24 * HOUR),
        );
        let group = query.pipeline().unwrap()[1].get_document("$group").unwrap();
        assert_eq!(group.len(), MetricCatalog::len() + 1);
        assert!(group
            .get_document("_id")
            .unwrap()
            .contains_key("clusterName"));
    }

    #[test]
    fn test_last_point_for_hosts() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::last_point_for_hosts(30));
        let stages = query.pipeline().unwrap();
        assert_eq!(stage_names(&query), ["$match", "$sort", "$group", "$sort"]);

        let filter = stages[0].get_document("$match").unwrap();
        assert_eq!(
            filter
                .get_document("tags.hostname")
                .unwrap()
                .get_array("$in")
                .unwrap()
                .len(),
            30
        );
        assert!(!filter.contains_key("time"));
        assert!(!filter.contains_key("tags.replicaSetState"));
        assert_eq!(query.human_description, "Mongo last point for 30 hosts");
    }

    #[test]
    fn test_last_point_primary() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::last_point_primary());
        let filter = query.pipeline().unwrap()[0].get_document("$match").unwrap();
        assert_eq!(
            filter,
            &doc! { "measurement": "intel", "tags.replicaSetState": "PRIMARY" }
        );
    }

    #[test]
    fn test_counter_rate() {
        let mut gen = generator();
        let query = compile(&mut gen, Scenario::counter_rate_host(1, 48 * HOUR));
        assert_eq!(
            stage_names(&query),
            ["$match", "$group", "$project", "$sort"]
        );
        let project = query.pipeline().unwrap()[2].get_document("$project").unwrap();
        assert!(project.contains_key("rate_mongodb_opcounters_query"));
    }
}
