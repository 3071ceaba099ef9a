//! Generation driver: builds per-worker backends and collects their queries.

use anyhow::Context;
use querygen_clickhouse::{ClickHouse, TagStorage};
use querygen_core::{worker_seed, Core, EntityUniverse, Query, QueryGenError, TimeInterval};
use querygen_mongodb::Mongo;
use querygen_scenarios::{QueryGenerator, Scenario};
use querygen_victoriametrics::VictoriaMetrics;
use std::io::Write;
use std::thread;
use tracing::{debug, info};

use crate::config::{Backend, GeneratorConfig};
use crate::matrix;

/// Build a backend compiler owning `core`.
pub fn build_backend(format: Backend, core: Core, use_tags: bool) -> Box<dyn QueryGenerator> {
    match format {
        Backend::ClickHouse => Box::new(ClickHouse::new(core, TagStorage::from_use_tags(use_tags))),
        Backend::Mongo => Box::new(Mongo::new(core)),
        Backend::VictoriaMetrics => Box::new(VictoriaMetrics::new(core)),
    }
}

/// Work assigned to one worker: `count` queries with ids from `first_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPlan {
    pub worker: u64,
    pub first_id: u64,
    pub count: u64,
}

/// Split `queries` across `workers`, earlier workers taking the remainder.
/// Ids are contiguous in worker order.
pub fn plan_workers(queries: u64, workers: usize) -> Vec<WorkerPlan> {
    let workers = workers.max(1) as u64;
    let base = queries / workers;
    let extra = queries % workers;

    let mut next_id = 0;
    (0..workers)
        .map(|worker| {
            let count = base + u64::from(worker < extra);
            let plan = WorkerPlan {
                worker,
                first_id: next_id,
                count,
            };
            next_id += count;
            plan
        })
        .collect()
}

/// Everything a worker needs, shared read-only between threads.
struct Job {
    scenario: Scenario,
    format: Backend,
    use_tags: bool,
    interval: TimeInterval,
    universe: EntityUniverse,
    seed: u64,
}

impl Job {
    fn run(&self, plan: WorkerPlan) -> Result<Vec<Query>, QueryGenError> {
        let core = Core::new(
            self.interval,
            self.universe,
            worker_seed(self.seed, plan.worker),
        );
        let mut backend = build_backend(self.format, core, self.use_tags);

        let mut queries = Vec::with_capacity(plan.count as usize);
        for id in plan.first_id..plan.first_id + plan.count {
            let mut query = Query::new(id);
            self.scenario.fill(backend.as_mut(), &mut query)?;
            queries.push(query);
        }
        debug!(
            "Worker {} generated {} {} queries",
            plan.worker,
            queries.len(),
            backend.name()
        );
        Ok(queries)
    }
}

/// Generate every query described by `config`, in id order.
pub fn generate(config: &GeneratorConfig) -> anyhow::Result<Vec<Query>> {
    config.validate()?;

    let scenario = matrix::lookup(&config.use_case, &config.query_type)?;
    let interval = config.interval()?;
    let universe = config.universe();
    scenario
        .validate(&universe, &interval)
        .with_context(|| format!("Query type '{}' does not fit the configuration", config.query_type))?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "Generating {} {} queries of type {} ({}) with seed {} on {} worker(s)",
        config.queries, config.format, config.query_type, scenario, seed, config.workers
    );

    let job = Job {
        scenario,
        format: config.format,
        use_tags: config.clickhouse_use_tags,
        interval,
        universe,
        seed,
    };
    let plans = plan_workers(config.queries, config.workers);

    let results: Vec<Result<Vec<Query>, QueryGenError>> = thread::scope(|scope| {
        let handles: Vec<_> = plans
            .iter()
            .map(|&plan| {
                let job = &job;
                scope.spawn(move || job.run(plan))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut queries = Vec::with_capacity(config.queries as usize);
    for (plan, result) in plans.iter().zip(results) {
        let batch = result.with_context(|| format!("Worker {} failed", plan.worker))?;
        queries.extend(batch);
    }

    info!("Generated {} queries", queries.len());
    Ok(queries)
}

/// Write one JSON document per line.
pub fn write_queries<W: Write>(mut writer: W, queries: &[Query]) -> anyhow::Result<()> {
    for query in queries {
        serde_json::to_writer(&mut writer, query)
            .with_context(|| format!("Failed to serialize query {}", query.id))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_workers_spreads_remainder() {
        let plans = plan_workers(10, 3);
        let counts: Vec<u64> = plans.iter().map(|p| p.count).collect();
        assert_eq!(counts, [4, 3, 3]);
        let firsts: Vec<u64> = plans.iter().map(|p| p.first_id).collect();
        assert_eq!(firsts, [0, 4, 7]);
    }

    #[test]
    fn test_plan_workers_more_workers_than_queries() {
        let plans = plan_workers(2, 4);
        let counts: Vec<u64> = plans.iter().map(|p| p.count).collect();
        assert_eq!(counts, [1, 1, 0, 0]);
        assert_eq!(plans[3].first_id, 2);
    }

    #[test]
    fn test_build_backend_names() {
        let config = GeneratorConfig::default();
        let core = || Core::new(config.interval().unwrap(), config.universe(), 1);
        assert_eq!(build_backend(Backend::ClickHouse, core(), true).name(), "ClickHouse");
        assert_eq!(build_backend(Backend::Mongo, core(), true).name(), "Mongo");
        assert_eq!(
            build_backend(Backend::VictoriaMetrics, core(), true).name(),
            "VictoriaMetrics"
        );
    }

    #[test]
    fn test_write_queries_json_lines() {
        let config = GeneratorConfig {
            queries: 3,
            seed: Some(1),
            ..GeneratorConfig::default()
        };
        let queries = generate(&config).unwrap();

        let mut out = Vec::new();
        write_queries(&mut out, &queries).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 0);
        assert_eq!(first["payload"]["kind"], "sql");
        assert_eq!(first["payload"]["table"], "intel");
    }
}
