//! Command-line interface for querygen
//!
//! # Usage Examples
//!
//! ```bash
//! # Top-K hosts of a random cluster, as MongoDB pipelines
//! querygen generate \
//!   --query-type topk-hosts-cluster-1-10-1 \
//!   --format mongo \
//!   --queries 100 --seed 42
//!
//! # ClickHouse with tags inlined into the data table, written to a file
//! querygen generate \
//!   --query-type cluster-daily-average \
//!   --format clickhouse --clickhouse-use-tags false \
//!   --span 7d --output daily.jsonl
//!
//! # Use-case matrix
//! querygen list
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use anyhow::Context;
use clap::Parser;
use querygen::cli::{Cli, Commands, GenerateArgs};
use querygen::{generate, matrix, write_queries};
use std::fs::File;
use std::io::{self, BufWriter, Write};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::List => run_list(),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    let queries = generate(&config)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {path:?}"))?;
            write_queries(BufWriter::new(file), &queries)
                .with_context(|| format!("Failed to write queries to {path:?}"))?;
            tracing::info!("Wrote {} queries to {:?}", queries.len(), path);
        }
        None => {
            let stdout = io::stdout();
            write_queries(BufWriter::new(stdout.lock()), &queries)
                .context("Failed to write queries to stdout")?;
        }
    }
    Ok(())
}

fn run_list() -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (use_case, query_types) in matrix::use_case_matrix() {
        writeln!(out, "{use_case}:")?;
        for query_type in query_types {
            writeln!(out, "  {:<30} {}", query_type.name, query_type.scenario)?;
        }
    }
    Ok(())
}
