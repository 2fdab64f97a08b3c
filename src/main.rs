//! stream-bench CLI - main entry point.
//!
//! Runs one benchmark against a streaming messages endpoint, prints a
//! progress line per trial and a summary block, and optionally writes the
//! full results as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use stream_bench::report::{render_summary, BenchReport};
use stream_bench::{BenchRunner, RunConfig, Scenario, Summary};

/// Streaming latency/throughput benchmark for `/v1/messages` endpoints.
#[derive(Debug, Parser)]
#[command(name = "stream-bench", version, about)]
struct Args {
    /// Target base URL [default: http://127.0.0.1:8045]
    #[arg(long)]
    base_url: Option<String>,

    /// Sent as `Authorization: Bearer <key>`
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier [default: claude-3-5-sonnet-20241022]
    #[arg(long)]
    model: Option<String>,

    /// Request payload: text | caching | tool [default: text]
    #[arg(long, alias = "profile")]
    scenario: Option<String>,

    /// Measured trials [default: 50]
    #[arg(long, alias = "runs")]
    trials: Option<usize>,

    /// Sequential warmup trials, excluded from stats [default: 5]
    #[arg(long)]
    warmup: Option<usize>,

    /// Concurrent workers [default: 1]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-trial timeout in milliseconds [default: 180000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Sampling temperature [default: 0]
    #[arg(long)]
    temperature: Option<f64>,

    /// Output token budget [default: 1024]
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Write raw results JSON to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> stream_bench::Result<RunConfig> {
        let defaults = RunConfig::default();
        let scenario = match &self.scenario {
            Some(name) => name.parse::<Scenario>()?,
            None => defaults.scenario,
        };

        Ok(RunConfig {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            model: self.model.clone().unwrap_or(defaults.model),
            scenario,
            trials: self.trials.unwrap_or(defaults.trials),
            warmup: self.warmup.unwrap_or(defaults.warmup),
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize observability
    stream_bench::observability::init_tracing();

    let runner = BenchRunner::new(args.to_config()?)?;
    let run = runner.run().await?;
    let summary = Summary::from_results(&run.results);

    println!();
    print!("{}", render_summary(&run, &summary));

    if let Some(path) = &args.out {
        BenchReport::new(&run, &summary).write_json(path)?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}
