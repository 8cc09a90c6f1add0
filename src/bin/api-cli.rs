use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "api-cli")]
#[command(about = "Smoke and baseline client for the AI for Science API", long_about = None)]
struct Cli {
    /// Base URL including any root path.
    #[arg(short, long, default_value = "http://localhost:8000", env = "API_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the health endpoint
    Health,
    /// Call the generate endpoint once
    Generate {
        prompt: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Call the health endpoint repeatedly; fail on any non-200
    Smoke {
        #[arg(long, default_value_t = 30)]
        requests: usize,
    },
    /// Concurrent generate calls with a failure-rate and p95 threshold
    Baseline {
        #[arg(long, default_value_t = 25)]
        concurrency: usize,
        #[arg(long, default_value_t = 500)]
        requests: usize,
        #[arg(long, default_value = "test prompt")]
        prompt: String,
    },
}

/// Failure rate must stay below 1%.
const MAX_FAILURE_RATE: f64 = 0.01;
/// p95 latency must stay below 900 ms.
const MAX_P95: Duration = Duration::from_millis(900);

struct Summary {
    total: usize,
    failures: usize,
    p95: Duration,
}

impl Summary {
    fn from_samples(mut latencies: Vec<Duration>, failures: usize) -> Self {
        latencies.sort();
        let total = latencies.len() + failures;
        let p95 = if latencies.is_empty() {
            Duration::ZERO
        } else {
            let rank = (latencies.len() * 95).div_ceil(100).max(1);
            latencies[rank - 1]
        };
        Self { total, failures, p95 }
    }

    fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failures as f64 / self.total as f64
        }
    }

    fn passed(&self) -> bool {
        self.failure_rate() < MAX_FAILURE_RATE && self.p95 < MAX_P95
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/api/v1/healthz", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Generate {
            prompt,
            model,
            temperature,
        } => {
            let mut body = json!({ "prompt": prompt });
            if let Some(model) = model {
                body["model"] = json!(model);
            }
            if let Some(temperature) = temperature {
                body["temperature"] = json!(temperature);
            }
            let res = client
                .post(format!("{}/api/v1/llm/generate", base))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Smoke { requests } => {
            let url = format!("{}/api/v1/healthz", base);
            let mut failures = 0;
            for _ in 0..requests {
                match client.get(&url).send().await {
                    Ok(res) if res.status().is_success() => {}
                    _ => failures += 1,
                }
            }
            println!("smoke: {} requests, {} failures", requests, failures);
            if failures > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Baseline {
            concurrency,
            requests,
            prompt,
        } => {
            let summary = run_baseline(&client, &base, concurrency.max(1), requests, &prompt).await;
            println!(
                "baseline: {} requests, failure rate {:.2}%, p95 {} ms",
                summary.total,
                summary.failure_rate() * 100.0,
                summary.p95.as_millis()
            );
            if !summary.passed() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Share `requests` across `workers` so the counts differ by at most one
/// and sum to exactly `requests`.
fn split_requests(requests: usize, workers: usize) -> Vec<usize> {
    let base = requests / workers;
    let extra = requests % workers;
    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}

async fn run_baseline(
    client: &reqwest::Client,
    base: &str,
    concurrency: usize,
    requests: usize,
    prompt: &str,
) -> Summary {
    let url = format!("{}/api/v1/llm/generate", base);
    let shares = split_requests(requests, concurrency);

    let mut tasks = Vec::with_capacity(shares.len());
    for &per_task in &shares {
        let client = client.clone();
        let url = url.clone();
        let body = json!({ "prompt": prompt });
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(per_task);
            let mut failures = 0;
            for _ in 0..per_task {
                let start = Instant::now();
                match client.post(&url).json(&body).send().await {
                    Ok(res) if res.status().is_success() => latencies.push(start.elapsed()),
                    _ => failures += 1,
                }
            }
            (latencies, failures)
        }));
    }

    let mut latencies = Vec::with_capacity(requests);
    let mut failures = 0;
    for (task, per_task) in tasks.into_iter().zip(shares) {
        match task.await {
            Ok((l, f)) => {
                latencies.extend(l);
                failures += f;
            }
            Err(_) => failures += per_task,
        }
    }
    Summary::from_samples(latencies, failures)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{} {}", status, serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{} {}", status, text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p95_and_thresholds() {
        let latencies: Vec<_> = (1..=100).map(Duration::from_millis).collect();
        let summary = Summary::from_samples(latencies, 0);
        assert_eq!(summary.p95, Duration::from_millis(95));
        assert!(summary.passed());

        let slow = Summary::from_samples(vec![Duration::from_secs(2); 10], 0);
        assert!(!slow.passed());

        let flaky = Summary::from_samples(vec![Duration::from_millis(5); 98], 2);
        assert_eq!(flaky.total, 100);
        assert!(!flaky.passed());
    }

    #[test]
    fn test_split_requests_sends_exact_total() {
        assert_eq!(split_requests(500, 3), vec![167, 167, 166]);
        assert_eq!(split_requests(500, 25), vec![20; 25]);
        assert_eq!(split_requests(2, 4), vec![1, 1, 0, 0]);

        for (requests, workers) in [(500, 3), (7, 7), (1, 9), (0, 5), (1001, 13)] {
            assert_eq!(split_requests(requests, workers).iter().sum::<usize>(), requests);
        }
    }
}
