//! Manual and benchmark `GetCertificate` client.
//!
//! `--count 1` (the default) performs a single request and prints the
//! returned certificate's fingerprint. `--count N` with `N > 1` runs the
//! benchmark mode: `N` requests, up to `--concurrency` in flight at once,
//! measuring per-request latency and optionally writing it to a CSV file.

mod csr;

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use hotcert_config::ClientArgs;
use hotcert_rpc::CertificationClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = ClientArgs::parse();

    if args.count <= 1 {
        run_single(&args).await
    } else {
        run_benchmark(&args).await
    }
}

async fn run_single(args: &ClientArgs) -> anyhow::Result<()> {
    let csr = csr::build_csr(1, &args.common_name)?;
    let mut client = CertificationClient::connect(&args.server_addr).await?;

    let start = Instant::now();
    let certificate = client.get_certificate(&csr).await?;
    let elapsed = start.elapsed();

    let fingerprint = Sha256::digest(&certificate);
    println!(
        "Received certificate ({} bytes) in {:?}, fingerprint {}",
        certificate.len(),
        elapsed,
        hex::encode(fingerprint)
    );
    Ok(())
}

async fn run_benchmark(args: &ClientArgs) -> anyhow::Result<()> {
    let semaphore = Arc::new(Semaphore::new(args.concurrency.max(1)));
    let server_addr = args.server_addr.clone();
    let common_name = args.common_name.clone();

    let mut tasks = Vec::with_capacity(args.count);
    for client_id in 0..args.count as u32 {
        let semaphore = semaphore.clone();
        let server_addr = server_addr.clone();
        let common_name = common_name.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let csr = csr::build_csr(client_id, &common_name)?;
            let mut client = CertificationClient::connect(&server_addr).await?;
            let start = Instant::now();
            client.get_certificate(&csr).await?;
            anyhow::Ok(start.elapsed())
        }));
    }

    let mut latencies = Vec::with_capacity(args.count);
    for task in tasks {
        match task.await? {
            Ok(elapsed) => latencies.push(elapsed),
            Err(err) => warn!(%err, "request failed"),
        }
    }

    info!(
        completed = latencies.len(),
        failed = args.count - latencies.len(),
        "benchmark finished"
    );
    report(&latencies);

    if let Some(path) = &args.output {
        write_csv(path, &latencies)?;
        println!("Wrote {} latencies to {}", latencies.len(), path.display());
    }
    Ok(())
}

fn report(latencies: &[Duration]) {
    if latencies.is_empty() {
        println!("No successful requests.");
        return;
    }
    let mut sorted = latencies.to_vec();
    sorted.sort();
    let total: Duration = sorted.iter().sum();
    let mean = total / sorted.len() as u32;
    let p50 = sorted[sorted.len() / 2];
    let p99 = sorted[(sorted.len() * 99 / 100).min(sorted.len() - 1)];
    println!(
        "{} requests: mean {:?}, p50 {:?}, p99 {:?}",
        sorted.len(),
        mean,
        p50,
        p99
    );
}

fn write_csv(path: &std::path::Path, latencies: &[Duration]) -> anyhow::Result<()> {
    let mut out = String::from("time-to-certificate-ms\n");
    for latency in latencies {
        out.push_str(&latency.as_millis().to_string());
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}
