// scripts/benchmark.rs
//! Thread-scaling benchmark: prices the same call at 1, 2, 4, ... workers
//! up to the logical CPU count and records throughput and speedup.
use mc_pricer::analytics::bs_analytic;
use mc_pricer::error::PricerResult;
use mc_pricer::math_utils::Timer;
use mc_pricer::mc::{McConfig, OptionPricer, Payoff};
use mc_pricer::models::Gbm;
use mc_pricer::rng::SeedPolicy;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::Command;

const S0: f64 = 100.0;
const K: f64 = 100.0;
const R: f64 = 0.05;
const SIGMA: f64 = 0.2;
const T: f64 = 1.0;

#[derive(Debug)]
struct SystemInfo {
    os: &'static str,
    cpu_model: String,
    logical_cpus: usize,
    physical_cpus: usize,
    rust_version: String,
}

impl SystemInfo {
    fn gather() -> Self {
        SystemInfo {
            os: env::consts::OS,
            cpu_model: cpu_model(),
            logical_cpus: num_cpus::get(),
            physical_cpus: num_cpus::get_physical(),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}

fn cpu_model() -> String {
    std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|line| line.starts_with("model name"))
                .and_then(|line| line.split(':').nth(1))
                .map(|name| name.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug)]
struct ScalingRow {
    workers: usize,
    samples: usize,
    time_ms: f64,
    samples_per_sec: f64,
    speedup: f64,
    price: f64,
    standard_error: f64,
}

/// 1, 2, 4, ... capped at `max`, always ending with `max`
fn worker_counts(max: usize) -> Vec<usize> {
    let mut counts: Vec<usize> = std::iter::successors(Some(1usize), |&w| Some(w * 2))
        .take_while(|&w| w < max)
        .collect();
    counts.push(max.max(1));
    counts
}

fn run_scaling(samples: usize, max_workers: usize) -> PricerResult<Vec<ScalingRow>> {
    let model = Gbm::new(S0, R, SIGMA)?;
    let payoff = Payoff::EuropeanCall { k: K };

    let mut rows: Vec<ScalingRow> = Vec::new();
    for workers in worker_counts(max_workers) {
        println!("Pricing {} samples on {} worker(s)...", samples, workers);

        let cfg = McConfig::new(samples, workers).with_seed(SeedPolicy::Fixed(42));
        let timer = Timer::new();
        let result = OptionPricer::new(&model, cfg).price_option(&payoff, T)?;
        let time_ms = timer.elapsed_ms();

        let baseline = rows.first().map(|row| row.time_ms).unwrap_or(time_ms);
        rows.push(ScalingRow {
            workers,
            samples,
            time_ms,
            samples_per_sec: samples as f64 / (time_ms / 1000.0),
            speedup: baseline / time_ms,
            price: result.price,
            standard_error: result.standard_error,
        });
    }
    Ok(rows)
}

fn write_csv(rows: &[ScalingRow], info: &SystemInfo, filename: &str) -> PricerResult<()> {
    let mut w = BufWriter::new(File::create(filename)?);

    writeln!(w, "# OS: {}", info.os)?;
    writeln!(w, "# CPU: {}", info.cpu_model)?;
    writeln!(
        w,
        "# Cores: {} logical / {} physical",
        info.logical_cpus, info.physical_cpus
    )?;
    writeln!(w, "# Rust: {}", info.rust_version)?;
    writeln!(
        w,
        "# Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        w,
        "workers,samples,time_ms,samples_per_sec,speedup,price,standard_error"
    )?;
    for row in rows {
        writeln!(
            w,
            "{},{},{:.2},{:.0},{:.3},{:.6},{:.6}",
            row.workers,
            row.samples,
            row.time_ms,
            row.samples_per_sec,
            row.speedup,
            row.price,
            row.standard_error
        )?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> PricerResult<()> {
    let samples = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10_000_000);

    let info = SystemInfo::gather();
    println!("mc-pricer thread scaling benchmark");
    println!("==================================");
    println!("  OS:    {}", info.os);
    println!("  CPU:   {}", info.cpu_model);
    println!(
        "  Cores: {} logical / {} physical",
        info.logical_cpus, info.physical_cpus
    );
    println!("  Rust:  {}\n", info.rust_version);

    let rows = run_scaling(samples, info.logical_cpus)?;
    let analytic = bs_analytic::bs_call_price(S0, K, R, SIGMA, T);

    println!("\n{:=<78}", "");
    println!(
        "{:>8} {:>12} {:>16} {:>9} {:>10} {:>10} {:>8}",
        "Workers", "Time (ms)", "Samples/sec", "Speedup", "Price", "SE", "Dev/SE"
    );
    println!("{:-<78}", "");
    for row in &rows {
        println!(
            "{:>8} {:>12.2} {:>16.0} {:>9.2} {:>10.4} {:>10.6} {:>8.2}",
            row.workers,
            row.time_ms,
            row.samples_per_sec,
            row.speedup,
            row.price,
            row.standard_error,
            (row.price - analytic) / row.standard_error
        );
    }
    println!("{:=<78}", "");
    println!("Black-Scholes reference: {:.6}", analytic);

    let filename = format!(
        "thread_scaling_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    write_csv(&rows, &info, &filename)?;
    println!("\nResults saved to {}", filename);
    println!("Run with: cargo run --release --bin benchmark [SAMPLES]");
    Ok(())
}
