// src/export.rs
//! Result rendering: plain text, `Parameter,Value` CSV and JSON.

use crate::config::PricingConfig;
use crate::error::{PricerError, PricerResult};
use crate::mc::mc_engine::PricingResult;
use bitflags::bitflags;
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExportFormats: u32 {
        const TEXT = 1 << 0;
        const CSV  = 1 << 1;
        const JSON = 1 << 2;
    }
}

impl ExportFormats {
    /// Parse a single format name, ignoring case
    pub fn from_format_name(name: &str) -> PricerResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormats::TEXT),
            "csv" => Ok(ExportFormats::CSV),
            "json" => Ok(ExportFormats::JSON),
            other => Err(PricerError::InvalidConfiguration {
                field: "formats".to_string(),
                reason: format!("unknown export format '{}'", other),
            }),
        }
    }

    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> PricerResult<Self> {
        names.iter().try_fold(ExportFormats::empty(), |acc, name| {
            Ok(acc | Self::from_format_name(name.as_ref())?)
        })
    }
}

const BASENAME: &str = "mc_result";

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn write_csv<W: Write>(
    mut w: W,
    result: &PricingResult,
    config: &PricingConfig,
) -> PricerResult<()> {
    let p = &config.option.parameters;
    let precision = config.output.precision;

    writeln!(w, "Parameter,Value")?;
    writeln!(w, "num_simulations,{}", config.simulation.num_simulations)?;
    writeln!(w, "num_threads,{}", result.workers)?;
    writeln!(
        w,
        "option_type,{}",
        config.option.option_type.to_string().to_lowercase()
    )?;
    writeln!(w, "S,{}", p.s)?;
    writeln!(w, "K,{}", p.k)?;
    writeln!(w, "r,{}", p.r)?;
    writeln!(w, "sigma,{}", p.sigma)?;
    writeln!(w, "T,{}", p.t)?;
    writeln!(w, "price,{:.*}", precision, result.price)?;
    writeln!(w, "standard_error,{:.*}", precision, result.standard_error)?;
    writeln!(w, "computation_time_ms,{}", result.computation_time_ms())?;
    Ok(())
}

pub fn to_json_value(result: &PricingResult, config: &PricingConfig) -> serde_json::Value {
    let p = &config.option.parameters;
    serde_json::json!({
        "simulation": {
            "num_simulations": config.simulation.num_simulations,
            "num_threads": result.workers,
        },
        "option": {
            "type": config.option.option_type.to_string().to_lowercase(),
            "parameters": {
                "S": p.s,
                "K": p.k,
                "r": p.r,
                "sigma": p.sigma,
                "T": p.t,
            },
        },
        "results": {
            "price": result.price,
            "standard_error": result.standard_error,
            "computation_time_ms": result.computation_time_ms() as u64,
        },
        "metadata": {
            "timestamp": timestamp(),
            "precision": config.output.precision,
        },
    })
}

pub fn write_json<W: Write>(
    mut w: W,
    result: &PricingResult,
    config: &PricingConfig,
) -> PricerResult<()> {
    let value = to_json_value(result, config);
    serde_json::to_writer_pretty(&mut w, &value)
        .map_err(|e| PricerError::Export(e.to_string()))?;
    writeln!(w)?;
    Ok(())
}

pub fn write_text<W: Write>(
    mut w: W,
    result: &PricingResult,
    config: &PricingConfig,
) -> PricerResult<()> {
    let p = &config.option.parameters;
    let precision = config.output.precision;

    writeln!(w, "Monte Carlo Option Pricing Results")?;
    writeln!(w, "=================================")?;
    writeln!(w)?;
    writeln!(w, "Timestamp: {}", timestamp())?;
    writeln!(w)?;
    writeln!(w, "Simulation Parameters:")?;
    writeln!(w, "---------------------")?;
    writeln!(w, "Number of simulations: {}", config.simulation.num_simulations)?;
    writeln!(w, "Number of threads: {}", result.workers)?;
    writeln!(w)?;
    writeln!(w, "Option Parameters:")?;
    writeln!(w, "-----------------")?;
    writeln!(w, "Type: {}", config.option.option_type)?;
    writeln!(w, "Spot Price (S): {}", p.s)?;
    writeln!(w, "Strike Price (K): {}", p.k)?;
    writeln!(w, "Risk-free Rate (r): {}", p.r)?;
    writeln!(w, "Volatility (σ): {}", p.sigma)?;
    writeln!(w, "Time to Maturity (T): {}", p.t)?;
    writeln!(w)?;
    writeln!(w, "Results:")?;
    writeln!(w, "--------")?;
    writeln!(w, "Option Price: {:.*}", precision, result.price)?;
    writeln!(w, "Standard Error: {:.*}", precision, result.standard_error)?;
    writeln!(w, "Computation Time: {} ms", result.computation_time_ms())?;
    Ok(())
}

fn export_file<F>(path: &Path, render: F) -> PricerResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> PricerResult<()>,
{
    let file = File::create(path).map_err(|e| {
        PricerError::Export(format!(
            "Failed to open file for writing: {}: {}",
            path.display(),
            e
        ))
    })?;
    let mut writer = BufWriter::new(file);
    render(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write every selected format into `dir` as `mc_result.{txt,csv,json}`
/// and return the paths written.
pub fn export_all(
    dir: &Path,
    formats: ExportFormats,
    result: &PricingResult,
    config: &PricingConfig,
) -> PricerResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| {
        PricerError::Export(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let mut written = Vec::new();
    if formats.contains(ExportFormats::TEXT) {
        let path = dir.join(format!("{}.txt", BASENAME));
        export_file(&path, |w| write_text(w, result, config))?;
        written.push(path);
    }
    if formats.contains(ExportFormats::CSV) {
        let path = dir.join(format!("{}.csv", BASENAME));
        export_file(&path, |w| write_csv(w, result, config))?;
        written.push(path);
    }
    if formats.contains(ExportFormats::JSON) {
        let path = dir.join(format!("{}.json", BASENAME));
        export_file(&path, |w| write_json(w, result, config))?;
        written.push(path);
    }

    for path in &written {
        tracing::info!(path = %path.display(), "result exported");
    }
    Ok(written)
}
