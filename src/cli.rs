// src/cli.rs
//! Command-line parsing for the `mc-pricer` binary.

use crate::config::{CliOverrides, ThreadCount};
use crate::error::{PricerError, PricerResult};
use std::path::PathBuf;
use std::str::FromStr;

pub const USAGE: &str = "\
Usage: mc-pricer [CONFIG] [OPTIONS]

Prices a European option by Monte Carlo simulation. CONFIG defaults to config.json.

Options:
  --simulations N        number of Monte Carlo samples
  --threads N|auto       worker threads
  --type Call|Put        option type
  --spot S               initial asset price
  --strike K             strike price
  --rate R               risk-free rate
  --sigma V              volatility
  --maturity T           time to maturity in years
  --precision P          decimal places in output
  --timing true|false    show computation time
  --seed N               fixed base seed for worker RNGs
  --export DIR           write results into DIR
  --formats LIST         comma-separated: text,csv,json
  --dry-run              load and validate, print the plan, do not price
  --validate-config      validate the configuration and exit
  --log LEVEL            log filter (overridden by RUST_LOG), default warn
  --log-file PATH        also append log output to PATH
  -h, --help             show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config_path: PathBuf,
    pub overrides: CliOverrides,
    pub dry_run: bool,
    pub validate_only: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            config_path: PathBuf::from("config.json"),
            overrides: CliOverrides::default(),
            dry_run: false,
            validate_only: false,
            log_level: "warn".to_string(),
            log_file: None,
            help: false,
        }
    }
}

impl CliOptions {
    /// Parse arguments, excluding the program name
    pub fn parse_from<I, S>(args: I) -> PricerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut opts = CliOptions::default();
        let mut positional = None;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next().ok_or_else(|| {
                    PricerError::Config(format!("missing value for {}", flag))
                })
            };

            let o = &mut opts.overrides;
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--dry-run" => opts.dry_run = true,
                "--validate-config" => opts.validate_only = true,
                "--simulations" => o.num_simulations = Some(parse(&arg, value(&arg)?)?),
                "--threads" => o.num_threads = Some(value(&arg)?.parse::<ThreadCount>()?),
                "--type" => o.option_type = Some(value(&arg)?.parse()?),
                "--spot" => o.s = Some(parse(&arg, value(&arg)?)?),
                "--strike" => o.k = Some(parse(&arg, value(&arg)?)?),
                "--rate" => o.r = Some(parse(&arg, value(&arg)?)?),
                "--sigma" => o.sigma = Some(parse(&arg, value(&arg)?)?),
                "--maturity" => o.t = Some(parse(&arg, value(&arg)?)?),
                "--precision" => o.precision = Some(parse(&arg, value(&arg)?)?),
                "--timing" => o.show_timing = Some(parse(&arg, value(&arg)?)?),
                "--seed" => o.seed = Some(parse(&arg, value(&arg)?)?),
                "--export" => o.export_dir = Some(PathBuf::from(value(&arg)?)),
                "--formats" => {
                    o.export_formats = Some(
                        value(&arg)?
                            .split(',')
                            .filter(|s| !s.trim().is_empty())
                            .map(|s| s.trim().to_string())
                            .collect(),
                    )
                }
                "--log" => opts.log_level = value(&arg)?,
                "--log-file" => opts.log_file = Some(PathBuf::from(value(&arg)?)),
                flag if flag.starts_with('-') => {
                    return Err(PricerError::Config(format!("unknown option: {}", flag)))
                }
                path => {
                    if positional.replace(PathBuf::from(path)).is_some() {
                        return Err(PricerError::Config(format!(
                            "unexpected extra argument: {}",
                            path
                        )));
                    }
                }
            }
        }

        if let Some(path) = positional {
            opts.config_path = path;
        }
        Ok(opts)
    }
}

fn parse<T: FromStr>(flag: &str, raw: String) -> PricerResult<T> {
    raw.parse::<T>()
        .map_err(|_| PricerError::Config(format!("invalid value for {}: {}", flag, raw)))
}
