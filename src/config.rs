// src/config.rs
//! JSON run configuration
//!
//! ```json
//! {
//!   "simulation": { "num_simulations": 1000000, "num_threads": "auto", "seed": 42 },
//!   "option": {
//!     "type": "Call",
//!     "parameters": { "S": 100.0, "K": 100.0, "r": 0.05, "sigma": 0.2, "T": 1.0 }
//!   },
//!   "output": {
//!     "precision": 4,
//!     "show_timing": true,
//!     "export": { "directory": "results", "formats": ["text", "csv", "json"] }
//!   }
//! }
//! ```
//!
//! `seed`, `output` and `output.export` are optional. Values are checked
//! here, at the boundary, so the pricing core only ever sees ranges it accepts.

use crate::error::{validation::*, PricerError, PricerResult};
use crate::export::ExportFormats;
use crate::mc::mc_engine::McConfig;
use crate::mc::payoffs::{OptionType, Payoff};
use crate::models::Gbm;
use crate::rng::SeedPolicy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Worker count setting: a number, or `"auto"` for one per logical CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    #[default]
    Auto,
    Fixed(usize),
}

impl ThreadCount {
    pub fn resolve(&self) -> usize {
        match *self {
            ThreadCount::Auto => num_cpus::get(),
            ThreadCount::Fixed(n) => n,
        }
    }
}

impl FromStr for ThreadCount {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(ThreadCount::Auto);
        }
        s.parse::<usize>()
            .map(ThreadCount::Fixed)
            .map_err(|_| PricerError::Config(format!("Invalid thread count: {}", s)))
    }
}

impl<'de> Deserialize<'de> for ThreadCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(ThreadCount::Fixed(n)),
            Raw::Keyword(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for ThreadCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ThreadCount::Auto => serializer.serialize_str("auto"),
            ThreadCount::Fixed(n) => serializer.serialize_u64(n as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub num_simulations: usize,
    #[serde(default)]
    pub num_threads: ThreadCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParameters {
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub r: f64,
    pub sigma: f64,
    #[serde(rename = "T")]
    pub t: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSettings {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub parameters: OptionParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub directory: PathBuf,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_formats() -> Vec<String> {
    vec!["text".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default = "default_show_timing")]
    pub show_timing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSettings>,
}

fn default_precision() -> usize {
    4
}

fn default_show_timing() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            precision: default_precision(),
            show_timing: default_show_timing(),
            export: None,
        }
    }
}

/// Command-line replacements applied on top of the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub num_simulations: Option<usize>,
    pub num_threads: Option<ThreadCount>,
    pub seed: Option<u64>,
    pub option_type: Option<OptionType>,
    pub s: Option<f64>,
    pub k: Option<f64>,
    pub r: Option<f64>,
    pub sigma: Option<f64>,
    pub t: Option<f64>,
    pub precision: Option<usize>,
    pub show_timing: Option<bool>,
    pub export_dir: Option<PathBuf>,
    pub export_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub simulation: SimulationSettings,
    pub option: OptionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

impl PricingConfig {
    /// Parse without validating
    pub fn from_json_str(json: &str) -> PricerResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            PricerError::Config(format!("Failed to parse configuration file: {}", e))
        })
    }

    /// Read `path`, apply `overrides`, then validate
    pub fn load(path: impl AsRef<Path>, overrides: &CliOverrides) -> PricerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PricerError::Config(format!(
                "Failed to open configuration file: {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_json_str(&text)?;
        config.apply_overrides(overrides);
        config.validate()?;

        tracing::info!(
            path = %path.display(),
            option = %config.option.option_type,
            samples = config.simulation.num_simulations,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn apply_overrides(&mut self, o: &CliOverrides) {
        let sim = &mut self.simulation;
        if let Some(n) = o.num_simulations {
            sim.num_simulations = n;
        }
        if let Some(threads) = o.num_threads {
            sim.num_threads = threads;
        }
        if o.seed.is_some() {
            sim.seed = o.seed;
        }

        if let Some(option_type) = o.option_type {
            self.option.option_type = option_type;
        }
        let p = &mut self.option.parameters;
        p.s = o.s.unwrap_or(p.s);
        p.k = o.k.unwrap_or(p.k);
        p.r = o.r.unwrap_or(p.r);
        p.sigma = o.sigma.unwrap_or(p.sigma);
        p.t = o.t.unwrap_or(p.t);

        let out = &mut self.output;
        out.precision = o.precision.unwrap_or(out.precision);
        out.show_timing = o.show_timing.unwrap_or(out.show_timing);
        if let Some(dir) = &o.export_dir {
            let formats = o
                .export_formats
                .clone()
                .or_else(|| out.export.as_ref().map(|e| e.formats.clone()))
                .unwrap_or_else(default_formats);
            out.export = Some(ExportSettings {
                directory: dir.clone(),
                formats,
            });
        } else if let (Some(formats), Some(export)) = (&o.export_formats, out.export.as_mut()) {
            export.formats = formats.clone();
        }
    }

    /// Strict range checks: every parameter must be positive except `r`,
    /// which may be zero
    pub fn validate(&self) -> PricerResult<()> {
        if self.simulation.num_simulations == 0 {
            return Err(PricerError::InvalidConfiguration {
                field: "num_simulations".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        validate_samples(self.simulation.num_simulations)?;
        if self.num_threads() == 0 {
            return Err(PricerError::InvalidConfiguration {
                field: "num_threads".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let p = &self.option.parameters;
        validate_positive("S", p.s)?;
        validate_positive("K", p.k)?;
        validate_non_negative("r", p.r)?;
        validate_positive("sigma", p.sigma)?;
        validate_positive("T", p.t)?;

        if let Some(export) = &self.output.export {
            ExportFormats::parse_list(&export.formats)?;
        }
        Ok(())
    }

    pub fn num_threads(&self) -> usize {
        self.simulation.num_threads.resolve()
    }

    pub fn maturity(&self) -> f64 {
        self.option.parameters.t
    }

    pub fn model(&self) -> PricerResult<Gbm> {
        let p = &self.option.parameters;
        Gbm::new(p.s, p.r, p.sigma)
    }

    pub fn payoff(&self) -> PricerResult<Payoff> {
        Payoff::new(self.option.option_type, self.option.parameters.k)
    }

    pub fn mc_config(&self) -> McConfig {
        let seed = match self.simulation.seed {
            Some(seed) => SeedPolicy::Fixed(seed),
            None => SeedPolicy::Entropy,
        };
        McConfig::new(self.simulation.num_simulations, self.num_threads()).with_seed(seed)
    }

    pub fn export_formats(&self) -> PricerResult<ExportFormats> {
        match &self.output.export {
            Some(export) => ExportFormats::parse_list(&export.formats),
            None => Ok(ExportFormats::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "simulation": { "num_simulations": 1000000, "num_threads": 4 },
        "option": {
            "type": "Put",
            "parameters": { "S": 100.0, "K": 95.0, "r": 0.05, "sigma": 0.2, "T": 0.5 }
        },
        "output": { "precision": 6, "show_timing": false }
    }"#;

    #[test]
    fn test_parse_sample() {
        let cfg = PricingConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(cfg.simulation.num_simulations, 1_000_000);
        assert_eq!(cfg.simulation.num_threads, ThreadCount::Fixed(4));
        assert_eq!(cfg.option.option_type, OptionType::Put);
        assert_eq!(cfg.option.parameters.k, 95.0);
        assert_eq!(cfg.output.precision, 6);
        assert!(!cfg.output.show_timing);
        assert!(cfg.validate().is_ok());

        assert_eq!(cfg.payoff().unwrap(), Payoff::EuropeanPut { k: 95.0 });
        assert_eq!(cfg.mc_config(), McConfig::new(1_000_000, 4));
        assert_eq!(cfg.maturity(), 0.5);
    }

    #[test]
    fn test_output_section_is_optional() {
        let json = r#"{
            "simulation": { "num_simulations": 10, "num_threads": "auto", "seed": 5 },
            "option": { "type": "Call",
                        "parameters": { "S": 1.0, "K": 1.0, "r": 0.0, "sigma": 0.1, "T": 1.0 } }
        }"#;
        let cfg = PricingConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.output, OutputSettings::default());
        assert_eq!(cfg.simulation.num_threads, ThreadCount::Auto);
        assert_eq!(cfg.num_threads(), num_cpus::get());
        assert_eq!(cfg.mc_config().seed, SeedPolicy::Fixed(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_thread_count_keywords() {
        assert_eq!("auto".parse::<ThreadCount>().unwrap(), ThreadCount::Auto);
        assert_eq!("8".parse::<ThreadCount>().unwrap(), ThreadCount::Fixed(8));
        assert!("many".parse::<ThreadCount>().is_err());

        let bad = SAMPLE.replace("\"num_threads\": 4", "\"num_threads\": \"lots\"");
        assert!(PricingConfig::from_json_str(&bad).is_err());
    }

    #[test]
    fn test_unknown_option_type_rejected() {
        let bad = SAMPLE.replace("\"Put\"", "\"Straddle\"");
        let err = PricingConfig::from_json_str(&bad).unwrap_err();
        assert!(matches!(err, PricerError::Config(_)));
    }

    #[test]
    fn test_validation_rejects_each_bad_field() {
        let base = PricingConfig::from_json_str(SAMPLE).unwrap();

        let mut cfg = base.clone();
        cfg.simulation.num_simulations = 0;
        assert!(cfg.validate().unwrap_err().is_validation());

        let mut cfg = base.clone();
        cfg.simulation.num_threads = ThreadCount::Fixed(0);
        assert!(cfg.validate().unwrap_err().is_validation());

        let mutations: [fn(&mut OptionParameters); 5] = [
            |p| p.s = -100.0,
            |p| p.k = 0.0,
            |p| p.r = -0.01,
            |p| p.sigma = 0.0,
            |p| p.t = 0.0,
        ];
        for mutate in mutations {
            let mut cfg = base.clone();
            mutate(&mut cfg.option.parameters);
            assert!(cfg.validate().unwrap_err().is_validation());
        }

        let mut cfg = base;
        cfg.option.parameters.r = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut cfg = PricingConfig::from_json_str(SAMPLE).unwrap();
        cfg.apply_overrides(&CliOverrides {
            num_simulations: Some(2_000_000),
            option_type: Some(OptionType::Call),
            s: Some(150.0),
            show_timing: Some(true),
            export_dir: Some(PathBuf::from("out")),
            ..Default::default()
        });

        assert_eq!(cfg.simulation.num_simulations, 2_000_000);
        assert_eq!(cfg.option.option_type, OptionType::Call);
        assert_eq!(cfg.option.parameters.s, 150.0);
        assert!(cfg.output.show_timing);
        // untouched
        assert_eq!(cfg.option.parameters.k, 95.0);
        assert_eq!(cfg.option.parameters.sigma, 0.2);
        assert_eq!(cfg.simulation.num_threads, ThreadCount::Fixed(4));

        let export = cfg.output.export.as_ref().unwrap();
        assert_eq!(export.directory, PathBuf::from("out"));
        assert_eq!(export.formats, vec!["text".to_string()]);
    }

    #[test]
    fn test_export_formats_from_config() {
        let json = SAMPLE.replace(
            "\"show_timing\": false",
            "\"show_timing\": false, \"export\": { \"directory\": \"r\", \"formats\": [\"csv\", \"json\"] }",
        );
        let cfg = PricingConfig::from_json_str(&json).unwrap();
        assert_eq!(
            cfg.export_formats().unwrap(),
            ExportFormats::CSV | ExportFormats::JSON
        );

        let bad = json.replace("\"json\"]", "\"xml\"]");
        let cfg = PricingConfig::from_json_str(&bad).unwrap();
        assert!(cfg.validate().is_err());
    }
}
