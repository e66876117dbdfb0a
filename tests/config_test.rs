// tests/config_test.rs
use mc_pricer::config::{CliOverrides, PricingConfig, ThreadCount};
use mc_pricer::export::ExportFormats;
use mc_pricer::mc::{OptionPricer, OptionType, Payoff};
use mc_pricer::rng::SeedPolicy;
use mc_pricer::PricerError;
use std::fs;
use std::path::PathBuf;

const CONFIG: &str = r#"{
    "simulation": { "num_simulations": 200000, "num_threads": "auto", "seed": 11 },
    "option": {
        "type": "Call",
        "parameters": { "S": 100.0, "K": 100.0, "r": 0.05, "sigma": 0.2, "T": 1.0 }
    },
    "output": {
        "precision": 4,
        "show_timing": true,
        "export": { "directory": "results", "formats": ["text", "csv"] }
    }
}"#;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "mc_pricer_{}_{}.json",
        std::process::id(),
        name
    ));
    fs::write(&path, contents).expect("temp dir is writable");
    path
}

#[test]
fn test_load_from_file() {
    let path = write_temp("load", CONFIG);
    let cfg = PricingConfig::load(&path, &CliOverrides::default()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.simulation.num_simulations, 200_000);
    assert_eq!(cfg.simulation.num_threads, ThreadCount::Auto);
    assert_eq!(cfg.num_threads(), num_cpus::get());
    assert_eq!(cfg.option.option_type, OptionType::Call);
    assert_eq!(cfg.mc_config().seed, SeedPolicy::Fixed(11));
    assert_eq!(
        cfg.export_formats().unwrap(),
        ExportFormats::TEXT | ExportFormats::CSV
    );
}

#[test]
fn test_cli_overrides_take_precedence() {
    let path = write_temp("overrides", CONFIG);
    let overrides = CliOverrides {
        num_threads: Some(ThreadCount::Fixed(3)),
        option_type: Some(OptionType::Put),
        k: Some(110.0),
        sigma: Some(0.35),
        precision: Some(2),
        export_formats: Some(vec!["json".to_string()]),
        ..Default::default()
    };
    let cfg = PricingConfig::load(&path, &overrides).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.num_threads(), 3);
    assert_eq!(cfg.payoff().unwrap(), Payoff::EuropeanPut { k: 110.0 });
    assert_eq!(cfg.option.parameters.sigma, 0.35);
    assert_eq!(cfg.option.parameters.s, 100.0);
    assert_eq!(cfg.output.precision, 2);
    assert_eq!(cfg.export_formats().unwrap(), ExportFormats::JSON);
}

#[test]
fn test_override_is_validated() {
    let path = write_temp("bad_override", CONFIG);
    let overrides = CliOverrides {
        sigma: Some(-0.2),
        ..Default::default()
    };
    let err = PricingConfig::load(&path, &overrides).unwrap_err();
    fs::remove_file(&path).ok();

    println!("\nError: {}", err);
    assert!(err.is_validation());
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("mc_pricer_definitely_missing.json");
    let err = PricingConfig::load(&path, &CliOverrides::default()).unwrap_err();

    println!("\nError: {}", err);
    assert!(matches!(err, PricerError::Config(_)));
}

#[test]
fn test_malformed_json() {
    let path = write_temp("malformed", "{ \"simulation\": ");
    let err = PricingConfig::load(&path, &CliOverrides::default()).unwrap_err();
    fs::remove_file(&path).ok();

    assert!(matches!(err, PricerError::Config(_)));
}

#[test]
fn test_unknown_export_format_rejected() {
    let path = write_temp("bad_format", &CONFIG.replace("\"csv\"", "\"xml\""));
    let err = PricingConfig::load(&path, &CliOverrides::default()).unwrap_err();
    fs::remove_file(&path).ok();

    println!("\nError: {}", err);
    assert!(err.is_validation());
}

#[test]
fn test_loaded_config_prices() {
    let path = write_temp("prices", CONFIG);
    let cfg = PricingConfig::load(
        &path,
        &CliOverrides {
            num_simulations: Some(20_000),
            num_threads: Some(ThreadCount::Fixed(2)),
            ..Default::default()
        },
    )
    .unwrap();
    fs::remove_file(&path).ok();

    let model = cfg.model().unwrap();
    let payoff = cfg.payoff().unwrap();
    let first = OptionPricer::new(&model, cfg.mc_config())
        .price_option(&payoff, cfg.maturity())
        .unwrap();
    let second = OptionPricer::new(&model, cfg.mc_config())
        .price_option(&payoff, cfg.maturity())
        .unwrap();

    // fixed seed in the file: identical reruns
    assert_eq!(first.price, second.price);
    assert_eq!(first.workers, 2);
    assert!(first.price > 5.0 && first.price < 16.0);
}
