use mc_pricer::analytics::bs_analytic;
use mc_pricer::cli::{CliOptions, USAGE};
use mc_pricer::config::PricingConfig;
use mc_pricer::error::PricerResult;
use mc_pricer::export;
use mc_pricer::logging;
use mc_pricer::mc::{OptionPricer, PricingResult};

fn main() {
    let opts = match CliOptions::parse_from(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if opts.help {
        println!("{}", USAGE);
        return;
    }

    if let Err(e) = logging::init(&opts.log_level, opts.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&opts) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(opts: &CliOptions) -> PricerResult<()> {
    let config = PricingConfig::load(&opts.config_path, &opts.overrides)?;

    if opts.validate_only {
        tracing::info!("configuration valid");
        println!("Configuration {} is valid.", opts.config_path.display());
        return Ok(());
    }

    let model = config.model()?;
    let payoff = config.payoff()?;
    let mc_config = config.mc_config();

    if opts.dry_run {
        tracing::info!("dry run, skipping simulation");
        print_parameters(&config);
        println!(
            "Dry run: {} samples would be split across {} workers.",
            mc_config.samples,
            mc_config.effective_workers()
        );
        return Ok(());
    }

    let result = OptionPricer::new(&model, mc_config).price_option(&payoff, config.maturity())?;
    print_summary(&config, &result);

    if let Some(export) = &config.output.export {
        let formats = config.export_formats()?;
        let written = export::export_all(&export.directory, formats, &result, &config)?;
        for path in written {
            println!("Results written to {}", path.display());
        }
    }
    Ok(())
}

fn print_parameters(config: &PricingConfig) {
    let p = &config.option.parameters;
    println!("Monte Carlo Option Pricing");
    println!("--------------------------");
    println!("Option Type: {}", config.option.option_type);
    println!("Stock Price (S): {}", p.s);
    println!("Strike Price (K): {}", p.k);
    println!("Risk-free Rate (r): {}", p.r);
    println!("Volatility (σ): {}", p.sigma);
    println!("Time to Maturity (T): {} years", p.t);
    println!("Number of Simulations: {}", config.simulation.num_simulations);
    println!("Number of Threads: {}", config.num_threads());
}

fn print_summary(config: &PricingConfig, result: &PricingResult) {
    let p = &config.option.parameters;
    let precision = config.output.precision;
    let analytic = bs_analytic::bs_price(config.option.option_type, p.s, p.k, p.r, p.sigma, p.t);
    let deviation = if result.standard_error > 0.0 {
        (result.price - analytic) / result.standard_error
    } else {
        0.0
    };

    print_parameters(config);
    println!("Calculated Price: {:.*}", precision, result.price);
    println!("Standard Error: {:.*}", precision, result.standard_error);
    println!(
        "Black-Scholes Price: {:.*} ({:+.2} SE)",
        precision, analytic, deviation
    );
    if config.output.show_timing {
        println!("Computation Time: {} ms", result.computation_time_ms());
    }
}
