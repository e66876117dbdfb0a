// demos/demo.rs
use mc_pricer::analytics::bs_analytic;
use mc_pricer::config::PricingConfig;
use mc_pricer::export::{self, ExportFormats};
use mc_pricer::math_utils::Timer;
use mc_pricer::mc::{McConfig, OptionPricer, OptionType, Payoff, PayoffFunction};
use mc_pricer::models::Gbm;
use mc_pricer::rng::SeedPolicy;
use mc_pricer::{logging, PricerResult};

/// Cash-or-nothing call paying 1 above the strike
struct DigitalCall {
    k: f64,
}

impl PayoffFunction for DigitalCall {
    fn calculate(&self, s_t: f64) -> f64 {
        if s_t > self.k {
            1.0
        } else {
            0.0
        }
    }
}

fn main() -> PricerResult<()> {
    logging::init("info", None)?;
    println!("Running mc-pricer Monte Carlo Demo\n");

    let samples = 1_000_000;
    let workers = num_cpus::get();
    let s0 = 100.0;
    let k = 100.0;
    let r = 0.05;
    let sigma = 0.2;
    let t = 1.0;

    let model = Gbm::new(s0, r, sigma)?;
    let pricer = OptionPricer::new(&model, McConfig::new(samples, workers));

    // --- Vanilla Pricing ---
    for option_type in [OptionType::Call, OptionType::Put] {
        println!("--- European {} ---", option_type);
        let payoff = Payoff::new(option_type, k)?;
        let result = pricer.price_option(&payoff, t)?;
        let analytic = bs_analytic::bs_price(option_type, s0, k, r, sigma, t);
        let (lo, hi) = result.confidence_interval(1.96);

        println!(
            "MC Price: {:.6} ({} ms, {} workers)",
            result.price,
            result.computation_time_ms(),
            result.workers
        );
        println!("Standard Error: {:.6}", result.standard_error);
        println!("95% CI: [{:.6}, {:.6}]", lo, hi);
        println!("Analytic Price: {:.6}", analytic);
        println!(
            "Deviation: {:+.2} SE\n",
            (result.price - analytic) / result.standard_error
        );
    }

    // --- Custom Payoff ---
    println!("--- Digital Call (custom payoff) ---");
    let digital = pricer.price_option(&DigitalCall { k }, t)?;
    let d2 = ((s0 / k).ln() + (r - 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let analytic_digital = (-r * t).exp() * mc_pricer::math_utils::norm_cdf(d2);
    println!(
        "MC Price: {:.6} ± {:.6}",
        digital.price, digital.standard_error
    );
    println!("Analytic Price: {:.6}\n", analytic_digital);

    // --- Convergence ---
    println!("--- Standard Error vs Samples ---");
    let call = Payoff::EuropeanCall { k };
    for n in [10_000, 100_000, 1_000_000, 10_000_000] {
        let mut timer = Timer::new();
        timer.start();
        let result = OptionPricer::new(&model, McConfig::new(n, workers)).price_option(&call, t)?;
        let elapsed_ms = timer.elapsed_ms();
        println!(
            "N = {:>10}: price {:.6}, SE {:.6}, {:>10.0} samples/sec",
            n,
            result.price,
            result.standard_error,
            n as f64 / (elapsed_ms / 1000.0)
        );
    }

    // --- Reproducibility ---
    println!("\n--- Fixed Seed ---");
    let seeded = McConfig::new(200_000, 4).with_seed(SeedPolicy::Fixed(12345));
    let first = OptionPricer::new(&model, seeded).price_option(&call, t)?;
    let second = OptionPricer::new(&model, seeded).price_option(&call, t)?;
    println!("Run 1: {:.10}", first.price);
    println!("Run 2: {:.10}", second.price);
    println!("Identical: {}\n", first.price == second.price);

    // --- Export ---
    let config = PricingConfig::from_json_str(&format!(
        r#"{{
            "simulation": {{ "num_simulations": {}, "num_threads": {} }},
            "option": {{ "type": "Call",
                         "parameters": {{ "S": {}, "K": {}, "r": {}, "sigma": {}, "T": {} }} }}
        }}"#,
        200_000, 4, s0, k, r, sigma, t
    ))?;
    config.validate()?;
    let written = export::export_all(
        std::path::Path::new("results"),
        ExportFormats::all(),
        &first,
        &config,
    )?;
    for path in written {
        println!("Results written to {}", path.display());
    }
    Ok(())
}
