// demos/error_handling_demo.rs
use mc_pricer::config::PricingConfig;
use mc_pricer::error::PricerError;
use mc_pricer::mc::{price_option, McConfig, OptionPricer, OptionType, Payoff};
use mc_pricer::models::{Gbm, PriceModel};
use rand::Rng;

/// Produces an overflowing price for one sample
struct Overflowing;

impl PriceModel for Overflowing {
    fn terminal_price<R: Rng + ?Sized>(&self, _t: f64, index: usize, _rng: &mut R) -> f64 {
        if index == 7_777 {
            f64::MAX * 10.0
        } else {
            100.0
        }
    }

    fn risk_free_rate(&self) -> f64 {
        0.0
    }
}

fn main() {
    println!("Error Handling Demo for mc-pricer");
    println!("=================================\n");

    // 1. Invalid model parameters
    println!("1. Testing negative spot price...");
    match Gbm::new(-100.0, 0.05, 0.2) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n2. Testing NaN volatility...");
    match Gbm::new(100.0, 0.05, f64::NAN) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    let model = match Gbm::new(100.0, 0.05, 0.2) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("   Unexpected error: {}", e);
            return;
        }
    };

    // 3. Invalid pricing requests
    println!("\n3. Testing zero samples...");
    match price_option(OptionType::Call, &model, 100.0, 1.0, 0, 4) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n4. Testing zero strike...");
    match price_option(OptionType::Put, &model, 0.0, 1.0, 10_000, 4) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n5. Testing negative maturity...");
    match price_option(OptionType::Call, &model, 100.0, -1.0, 10_000, 4) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // 6. Numeric fault inside a worker
    println!("\n6. Testing overflow inside a worker...");
    match OptionPricer::new(&Overflowing, McConfig::new(20_000, 4))
        .price_option(&Payoff::EuropeanCall { k: 100.0 }, 1.0)
    {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(PricerError::Simulation { worker, reason }) => {
            println!("   ✓ Caught Simulation error in worker {}: {}", worker, reason)
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    // 7. Configuration errors
    println!("\n7. Testing lowercase option type in configuration...");
    let json = r#"{
        "simulation": { "num_simulations": 1000, "num_threads": 2 },
        "option": { "type": "call",
                    "parameters": { "S": 100.0, "K": 100.0, "r": 0.05, "sigma": 0.2, "T": 1.0 } }
    }"#;
    match PricingConfig::from_json_str(json) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // 8. Valid configuration should work, including zero workers
    println!("\n8. Testing valid request with zero workers...");
    match price_option(OptionType::Call, &model, 100.0, 1.0, 10_000, 0) {
        Ok(result) => println!(
            "   ✓ Success: Price = {:.4}, SE = {:.6}, workers = {}",
            result.price, result.standard_error, result.workers
        ),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // 9. Error type matching
    println!("\n9. Testing error type matching...");
    match Gbm::new(100.0, -0.05, 0.2) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(PricerError::InvalidParameters {
            parameter,
            value,
            constraint,
        }) => {
            println!(
                "   ✓ Caught InvalidParameters: {} = {} ({})",
                parameter, value, constraint
            );
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    println!("\n✓ Error handling demo complete!");
    println!("All error cases were properly caught and handled.");
}
