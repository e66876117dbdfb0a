//! # mc-pricer: Multithreaded Monte Carlo Pricing of European Options
//!
//! Estimates the fair value of a European call or put by sampling terminal
//! prices under geometric Brownian motion, averaging the discounted payoffs,
//! and reporting the standard error of the estimate.
//!
//! ## Key Features
//!
//! - **Partitioned parallelism**: `N` samples split into contiguous ranges,
//!   one OS thread per range, merged after a single join
//! - **Independent streams**: every worker owns its own generator
//! - **Exact degenerate cases**: `T = 0` and `σ = 0` are handled in closed form
//! - **Fail-fast validation**: bad inputs are rejected before any thread starts
//!
//! ## Quick Start
//!
//! ```rust
//! use mc_pricer::mc::{McConfig, OptionPricer, Payoff};
//! use mc_pricer::models::Gbm;
//!
//! let model = Gbm::new(100.0, 0.05, 0.2).expect("valid parameters");
//! let pricer = OptionPricer::new(&model, McConfig::new(100_000, 4));
//!
//! let result = pricer
//!     .price_option(&Payoff::EuropeanCall { k: 100.0 }, 1.0)
//!     .expect("valid configuration");
//! println!("Option price: {:.4} ± {:.4}", result.price, result.standard_error);
//! ```
//!
//! ## Collaborators
//!
//! [`config`], [`cli`], [`export`] and [`logging`] sit outside the pricing
//! core: they load and check run settings, render results, and install the
//! log subscriber. The core ([`models`], [`mc`]) depends on none of them.

// Module declarations
pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{PricerError, PricerResult};
