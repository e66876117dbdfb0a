pub mod mc_engine;
pub mod payoffs;

pub use mc_engine::{price_option, McConfig, OptionPricer, PricingResult, SampleStatistics};
pub use payoffs::{OptionType, Payoff, PayoffFunction};
