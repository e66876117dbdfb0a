//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! - **Call**: max(S_T - K, 0), the right to buy at strike K
//! - **Put**: max(K - S_T, 0), the right to sell at strike K
//!
//! # Implementation Notes
//!
//! Payoffs map a terminal price to a value and carry no mutable state, so a
//! single instance is shared by reference across all simulation workers.
//! New contract types implement [`PayoffFunction`]; the built-in vanilla
//! contracts are the closed [`Payoff`] enum.

use crate::error::{validation::validate_positive, PricerError, PricerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payoff evaluated on a terminal asset price
pub trait PayoffFunction: Send + Sync {
    fn calculate(&self, s_t: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Call" => Ok(OptionType::Call),
            "Put" => Ok(OptionType::Put),
            other => Err(PricerError::Config(format!("Invalid option type: {}", other))),
        }
    }
}

/// Vanilla European payoffs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },
}

impl Payoff {
    /// Build a vanilla payoff, rejecting non-positive or non-finite strikes
    pub fn new(option_type: OptionType, k: f64) -> PricerResult<Self> {
        validate_positive("k", k)?;
        Ok(match option_type {
            OptionType::Call => Payoff::EuropeanCall { k },
            OptionType::Put => Payoff::EuropeanPut { k },
        })
    }

    pub fn strike(&self) -> f64 {
        match *self {
            Payoff::EuropeanCall { k } | Payoff::EuropeanPut { k } => k,
        }
    }

    pub fn option_type(&self) -> OptionType {
        match self {
            Payoff::EuropeanCall { .. } => OptionType::Call,
            Payoff::EuropeanPut { .. } => OptionType::Put,
        }
    }
}

impl PayoffFunction for Payoff {
    fn calculate(&self, s_t: f64) -> f64 {
        match *self {
            Payoff::EuropeanCall { k } => (s_t - k).max(0.0),
            Payoff::EuropeanPut { k } => (k - s_t).max(0.0),
        }
    }
}
