// src/models/gbm.rs
//! Geometric Brownian Motion terminal-price sampler
//!
//! Under the risk-neutral measure:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//! with exact solution at horizon T:
//! ```text
//! S_T = S_0 * exp((r - σ²/2)T + σ√T * Z),   Z ~ N(0,1)
//! ```
//! European payoffs only need `S_T`, so one normal draw per sample suffices.

use super::model::PriceModel;
use crate::error::{validation::*, PricerResult};
use crate::rng;
use rand::Rng;

/// Sample one terminal price from a standard normal `draw`.
///
/// Degenerate inputs are exact, not limits:
/// - `t == 0` returns `s0` unchanged, ignoring `r`, `sigma` and `draw`
/// - `sigma == 0` returns `s0 * exp(r * t)`, ignoring `draw`
pub fn sample_terminal_price(s0: f64, r: f64, sigma: f64, t: f64, draw: f64) -> f64 {
    if t == 0.0 {
        return s0;
    }
    if sigma == 0.0 {
        return s0 * (r * t).exp();
    }
    s0 * ((r - 0.5 * sigma * sigma) * t + sigma * t.sqrt() * draw).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gbm {
    pub s0: f64,
    pub r: f64,
    pub sigma: f64,
}

impl Gbm {
    /// Build a model, rejecting values the sampler cannot use.
    /// `sigma == 0` is accepted as a degenerate deterministic model.
    pub fn new(s0: f64, r: f64, sigma: f64) -> PricerResult<Self> {
        validate_positive("s0", s0)?;
        validate_non_negative("r", r)?;
        validate_non_negative("sigma", sigma)?;
        Ok(Gbm { s0, r, sigma })
    }

    /// Expected terminal price `S_0 e^{rT}`
    pub fn forward(&self, t: f64) -> f64 {
        self.s0 * (self.r * t).exp()
    }
}

impl PriceModel for Gbm {
    fn terminal_price<R: Rng + ?Sized>(&self, t: f64, _index: usize, rng: &mut R) -> f64 {
        if t == 0.0 || self.sigma == 0.0 {
            return sample_terminal_price(self.s0, self.r, self.sigma, t, 0.0);
        }
        let z = rng::get_normal_draw(rng);
        sample_terminal_price(self.s0, self.r, self.sigma, t, z)
    }

    fn risk_free_rate(&self) -> f64 {
        self.r
    }
}
