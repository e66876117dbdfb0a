// src/models/model.rs
use rand::Rng;

/// Source of terminal asset prices for the simulation driver.
///
/// `index` is the global sample index in `[0, samples)`. Closed-form models
/// ignore it; instrumented models may use it to record coverage.
/// Implementors are shared by reference across worker threads.
pub trait PriceModel: Send + Sync {
    fn terminal_price<R: Rng + ?Sized>(&self, t: f64, index: usize, rng: &mut R) -> f64;

    /// Continuously compounded rate used for discounting
    fn risk_free_rate(&self) -> f64;
}
