// src/mc/mc_engine.rs
//! Parallel Monte Carlo driver for European options
//!
//! # Algorithm
//!
//! 1. Split `[0, N)` into `W` contiguous partitions (see [`partition`]).
//! 2. Build a pool of `W` OS threads and broadcast the worker loop to it, so
//!    pool thread `i` runs partition `i` and nothing else. Each worker owns
//!    its RNG and returns its own result slot:
//!    ```text
//!    for i in range: S_T = model(i, Z) ; X = payoff(S_T) ; Σx += X ; Σx² += X²
//!    ```
//! 3. After the broadcast joins, merge the slots single-threaded:
//!    ```text
//!    mean     = Σx / N
//!    variance = max(0, Σx²/N - mean²)
//!    SE       = sqrt(variance / N)
//!    price    = mean · e^{-rT},   SE_disc = SE · e^{-rT}
//!    ```
//!
//! A worker that sees a non-finite running sum (or panics) fails the whole
//! call with [`PricerError::Simulation`]; partial sums from healthy workers
//! are never reported on their own.

use crate::error::{validation::*, PricerError, PricerResult};
use crate::math_utils::Timer;
use crate::mc::payoffs::{OptionType, Payoff, PayoffFunction};
use crate::models::{Gbm, PriceModel};
use crate::rng::{RngFactory, SeedPolicy};
use rand::Rng;
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Iterations between checks of the abort flag and the running sums
pub const ABORT_POLL_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McConfig {
    pub samples: usize,
    /// Worker threads; 0 is treated as 1
    pub workers: usize,
    pub seed: SeedPolicy,
}

impl McConfig {
    pub fn new(samples: usize, workers: usize) -> Self {
        McConfig {
            samples,
            workers,
            seed: SeedPolicy::Entropy,
        }
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    pub fn validate(&self) -> PricerResult<()> {
        validate_samples(self.samples)
    }
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig::new(1_000_000, num_cpus::get())
    }
}

/// Split `samples` indices into `workers` contiguous ranges.
///
/// Every worker receives `samples / workers` indices and the first
/// `samples % workers` workers receive one extra, so
/// `partition(10, 3) == [0..4, 4..7, 7..10]`. Workers beyond `samples` get
/// empty ranges. `workers == 0` is treated as 1.
pub fn partition(samples: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = samples / workers;
    let remainder = samples % workers;

    let mut start = 0;
    (0..workers)
        .map(|worker_id| {
            let len = base + usize::from(worker_id < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Running sums owned by a single worker
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkerPartial {
    pub sum: f64,
    pub sum_sq: f64,
    pub count: usize,
}

impl WorkerPartial {
    #[inline]
    pub fn add(&mut self, payoff: f64) {
        self.sum += payoff;
        self.sum_sq += payoff * payoff;
        self.count += 1;
    }

    pub fn is_finite(&self) -> bool {
        self.sum.is_finite() && self.sum_sq.is_finite()
    }
}

/// Undiscounted payoff statistics merged across all workers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatistics {
    pub total_sum: f64,
    pub total_sq: f64,
    pub count: usize,
}

impl SampleStatistics {
    pub fn from_partials(partials: &[WorkerPartial]) -> Self {
        partials.iter().fold(
            SampleStatistics {
                total_sum: 0.0,
                total_sq: 0.0,
                count: 0,
            },
            |acc, p| SampleStatistics {
                total_sum: acc.total_sum + p.sum,
                total_sq: acc.total_sq + p.sum_sq,
                count: acc.count + p.count,
            },
        )
    }

    pub fn mean(&self) -> f64 {
        self.total_sum / self.count as f64
    }

    /// Population variance, clamped at zero against cancellation in `E[X²] - E[X]²`
    pub fn variance(&self) -> f64 {
        let n = self.count as f64;
        let mean = self.mean();
        (self.total_sq / n - mean * mean).max(0.0)
    }

    pub fn standard_error(&self) -> f64 {
        (self.variance() / self.count as f64).sqrt()
    }

    /// `(price, standard_error)` after applying `discount`
    pub fn discounted(&self, discount: f64) -> (f64, f64) {
        (self.mean() * discount, self.standard_error() * discount)
    }
}

/// Outcome of one pricing call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingResult {
    pub price: f64,
    pub standard_error: f64,
    pub computation_time: Duration,
    pub statistics: SampleStatistics,
    pub workers: usize,
}

impl PricingResult {
    pub fn computation_time_ms(&self) -> u128 {
        self.computation_time.as_millis()
    }

    /// `price ± z·SE`
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.standard_error;
        (self.price - half_width, self.price + half_width)
    }
}

enum WorkerOutcome {
    Done(WorkerPartial),
    Aborted,
    Failed(String),
}

/// Prices European payoffs against a borrowed price model
pub struct OptionPricer<'a, M: PriceModel> {
    model: &'a M,
    config: McConfig,
}

impl<'a, M: PriceModel> OptionPricer<'a, M> {
    pub fn new(model: &'a M, config: McConfig) -> Self {
        OptionPricer { model, config }
    }

    /// Estimate the discounted expected payoff at horizon `t`.
    ///
    /// # Errors
    ///
    /// - validation errors for `samples == 0` or a negative/non-finite `t`,
    ///   raised before any worker is spawned
    /// - [`PricerError::Simulation`] if a worker hits a numeric fault
    /// - [`PricerError::NumericalInstability`] if the merged estimate is not finite
    pub fn price_option<P: PayoffFunction + ?Sized>(
        &self,
        payoff: &P,
        t: f64,
    ) -> PricerResult<PricingResult> {
        validate_non_negative("t", t)?;
        self.config.validate()?;

        let timer = Timer::new();
        let statistics = run_partitions(self.model, payoff, t, &self.config)?;

        let discount = (-self.model.risk_free_rate() * t).exp();
        let (price, standard_error) = statistics.discounted(discount);

        if !price.is_finite() {
            return Err(PricerError::NumericalInstability {
                method: "Monte Carlo".to_string(),
                reason: format!("Price estimate is not finite: {}", price),
            });
        }
        if !standard_error.is_finite() {
            return Err(PricerError::NumericalInstability {
                method: "Monte Carlo".to_string(),
                reason: format!("Standard error is not finite: {}", standard_error),
            });
        }

        let result = PricingResult {
            price,
            standard_error,
            computation_time: timer.elapsed(),
            statistics,
            workers: self.config.effective_workers(),
        };

        tracing::info!(
            price = result.price,
            standard_error = result.standard_error,
            samples = statistics.count,
            workers = result.workers,
            elapsed_ms = result.computation_time_ms() as u64,
            "pricing complete"
        );

        Ok(result)
    }

    /// Undiscounted merged sums, without the final estimate
    pub fn simulate<P: PayoffFunction + ?Sized>(
        &self,
        payoff: &P,
        t: f64,
    ) -> PricerResult<SampleStatistics> {
        validate_non_negative("t", t)?;
        self.config.validate()?;
        run_partitions(self.model, payoff, t, &self.config)
    }
}

/// Price a vanilla option under GBM.
///
/// `workers == 0` runs on a single worker.
pub fn price_option(
    option_type: OptionType,
    model: &Gbm,
    k: f64,
    t: f64,
    samples: usize,
    workers: usize,
) -> PricerResult<PricingResult> {
    let payoff = Payoff::new(option_type, k)?;
    OptionPricer::new(model, McConfig::new(samples, workers)).price_option(&payoff, t)
}

fn run_partitions<M, P>(
    model: &M,
    payoff: &P,
    t: f64,
    cfg: &McConfig,
) -> PricerResult<SampleStatistics>
where
    M: PriceModel,
    P: PayoffFunction + ?Sized,
{
    let workers = cfg.effective_workers();
    let ranges = partition(cfg.samples, workers);
    tracing::debug!(
        samples = cfg.samples,
        workers,
        first = ?ranges.first(),
        last = ?ranges.last(),
        "dispatching partitions"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("mc-worker-{}", i))
        .build()?;

    let factory = RngFactory::new(cfg.seed);
    let abort = AtomicBool::new(false);

    // One call per pool thread; thread `i` owns partition `i` and result slot `i`
    let slots: Vec<WorkerOutcome> = pool.broadcast(|ctx| {
        let worker_id = ctx.index();
        let range = ranges.get(worker_id).cloned().unwrap_or_default();
        run_worker_guarded(worker_id, range, model, payoff, t, factory, &abort)
    });

    let mut partials = Vec::with_capacity(workers);
    for (worker_id, slot) in slots.into_iter().enumerate() {
        match slot {
            WorkerOutcome::Done(partial) => partials.push(partial),
            WorkerOutcome::Failed(reason) => {
                return Err(PricerError::Simulation {
                    worker: worker_id,
                    reason,
                })
            }
            WorkerOutcome::Aborted => {}
        }
    }

    if partials.len() != workers {
        return Err(PricerError::Simulation {
            worker: partials.len(),
            reason: "worker stopped without reporting a result".to_string(),
        });
    }

    Ok(SampleStatistics::from_partials(&partials))
}

fn run_worker_guarded<M, P>(
    worker_id: usize,
    range: Range<usize>,
    model: &M,
    payoff: &P,
    t: f64,
    factory: RngFactory,
    abort: &AtomicBool,
) -> WorkerOutcome
where
    M: PriceModel,
    P: PayoffFunction + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut rng = factory.worker_rng(worker_id);
        run_worker(range, model, payoff, t, &mut rng, abort)
    }))
    .unwrap_or_else(|payload| {
        WorkerOutcome::Failed(format!("worker panicked: {}", panic_message(&*payload)))
    });

    match &outcome {
        WorkerOutcome::Failed(reason) => {
            abort.store(true, Ordering::Relaxed);
            tracing::warn!(worker = worker_id, %reason, "simulation worker failed");
        }
        WorkerOutcome::Done(partial) => {
            tracing::trace!(worker = worker_id, samples = partial.count, "worker finished");
        }
        WorkerOutcome::Aborted => {}
    }
    outcome
}

fn run_worker<M, P, R>(
    range: Range<usize>,
    model: &M,
    payoff: &P,
    t: f64,
    rng: &mut R,
    abort: &AtomicBool,
) -> WorkerOutcome
where
    M: PriceModel,
    P: PayoffFunction + ?Sized,
    R: Rng + ?Sized,
{
    let mut partial = WorkerPartial::default();

    for (n, index) in range.enumerate() {
        if n > 0 && n % ABORT_POLL_INTERVAL == 0 {
            if abort.load(Ordering::Relaxed) {
                return WorkerOutcome::Aborted;
            }
            if !partial.is_finite() {
                return non_finite(&partial, index);
            }
        }
        let s_t = model.terminal_price(t, index, rng);
        partial.add(payoff.calculate(s_t));
    }

    if !partial.is_finite() {
        return non_finite(&partial, partial.count);
    }
    WorkerOutcome::Done(partial)
}

fn non_finite(partial: &WorkerPartial, index: usize) -> WorkerOutcome {
    WorkerOutcome::Failed(format!(
        "non-finite payoff sum (sum = {}, sum_sq = {}) detected before sample {}",
        partial.sum, partial.sum_sq, index
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct ConstantModel {
        s_t: f64,
        r: f64,
        calls: AtomicUsize,
    }

    impl PriceModel for ConstantModel {
        fn terminal_price<R: Rng + ?Sized>(&self, _t: f64, _index: usize, _rng: &mut R) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.s_t
        }

        fn risk_free_rate(&self) -> f64 {
            self.r
        }
    }

    fn constant(s_t: f64, r: f64) -> ConstantModel {
        ConstantModel {
            s_t,
            r,
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_partition_remainder_goes_to_first_workers() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(11, 4), vec![0..3, 3..6, 6..9, 9..11]);
        assert_eq!(partition(12, 4), vec![0..3, 3..6, 6..9, 9..12]);
    }

    #[test]
    fn test_partition_more_workers_than_samples() {
        let ranges = partition(3, 5);
        assert_eq!(ranges, vec![0..1, 1..2, 2..3, 3..3, 3..3]);
    }

    #[test]
    fn test_partition_zero_workers_floors_to_one() {
        assert_eq!(partition(7, 0), vec![0..7]);
    }

    #[test]
    fn test_partition_is_contiguous_and_exhaustive() {
        for samples in [1usize, 2, 17, 1000, 1001] {
            for workers in 1..=9 {
                let ranges = partition(samples, workers);
                assert_eq!(ranges.len(), workers);
                assert_eq!(ranges[0].start, 0);
                assert_eq!(ranges[workers - 1].end, samples);
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "uneven split {:?}", sizes);
            }
        }
    }

    #[test]
    fn test_statistics_from_known_partials() {
        let partials = [
            WorkerPartial {
                sum: 3.0,
                sum_sq: 5.0,
                count: 2,
            }, // payoffs 1, 2
            WorkerPartial {
                sum: 3.0,
                sum_sq: 9.0,
                count: 1,
            }, // payoff 3
        ];
        let stats = SampleStatistics::from_partials(&partials);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_sum, 6.0);
        assert_eq!(stats.total_sq, 14.0);
        assert_eq!(stats.mean(), 2.0);
        assert!((stats.variance() - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.standard_error() - (2.0_f64 / 9.0).sqrt()).abs() < 1e-12);

        let (price, se) = stats.discounted(0.5);
        assert_eq!(price, 1.0);
        assert!((se - 0.5 * (2.0_f64 / 9.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_variance_clamped_for_constant_payoffs() {
        let x = 0.1_f64;
        let n = 1_000usize;
        let stats = SampleStatistics {
            total_sum: x * n as f64,
            total_sq: x * x * n as f64,
            count: n,
        };
        assert!(stats.variance() >= 0.0);
        assert!(stats.standard_error().is_finite());
    }

    #[test]
    fn test_constant_model_prices_exactly() {
        let model = constant(110.0, 0.0);
        let pricer = OptionPricer::new(&model, McConfig::new(1_000, 4));
        let result = pricer
            .price_option(&Payoff::EuropeanCall { k: 100.0 }, 1.0)
            .expect("constant model should price");

        assert_eq!(result.price, 10.0);
        assert_eq!(result.standard_error, 0.0);
        assert_eq!(result.statistics.count, 1_000);
        assert_eq!(result.workers, 4);
        assert_eq!(model.calls.load(Ordering::Relaxed), 1_000);
    }

    #[test]
    fn test_discounting_applies_rate_and_horizon() {
        let model = constant(110.0, 0.05);
        let pricer = OptionPricer::new(&model, McConfig::new(100, 2));
        let result = pricer
            .price_option(&Payoff::EuropeanCall { k: 100.0 }, 2.0)
            .unwrap();
        assert!((result.price - 10.0 * (-0.1_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_samples_fails_before_sampling() {
        let model = constant(100.0, 0.0);
        let pricer = OptionPricer::new(&model, McConfig::new(0, 4));
        let err = pricer
            .price_option(&Payoff::EuropeanCall { k: 100.0 }, 1.0)
            .unwrap_err();
        assert!(err.is_validation(), "unexpected error {:?}", err);
        assert_eq!(model.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let model = constant(100.0, 0.0);
        let pricer = OptionPricer::new(&model, McConfig::new(10, 1));
        assert!(pricer
            .price_option(&Payoff::EuropeanPut { k: 100.0 }, -1.0)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_zero_workers_runs_on_one() {
        let model = constant(90.0, 0.0);
        let cfg = McConfig::new(500, 0);
        assert_eq!(cfg.effective_workers(), 1);

        let result = OptionPricer::new(&model, cfg)
            .price_option(&Payoff::EuropeanPut { k: 100.0 }, 1.0)
            .unwrap();
        assert_eq!(result.workers, 1);
        assert_eq!(result.price, 10.0);
    }

    #[test]
    fn test_fixed_seed_repeats_with_same_worker_count() {
        let model = Gbm::new(100.0, 0.05, 0.2).unwrap();
        let cfg = McConfig::new(20_000, 3).with_seed(SeedPolicy::Fixed(99));
        let payoff = Payoff::EuropeanCall { k: 100.0 };

        let a = OptionPricer::new(&model, cfg).price_option(&payoff, 1.0).unwrap();
        let b = OptionPricer::new(&model, cfg).price_option(&payoff, 1.0).unwrap();
        assert_eq!(a.statistics, b.statistics);
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn test_confidence_interval_brackets_price() {
        let model = Gbm::new(100.0, 0.05, 0.2).unwrap();
        let result = price_option(OptionType::Call, &model, 100.0, 1.0, 10_000, 2).unwrap();
        let (lo, hi) = result.confidence_interval(1.96);
        assert!(lo < result.price && result.price < hi);
    }

    #[test]
    fn test_default_config_uses_all_cpus() {
        let cfg = McConfig::default();
        assert_eq!(cfg.samples, 1_000_000);
        assert_eq!(cfg.workers, num_cpus::get());
        assert_eq!(cfg.seed, SeedPolicy::Entropy);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_large_sample_counts_pass_validation() {
        assert!(McConfig::new(2_000_000_000, 1).validate().is_ok());
        assert!(McConfig::new(usize::MAX, 64).validate().is_ok());
        assert!(McConfig::new(0, 1).validate().is_err());
    }
}
