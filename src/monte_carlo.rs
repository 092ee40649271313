//! # Monte Carlo Uncertainty Propagation
//!
//! Sampling-based counterpart of the linearized propagation engine. Every
//! bound variable is drawn independently from `Normal(value, |uncertainty|)`
//! and the expression is evaluated for each draw. For formulas that are
//! strongly non-linear over the uncertainty range the sample spread can
//! differ noticeably from the first-order result, which makes this a useful
//! cross-check.
//!
//! ## Example Usage
//!
//! ```rust
//! use errprop_rs::expression::Expression;
//! use errprop_rs::monte_carlo::monte_carlo_propagate;
//! use errprop_rs::propagation::Bindings;
//! use errprop_rs::UncertainValue;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let expr = Expression::parse("x + y").unwrap();
//! let bindings = Bindings::from_uncertain_values([
//!     ("x", UncertainValue::new(1.0, 0.3)),
//!     ("y", UncertainValue::new(2.0, 0.4)),
//! ]);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let result = monte_carlo_propagate(&expr, &bindings, 20_000, &[0.68, 0.95], &mut rng).unwrap();
//! assert!((result.mean - 3.0).abs() < 0.05);
//! assert!((result.std - 0.5).abs() < 0.05);
//! ```

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::error::{ErrpropError, Result};
use crate::expression::{Expression, SimpleContext};
use crate::propagation::Bindings;
use crate::uncertain::UncertainValue;

/// Result of a Monte Carlo propagation
#[derive(Debug, Clone)]
pub struct MonteCarloResult {
    /// Sorted values of the expression, one per draw
    pub samples: Array1<f64>,

    /// Sample mean
    pub mean: f64,

    /// Sample standard deviation (population form)
    pub std: f64,

    /// Median (50th percentile)
    pub median: f64,

    /// Central intervals at the requested coverage levels.
    /// Vec of (coverage, (lower_bound, upper_bound)) tuples
    pub percentiles: Vec<(f64, (f64, f64))>,
}

impl MonteCarloResult {
    /// Mean and standard deviation as an uncertain value
    pub fn to_uncertain_value(&self) -> UncertainValue {
        UncertainValue::new(self.mean, self.std)
    }

    /// Central interval for the given coverage level, if it was requested
    pub fn interval(&self, coverage: f64) -> Option<(f64, f64)> {
        self.percentiles
            .iter()
            .find(|(p, _)| *p == coverage)
            .map(|(_, bounds)| *bounds)
    }
}

/// Propagate uncertainties through `expr` by random sampling
///
/// # Arguments
///
/// * `expr` - The expression to evaluate
/// * `bindings` - Values and uncertainties of every variable in `expr`
/// * `n_samples` - Number of draws, at least 2
/// * `percentiles` - Coverage levels for central intervals (e.g., 0.95 for 95%)
/// * `rng` - Random number generator
///
/// # Returns
///
/// * `MonteCarloResult` - Sample statistics of the expression
pub fn monte_carlo_propagate(
    expr: &Expression,
    bindings: &Bindings,
    n_samples: usize,
    percentiles: &[f64],
    rng: &mut impl Rng,
) -> Result<MonteCarloResult> {
    if n_samples < 2 {
        return Err(ErrpropError::InvalidInput(format!(
            "Monte Carlo propagation needs at least 2 samples, got {}",
            n_samples
        )));
    }

    let mut inputs = Vec::new();
    for name in expr.variables() {
        let uval = bindings.get(&name).ok_or_else(|| {
            ErrpropError::InvalidInput(format!("no value bound for variable '{}'", name))
        })?;
        let distribution = if *uval.uncertainty() == 0.0 {
            None
        } else {
            let normal = Normal::new(*uval.value(), uval.uncertainty().abs()).map_err(|e| {
                ErrpropError::InvalidInput(format!("cannot sample '{}': {}", name, e))
            })?;
            Some(normal)
        };
        inputs.push((name, *uval.value(), distribution));
    }
    debug!(
        expression = %expr,
        n_samples,
        variables = inputs.len(),
        "Monte Carlo propagation"
    );

    let mut context = SimpleContext::new();
    for (name, uval) in bindings.iter() {
        context.set_uncertainty(&name, *uval.uncertainty());
    }

    let mut values = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        for (name, value, distribution) in &inputs {
            let draw = match distribution {
                Some(normal) => normal.sample(rng),
                None => *value,
            };
            context.set_variable(name, draw);
        }
        values.push(expr.evaluate(&context)?);
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let samples = Array1::from(values);

    let n = samples.len();
    let mean = samples.sum() / n as f64;
    let std = samples.std(0.0);

    let median = if n % 2 == 0 {
        (samples[n / 2 - 1] + samples[n / 2]) / 2.0
    } else {
        samples[n / 2]
    };

    let mut percentile_results = Vec::with_capacity(percentiles.len());
    for &p in percentiles {
        let lower_idx = ((n as f64) * ((1.0 - p) / 2.0)).round() as usize;
        let upper_idx = ((n as f64) * (1.0 - (1.0 - p) / 2.0)).round() as usize;

        let lower = samples[lower_idx.min(n - 1)];
        let upper = samples[upper_idx.min(n - 1)];

        percentile_results.push((p, (lower, upper)));
    }

    Ok(MonteCarloResult {
        samples,
        mean,
        std,
        median,
        percentiles: percentile_results,
    })
}
