//! Log-space arithmetic.
//!
//! Chart values are products of many small probabilities, so they are kept
//! as natural logarithms. Sums become `log_add`; products become additions.

use crate::error::ProbError;
use crate::PROB_TOLERANCE;

/// `ln(0)`
pub const LOG_ZERO: f64 = f64::NEG_INFINITY;

/// `ln(1)`
pub const LOG_ONE: f64 = 0.0;

/// `ln(e^a + e^b)` without leaving log space.
///
/// # Example
///
/// ```rust
/// use ccg_prob::log_add;
///
/// let half = 0.5f64.ln();
/// assert!((log_add(half, half) - 0.0).abs() < 1e-12);
/// ```
pub fn log_add(a: f64, b: f64) -> f64 {
    if a == LOG_ZERO {
        return b;
    }
    if b == LOG_ZERO {
        return a;
    }
    let (hi, lo) = if a > b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// `ln(Σ e^x)` over an iterator.
pub fn log_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let values: Vec<f64> = values.into_iter().filter(|v| *v != LOG_ZERO).collect();
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return LOG_ZERO;
    };
    if max.is_infinite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Check that a log value denotes a probability in `(0, 1]`.
///
/// Values a hair above zero from rounding are clamped to `LOG_ONE`.
pub fn validate(log_value: f64) -> Result<f64, ProbError> {
    if log_value.is_nan() || log_value == LOG_ZERO || log_value > PROB_TOLERANCE {
        return Err(ProbError::InvalidProbability { log_value });
    }
    Ok(log_value.min(LOG_ONE))
}
