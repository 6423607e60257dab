//! # Prob - Log-Space Estimation for Grammar Induction
//!
//! This crate holds the numeric side of EM over CCG derivations.
//!
//! ## Core Concepts
//!
//! - **Log space**: Chart values are logarithms; sums use `log_add`
//! - **Validity**: Every inside/outside value must be a probability in `(0, 1]`
//! - **Expected counts**: `c(parent, outcome)` tables filled per worker and merged
//! - **Smoothing**: `P(o | p) = (c(p, o) + α / N) / (c(p) + α)`
//!
//! ## Example
//!
//! ```rust
//! use ccg_prob::{ConditionalCounts, DirichletModel};
//!
//! let mut counts = ConditionalCounts::new();
//! counts.add("NP", "DT", 1.0).unwrap();
//!
//! let model = DirichletModel::from_counts(counts, 1.0).unwrap();
//! let p = model.probability(&"NP", &"DT", 2).unwrap();
//! assert!((p - 0.75).abs() < 1e-12);
//! ```

mod counts;
mod dirichlet;
mod error;
mod logspace;

pub use counts::ConditionalCounts;
pub use dirichlet::DirichletModel;
pub use error::ProbError;
pub use logspace::{log_add, log_sum, validate, LOG_ONE, LOG_ZERO};

/// Tolerance for probability comparisons in log space.
pub const PROB_TOLERANCE: f64 = 1e-6;
