//! # errprop-rs
//!
//! `errprop-rs` propagates uncertainties through symbolic formulas using the
//! first-order (linearized) rule for uncorrelated inputs, built for deriving
//! arsenic mass-balance fractions from exposure regressions.
//!
//! The library provides:
//! - A symbolic expression system with parsing, differentiation and simplification
//! - An `UncertainValue` type for `value ± uncertainty` pairs
//! - A propagation engine that accepts partial bindings and keeps the rest symbolic
//! - Result tables with a single display and JSON rendering path
//! - The distributed-well and household-well mass-balance models
//! - A Monte Carlo cross-check (feature `monte-carlo`)
//!
//! ## Basic Usage
//!
//! ```
//! use std::collections::HashMap;
//! use errprop_rs::{propagate_uncertainty, Expression};
//!
//! let expr = Expression::parse("x * y").unwrap();
//! let values = HashMap::from([("x".to_string(), 20.0), ("y".to_string(), 30.0)]);
//! let uncertainties = HashMap::from([("x".to_string(), 2.0), ("y".to_string(), 3.0)]);
//!
//! let result = propagate_uncertainty(&expr, &values, &uncertainties).unwrap();
//! assert_eq!(result.to_string(), "600.00+-84.85");
//! ```

// Public modules
pub mod error;
pub mod expression;
pub mod mass_balance;
pub mod propagation;
pub mod report;
pub mod uncertain;

// Conditional modules
#[cfg(feature = "monte-carlo")]
pub mod monte_carlo;

// Re-exports for convenience
pub use error::{ErrpropError, Result};
pub use expression::Expression;
pub use propagation::{propagate_uncertainty, Bindings, PropagationConfig, Propagator};
pub use report::{Displayable, Table};
pub use uncertain::UncertainValue;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
