//! # Uncertainty Propagation
//!
//! First-order (linearized) propagation of uncorrelated uncertainties through
//! a symbolic expression:
//!
//! ```text
//! σ_f = sqrt( Σ_v (∂f/∂v)² · d(v)² )
//! ```
//!
//! The derivative terms are built symbolically, then uncertainties and values
//! are substituted. Anything left unbound stays symbolic in the result, so a
//! partially bound call returns a formula rather than failing.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use errprop_rs::expression::Expression;
//! use errprop_rs::propagation::propagate_uncertainty;
//!
//! let expr = Expression::parse("x * y").unwrap();
//!
//! let result = propagate_uncertainty(&expr, &HashMap::new(), &HashMap::new()).unwrap();
//! assert_eq!(result.uncertainty().to_string(), "sqrt(y^2*d(x)^2 + x^2*d(y)^2)");
//!
//! let values = HashMap::from([("x".to_string(), 2.0), ("y".to_string(), 3.0)]);
//! let result = propagate_uncertainty(&expr, &values, &HashMap::new()).unwrap();
//! assert_eq!(result.to_string(), "6.00+-sqrt(9*d(x)^2 + 4*d(y)^2)");
//! ```

mod batch;
mod bindings;
mod config;

pub use bindings::Bindings;
pub use config::{PropagationConfig, UnboundUncertainty};

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{ErrpropError, Result};
use crate::expression::{add, apply, mul, pow, Expression, UNCERTAINTY_PREFIX};
use crate::uncertain::UncertainValue;

/// Flat auxiliary name of the uncertainty of `variable` (`x` -> `dx`)
pub fn auxiliary_name(variable: &str) -> String {
    format!("{}{}", UNCERTAINTY_PREFIX, variable)
}

/// Propagation engine.
///
/// Stateless apart from its configuration; a single instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    config: PropagationConfig,
}

impl Propagator {
    /// Create a propagator with the given configuration
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Fail if the auxiliary name of any variable is itself one of the variables
    pub fn check_names(&self, variables: &[String]) -> Result<()> {
        for variable in variables {
            let auxiliary = auxiliary_name(variable);
            if variables.contains(&auxiliary) {
                return Err(ErrpropError::NameCollision {
                    variable: variable.clone(),
                    auxiliary,
                });
            }
        }
        Ok(())
    }

    /// Symbolic propagated uncertainty `sqrt(Σ (∂expr/∂v)² · d(v)²)`
    pub fn symbolic_uncertainty(&self, expr: &Expression) -> Result<Expression> {
        let variables = expr.variables();
        if self.config.check_name_collisions {
            self.check_names(&variables)?;
        }
        variance_terms(expr, &variables)
    }

    /// Propagate uncertainties through `expr`
    ///
    /// Returns the expression's value and its propagated uncertainty, each
    /// with every bound variable substituted and constants folded. Unbound
    /// variables remain symbolic, so the result may still be a formula.
    ///
    /// # Errors
    ///
    /// * `NameCollision` if variables `x` and `dx` both appear
    /// * `Expression(DivisionByZero | Domain)` if the formula is undefined at the supplied values
    pub fn propagate(
        &self,
        expr: &Expression,
        values: &HashMap<String, f64>,
        uncertainties: &HashMap<String, f64>,
    ) -> Result<UncertainValue<Expression>> {
        let variables = expr.variables();
        if self.config.check_name_collisions {
            self.check_names(&variables)?;
        }
        debug!(
            expression = %expr,
            variables = ?variables,
            "propagating uncertainty"
        );

        let sym_error = variance_terms(expr, &variables)?;
        let mut error = sym_error.substitute_uncertainties(uncertainties);
        if self
            .config
            .unbound_uncertainty
            .is_exact(uncertainties.len())
        {
            error = error.replace_leaves(&|leaf| match leaf {
                Expression::Uncertainty(name) if variables.binary_search(name).is_ok() => {
                    Some(Expression::Number(0.0))
                }
                _ => None,
            });
        }
        // Drop the terms of exact variables before their partials are evaluated
        let error = error.simplify()?;

        let uncertainty = error.substitute_values(values).simplify()?;
        let value = expr.substitute_values(values).simplify()?;
        trace!(%value, %uncertainty, "propagation finished");

        Ok(UncertainValue::new(value, uncertainty))
    }

    /// Propagate using a [`Bindings`] pair of mappings
    pub fn propagate_bindings(
        &self,
        expr: &Expression,
        bindings: &Bindings,
    ) -> Result<UncertainValue<Expression>> {
        self.propagate(expr, bindings.values(), bindings.uncertainties())
    }
}

/// Build the square root of the sum of squared derivative terms over `variables`
fn variance_terms(expr: &Expression, variables: &[String]) -> Result<Expression> {
    let mut sum = Expression::Number(0.0);
    for variable in variables {
        let partial = expr.derivative(variable)?;
        trace!(variable = %variable, partial = %partial, "partial derivative");
        let term = mul(
            pow(partial, Expression::Number(2.0)),
            pow(Expression::uncertainty(variable), Expression::Number(2.0)),
        );
        sum = add(sum, term);
    }
    Ok(apply("sqrt", sum))
}

/// Propagate uncertainties through `expr` with the default configuration
///
/// See [`Propagator::propagate`].
pub fn propagate_uncertainty(
    expr: &Expression,
    values: &HashMap<String, f64>,
    uncertainties: &HashMap<String, f64>,
) -> Result<UncertainValue<Expression>> {
    Propagator::default().propagate(expr, values, uncertainties)
}
