//! # Arsenic Mass-Balance Models
//!
//! Solves the mass-balance fractions of two exposure models from a linear
//! regression of urinary arsenic on well-water arsenic, propagating the
//! coefficient standard errors and the uncertainties of the external
//! parameters into every derived quantity.
//!
//! External parameters, bound in a [`Bindings`]:
//!
//! | Name | Meaning |
//! |---|---|
//! | `ff` | fraction of arsenic intake from food |
//! | `fc` | fraction of arsenic intake from cooking water |
//! | `md` | fraction of dose methylated to DMA |
//! | `mb` | fraction of dose methylated to MMA |
//! | `Mf` | arsenic mass ingested with food per day |
//! | `Q` | daily water consumption |
//! | `avgAs` | mean well-water arsenic concentration |
//!
//! ## Models
//!
//! * [`WellModel::Distributed`] regresses on one well; coefficients
//!   `[intercept, slope]`. Derived: `fu, fp, fo, frac_primary_well,
//!   frac_other_well`.
//! * [`WellModel::Household`] separates the primary and the household well;
//!   coefficients `[intercept, slope_primary, slope_household]`. Derived:
//!   `fu, fp, fh, fo, frac_primary_well, frac_household_well, frac_other_well`.
//!
//! Later quantities are written in terms of earlier ones (`fo = 1 - fp - ff - fc`)
//! and composed symbolically before propagation, so the correlation through the
//! shared inputs is carried into the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrpropError, Result};
use crate::expression::Expression;
use crate::propagation::{Bindings, Propagator};
use crate::report::Table;
use crate::uncertain::UncertainValue;

/// Names of the external parameters both models read
pub const EXTERNAL_PARAMETERS: [&str; 7] = ["ff", "fc", "md", "mb", "Mf", "Q", "avgAs"];

const DISTRIBUTED_FORMULAS: [(&str, &str); 5] = [
    ("fp", "(slope*(1 - ff - fc)*avgAs + Mf/Q)/(slope*avgAs + intercept)"),
    ("fu", "(1 - md - mb)*(fp/slope)"),
    ("fo", "1 - fp - ff - fc"),
    ("frac_primary_well", "fp/(fp + fo)"),
    ("frac_other_well", "fo/(fp + fo)"),
];

const HOUSEHOLD_FORMULAS: [(&str, &str); 7] = [
    (
        "fu",
        "(1 - md - mb)*(1 - ff - fc + Mf/Q/avgAs)/(slope_primary + slope_household + intercept/avgAs)",
    ),
    (
        "fp",
        "slope_primary*(1 - ff - fc + Mf/Q/avgAs)/(slope_primary + slope_household + intercept/avgAs)",
    ),
    (
        "fo",
        "intercept*(1 - ff - fc + Mf/Q/avgAs)/(slope_primary*avgAs + slope_household*avgAs + intercept) - Mf/Q/avgAs",
    ),
    ("fh", "1 - fp - fo - ff - fc"),
    ("frac_primary_well", "fp/(fp + fo + fh)"),
    ("frac_other_well", "fo/(fp + fo + fh)"),
    ("frac_household_well", "fh/(fp + fo + fh)"),
];

/// Mass-balance model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellModel {
    /// Single well regressor
    Distributed,

    /// Primary well and household well regressors
    Household,
}

impl WellModel {
    /// Short name of the model, used in logs and output names
    pub fn name(self) -> &'static str {
        match self {
            WellModel::Distributed => "distributed",
            WellModel::Household => "household",
        }
    }

    /// Regression coefficient names, in the order the fit reports them
    pub fn coefficient_names(self) -> &'static [&'static str] {
        match self {
            WellModel::Distributed => &["intercept", "slope"],
            WellModel::Household => &["intercept", "slope_primary", "slope_household"],
        }
    }

    /// Formulas in definition order; each may refer to the ones before it
    pub fn formulas(self) -> &'static [(&'static str, &'static str)] {
        match self {
            WellModel::Distributed => &DISTRIBUTED_FORMULAS,
            WellModel::Household => &HOUSEHOLD_FORMULAS,
        }
    }

    /// Derived quantity names in the order they are reported
    pub fn output_order(self) -> &'static [&'static str] {
        match self {
            WellModel::Distributed => {
                &["fu", "fp", "fo", "frac_primary_well", "frac_other_well"]
            }
            WellModel::Household => &[
                "fu",
                "fp",
                "fh",
                "fo",
                "frac_primary_well",
                "frac_household_well",
                "frac_other_well",
            ],
        }
    }

    /// Derived quantities as expressions over the coefficients and external
    /// parameters only, in report order
    pub fn derived_quantities(self) -> Result<Vec<(String, Expression)>> {
        let mut composed: HashMap<String, Expression> = HashMap::new();
        for (name, source) in self.formulas() {
            let expr = Expression::parse(source)?.substitute_expressions(&composed);
            composed.insert(name.to_string(), expr);
        }

        self.output_order()
            .iter()
            .map(|name| {
                composed
                    .remove(*name)
                    .map(|expr| (name.to_string(), expr))
                    .ok_or_else(|| ErrpropError::Other(format!("no formula for '{}'", name)))
            })
            .collect()
    }
}

/// Summary of a fitted linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Number of observations
    pub nobs: usize,

    /// Coefficient of determination
    pub rsquared: f64,

    /// Adjusted coefficient of determination
    pub rsquared_adj: f64,

    /// Coefficient estimates with their standard errors, intercept first
    pub coefficients: Vec<UncertainValue>,
}

impl RegressionSummary {
    /// Create a new regression summary
    pub fn new(
        nobs: usize,
        rsquared: f64,
        rsquared_adj: f64,
        coefficients: Vec<UncertainValue>,
    ) -> Self {
        Self {
            nobs,
            rsquared,
            rsquared_adj,
            coefficients,
        }
    }
}

/// Solve a mass-balance model
///
/// # Arguments
///
/// * `model` - The model variant
/// * `fit` - Regression summary whose coefficients match `model.coefficient_names()`
/// * `params` - External parameters; missing uncertainties are treated as exact
///
/// # Returns
///
/// * A table with `nobs, r2, r2_adj`, the coefficients, the derived
///   quantities and finally every input binding
///
/// # Errors
///
/// * `InvalidInput` if the number of coefficients does not match the model
/// * `Unresolved` if a parameter the formulas need is not bound
/// * Expression errors if a formula is undefined at the supplied values
pub fn solve(model: WellModel, fit: &RegressionSummary, params: &Bindings) -> Result<Table> {
    let names = model.coefficient_names();
    if fit.coefficients.len() != names.len() {
        return Err(ErrpropError::InvalidInput(format!(
            "{} model expects {} coefficients, got {}",
            model.name(),
            names.len(),
            fit.coefficients.len()
        )));
    }
    debug!(model = model.name(), nobs = fit.nobs, "solving mass balance");

    let mut bindings = params.clone();
    for (name, coefficient) in names.iter().zip(&fit.coefficients) {
        bindings.insert(*name, *coefficient);
    }

    let quantities = model.derived_quantities()?;
    let results = Propagator::default().propagate_many(&quantities, &bindings)?;

    let mut table = Table::new();
    table.insert("nobs", fit.nobs as f64);
    table.insert("r2", fit.rsquared);
    table.insert("r2_adj", fit.rsquared_adj);
    for (name, coefficient) in names.iter().zip(&fit.coefficients) {
        table.insert(*name, *coefficient);
    }
    for (name, result) in results {
        let numeric = result.to_numeric()?;
        debug!(quantity = %name, result = %numeric, "derived quantity");
        table.insert(name, numeric);
    }
    for (name, uval) in bindings.iter() {
        table.insert(name, uval);
    }

    Ok(table)
}
