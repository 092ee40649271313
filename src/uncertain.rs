//! Values with uncertainties
//!
//! [`UncertainValue`] is an immutable `value ± uncertainty` pair. With the
//! default `f64` parameter it represents a measured or derived number, such
//! as a regression coefficient and its standard error. The propagation
//! engine returns `UncertainValue<Expression>`, whose halves may still be
//! symbolic when not every input was bound.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrpropError, Result};
use crate::expression::{Expression, UNCERTAINTY_PREFIX};

/// Separator between value and uncertainty in the display form
pub const SEPARATOR: &str = "+-";

/// A value with an associated uncertainty
///
/// Equality is exact on both fields. No validation is performed: a negative
/// uncertainty is stored and propagated verbatim.
///
/// # Examples
///
/// ```
/// use errprop_rs::UncertainValue;
///
/// let uval = UncertainValue::new(0.5, 0.1);
/// assert_eq!(uval.to_string(), "0.50+-0.10");
/// assert_eq!(uval, UncertainValue::new(0.5, 0.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertainValue<T = f64> {
    value: T,
    uncertainty: T,
}

impl<T> UncertainValue<T> {
    /// Create a new value with the given uncertainty
    pub fn new(value: T, uncertainty: T) -> Self {
        Self { value, uncertainty }
    }

    /// The nominal value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The standard uncertainty
    pub fn uncertainty(&self) -> &T {
        &self.uncertainty
    }

    /// Split into `(value, uncertainty)`
    pub fn into_parts(self) -> (T, T) {
        (self.value, self.uncertainty)
    }
}

impl UncertainValue<f64> {
    /// A value known exactly
    pub fn exact(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// Uncertainty relative to the magnitude of the value
    pub fn relative_uncertainty(&self) -> f64 {
        self.uncertainty / self.value.abs()
    }
}

impl UncertainValue<Expression> {
    /// Whether both halves are fully numeric
    pub fn is_numeric(&self) -> bool {
        self.value.is_numeric() && self.uncertainty.is_numeric()
    }

    /// Symbols that keep this result from being numeric: free variables of
    /// either half, and `d(name)` symbols of the uncertainty
    pub fn unresolved_symbols(&self) -> Vec<String> {
        let mut symbols = self.value.variables();
        symbols.extend(self.uncertainty.variables());
        symbols.sort();
        symbols.dedup();
        symbols.extend(
            self.uncertainty
                .uncertainty_symbols()
                .into_iter()
                .map(|name| format!("{}({})", UNCERTAINTY_PREFIX, name)),
        );
        symbols
    }

    /// Convert a fully resolved result into numbers
    pub fn to_numeric(&self) -> Result<UncertainValue<f64>> {
        match (self.value.as_number(), self.uncertainty.as_number()) {
            (Some(value), Some(uncertainty)) => Ok(UncertainValue::new(value, uncertainty)),
            _ => Err(ErrpropError::Unresolved {
                symbols: self.unresolved_symbols(),
            }),
        }
    }
}

impl From<UncertainValue<f64>> for UncertainValue<Expression> {
    fn from(uval: UncertainValue<f64>) -> Self {
        UncertainValue::new(Expression::Number(uval.value), Expression::Number(uval.uncertainty))
    }
}

impl fmt::Display for UncertainValue<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}{}{:.2}", self.value, SEPARATOR, self.uncertainty)
    }
}

fn write_half(f: &mut fmt::Formatter<'_>, expr: &Expression) -> fmt::Result {
    match expr.as_number() {
        Some(n) => write!(f, "{:.2}", n),
        None => write!(f, "{}", expr),
    }
}

impl fmt::Display for UncertainValue<Expression> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_half(f, &self.value)?;
        f.write_str(SEPARATOR)?;
        write_half(f, &self.uncertainty)
    }
}

impl FromStr for UncertainValue<f64> {
    type Err = ErrpropError;

    /// Parse the display form `value+-uncertainty`
    fn from_str(s: &str) -> Result<Self> {
        let (value, uncertainty) = s.split_once(SEPARATOR).ok_or_else(|| {
            ErrpropError::InvalidInput(format!(
                "expected '<value>{}<uncertainty>', got '{}'",
                SEPARATOR, s
            ))
        })?;
        let parse = |text: &str| {
            text.trim().parse::<f64>().map_err(|e| {
                ErrpropError::InvalidInput(format!("invalid number '{}': {}", text.trim(), e))
            })
        };
        Ok(Self::new(parse(value)?, parse(uncertainty)?))
    }
}
