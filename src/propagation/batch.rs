//! Propagation of several named quantities against one set of bindings.
//!
//! With the `parallel` feature the quantities are propagated on the rayon
//! thread pool. Results keep the input order either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::{Bindings, Propagator};
use crate::error::Result;
use crate::expression::Expression;
use crate::uncertain::UncertainValue;

/// A named quantity together with its propagated result
pub type NamedResult = (String, UncertainValue<Expression>);

impl Propagator {
    /// Propagate every `(name, expression)` pair against the same bindings
    ///
    /// # Arguments
    ///
    /// * `quantities` - Named expressions to propagate
    /// * `bindings` - Values and uncertainties shared by all quantities
    ///
    /// # Returns
    ///
    /// * The results in the order of `quantities`, or the first error encountered
    pub fn propagate_many(
        &self,
        quantities: &[(String, Expression)],
        bindings: &Bindings,
    ) -> Result<Vec<NamedResult>> {
        debug!(count = quantities.len(), "propagating quantities");

        let propagate_one = |(name, expr): &(String, Expression)| {
            self.propagate_bindings(expr, bindings)
                .map(|result| (name.clone(), result))
        };

        #[cfg(feature = "parallel")]
        let results = quantities.par_iter().map(propagate_one).collect();

        #[cfg(not(feature = "parallel"))]
        let results = quantities.iter().map(propagate_one).collect();

        results
    }
}
