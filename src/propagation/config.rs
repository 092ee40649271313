//! Configuration options for uncertainty propagation.

/// How to treat a variable that has no entry in the uncertainty mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnboundUncertainty {
    /// Keep its uncertainty symbol `d(name)` in the result
    Symbolic,

    /// Treat the variable as an exact constant (zero uncertainty)
    Exact,

    /// `Symbolic` when no uncertainties are supplied at all, `Exact` otherwise
    #[default]
    Auto,
}

impl UnboundUncertainty {
    /// Whether unbound uncertainties become zero for the given number of supplied uncertainties
    pub fn is_exact(self, supplied: usize) -> bool {
        match self {
            UnboundUncertainty::Symbolic => false,
            UnboundUncertainty::Exact => true,
            UnboundUncertainty::Auto => supplied > 0,
        }
    }
}

/// Configuration options for the propagation engine.
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Fail when a variable is named like the flat auxiliary name of another
    /// variable's uncertainty (`x` and `dx`). Default: true
    pub check_name_collisions: bool,

    /// Treatment of variables without a supplied uncertainty. Default: Auto
    pub unbound_uncertainty: UnboundUncertainty,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            check_name_collisions: true,
            unbound_uncertainty: UnboundUncertainty::default(),
        }
    }
}
