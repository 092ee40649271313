//! Substitution of symbols by numbers or other expressions
//!
//! All substitutions are simultaneous: replacements are inserted as-is and
//! never rewritten again by the same pass.

use std::collections::HashMap;

use super::Expression;

impl Expression {
    /// Rebuild the expression, replacing every leaf for which `replace` returns `Some`
    pub fn replace_leaves<F>(&self, replace: &F) -> Expression
    where
        F: Fn(&Expression) -> Option<Expression>,
    {
        match self {
            Self::Number(_) | Self::Variable(_) | Self::Uncertainty(_) => {
                replace(self).unwrap_or_else(|| self.clone())
            }
            Self::Unary(op, inner) => Self::Unary(*op, Box::new(inner.replace_leaves(replace))),
            Self::Binary(op, left, right) => Self::Binary(
                *op,
                Box::new(left.replace_leaves(replace)),
                Box::new(right.replace_leaves(replace)),
            ),
            Self::Function(name, args) => Self::Function(
                name.clone(),
                args.iter().map(|arg| arg.replace_leaves(replace)).collect(),
            ),
        }
    }

    /// Replace every occurrence of the variable `name` with `replacement`
    pub fn substitute(&self, name: &str, replacement: &Expression) -> Expression {
        self.replace_leaves(&|leaf| match leaf {
            Self::Variable(var) if var == name => Some(replacement.clone()),
            _ => None,
        })
    }

    /// Replace variables with their numeric values; unbound variables are kept
    pub fn substitute_values(&self, values: &HashMap<String, f64>) -> Expression {
        self.replace_leaves(&|leaf| match leaf {
            Self::Variable(var) => values.get(var).map(|value| Self::Number(*value)),
            _ => None,
        })
    }

    /// Replace uncertainty symbols `d(name)` with numeric uncertainties
    pub fn substitute_uncertainties(&self, uncertainties: &HashMap<String, f64>) -> Expression {
        self.replace_leaves(&|leaf| match leaf {
            Self::Uncertainty(var) => uncertainties.get(var).map(|value| Self::Number(*value)),
            _ => None,
        })
    }

    /// Replace variables with whole expressions, e.g. to compose derived quantities
    pub fn substitute_expressions(&self, expressions: &HashMap<String, Expression>) -> Expression {
        self.replace_leaves(&|leaf| match leaf {
            Self::Variable(var) => expressions.get(var).cloned(),
            _ => None,
        })
    }
}
