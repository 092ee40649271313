//! Constant folding and algebraic identities
//!
//! The constructors in this module build expression nodes while applying the
//! identities that keep derivatives readable (`0 + x`, `1*x`, `0*x`, `x^1`,
//! `x^0`) and folding constant sub-expressions whose value is well defined.
//! They never fail: an undefined constant such as `1/0` is left unfolded and
//! reported later by [`Expression::simplify`].

use super::{
    apply_binary, apply_function, apply_unary, BinaryOp, ExprResult, Expression, ExpressionError,
    UnaryOp,
};

fn node(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    Expression::Binary(op, Box::new(lhs), Box::new(rhs))
}

fn is_constant(expr: &Expression, value: f64) -> bool {
    expr.as_number() == Some(value)
}

pub(crate) fn add(lhs: Expression, rhs: Expression) -> Expression {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Expression::Number(a + b),
        (Some(a), _) if a == 0.0 => rhs,
        (_, Some(b)) if b == 0.0 => lhs,
        _ => node(BinaryOp::Add, lhs, rhs),
    }
}

pub(crate) fn sub(lhs: Expression, rhs: Expression) -> Expression {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Expression::Number(a - b),
        (_, Some(b)) if b == 0.0 => lhs,
        (Some(a), _) if a == 0.0 => neg(rhs),
        _ => node(BinaryOp::Sub, lhs, rhs),
    }
}

pub(crate) fn mul(lhs: Expression, rhs: Expression) -> Expression {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Expression::Number(a * b),
        (Some(a), _) | (_, Some(a)) if a == 0.0 => Expression::Number(0.0),
        (Some(a), _) if a == 1.0 => rhs,
        (_, Some(b)) if b == 1.0 => lhs,
        (Some(a), _) if a == -1.0 => neg(rhs),
        (_, Some(b)) if b == -1.0 => neg(lhs),
        // Keep numeric coefficients on the left: 2*x rather than x*2
        (None, Some(_)) => mul(rhs, lhs),
        (Some(a), None) => match rhs {
            Expression::Binary(BinaryOp::Mul, inner_lhs, inner_rhs)
                if inner_lhs.as_number().is_some() =>
            {
                let b = inner_lhs.as_number().unwrap_or(1.0);
                mul(Expression::Number(a * b), *inner_rhs)
            }
            rhs => node(BinaryOp::Mul, Expression::Number(a), rhs),
        },
        (None, None) => node(BinaryOp::Mul, lhs, rhs),
    }
}

pub(crate) fn div(lhs: Expression, rhs: Expression) -> Expression {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) if b != 0.0 => Expression::Number(a / b),
        (_, Some(b)) if b == 1.0 => lhs,
        (Some(a), None) if a == 0.0 => Expression::Number(0.0),
        _ => node(BinaryOp::Div, lhs, rhs),
    }
}

pub(crate) fn pow(base: Expression, exponent: Expression) -> Expression {
    match (base.as_number(), exponent.as_number()) {
        (_, Some(e)) if e == 0.0 => Expression::Number(1.0),
        (_, Some(e)) if e == 1.0 => base,
        (Some(b), _) if b == 1.0 => Expression::Number(1.0),
        (Some(b), Some(e)) => match apply_binary(BinaryOp::Pow, b, e) {
            Ok(value) if value.is_finite() => Expression::Number(value),
            _ => node(BinaryOp::Pow, base, exponent),
        },
        _ => node(BinaryOp::Pow, base, exponent),
    }
}

pub(crate) fn neg(expr: Expression) -> Expression {
    match expr {
        Expression::Number(n) if n == 0.0 => Expression::Number(0.0),
        Expression::Number(n) => Expression::Number(-n),
        Expression::Unary(UnaryOp::Neg, inner) => *inner,
        expr => Expression::Unary(UnaryOp::Neg, Box::new(expr)),
    }
}

/// Apply a single-argument function, folding it when the argument is a
/// number and the result is finite
pub(crate) fn apply(function: &str, arg: Expression) -> Expression {
    if let Some(value) = arg.as_number() {
        if let Ok(result) = apply_function(function, &[value]) {
            if result.is_finite() {
                return Expression::Number(result);
            }
        }
    }
    Expression::Function(function.to_string(), vec![arg])
}

pub(crate) fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    match op {
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub => sub(lhs, rhs),
        BinaryOp::Mul => mul(lhs, rhs),
        BinaryOp::Div => div(lhs, rhs),
        BinaryOp::Pow => pow(lhs, rhs),
    }
}

impl Expression {
    /// Fold every constant sub-expression and apply the basic identities
    ///
    /// Fails when a constant sub-expression has no real value: division by
    /// zero, the square root or logarithm of a negative number, and so on.
    /// Sub-expressions that still contain symbols are kept.
    pub fn simplify(&self) -> ExprResult<Expression> {
        match self {
            Self::Number(_) | Self::Variable(_) | Self::Uncertainty(_) => Ok(self.clone()),

            Self::Unary(op, inner) => {
                let inner = inner.simplify()?;
                match inner.as_number() {
                    Some(value) => Ok(Self::Number(apply_unary(*op, value))),
                    None => Ok(neg(inner)),
                }
            }

            Self::Binary(op, left, right) => {
                let lhs = left.simplify()?;
                let rhs = right.simplify()?;
                if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
                    return apply_binary(*op, a, b).map(Self::Number);
                }
                if *op == BinaryOp::Div && is_constant(&rhs, 0.0) {
                    return Err(ExpressionError::DivisionByZero);
                }
                Ok(binary(*op, lhs, rhs))
            }

            Self::Function(name, args) => {
                let args = args
                    .iter()
                    .map(Expression::simplify)
                    .collect::<ExprResult<Vec<_>>>()?;
                let values: Option<Vec<f64>> = args.iter().map(Expression::as_number).collect();
                match values {
                    Some(values) => apply_function(name, &values).map(Self::Number),
                    None => Ok(Self::Function(name.clone(), args)),
                }
            }
        }
    }
}
