//! Symbolic differentiation
//!
//! One structural rule per node kind. Uncertainty symbols `d(x)` are
//! constants with respect to every variable.

use super::simplify::{add, apply, div, mul, neg, pow, sub};
use super::{BinaryOp, ExprResult, Expression, ExpressionError, UnaryOp};

impl Expression {
    /// Partial derivative of the expression with respect to the variable `var`
    ///
    /// # Examples
    ///
    /// ```
    /// use errprop_rs::expression::Expression;
    ///
    /// let expr = Expression::parse("x * y").unwrap();
    /// assert_eq!(expr.derivative("x").unwrap().to_string(), "y");
    /// assert_eq!(expr.derivative("z").unwrap().to_string(), "0");
    /// ```
    pub fn derivative(&self, var: &str) -> ExprResult<Expression> {
        if !self.contains_variable(var) {
            return Ok(Expression::Number(0.0));
        }

        match self {
            Self::Number(_) | Self::Uncertainty(_) => Ok(Expression::Number(0.0)),

            Self::Variable(name) => Ok(Expression::Number(if name == var { 1.0 } else { 0.0 })),

            Self::Unary(UnaryOp::Neg, inner) => Ok(neg(inner.derivative(var)?)),

            Self::Binary(op, left, right) => {
                let u = left.as_ref().clone();
                let v = right.as_ref().clone();
                let du = left.derivative(var)?;
                let dv = right.derivative(var)?;

                let result = match op {
                    BinaryOp::Add => add(du, dv),
                    BinaryOp::Sub => sub(du, dv),
                    // (u*v)' = u'*v + u*v'
                    BinaryOp::Mul => add(mul(du, v), mul(u, dv)),
                    // (u/v)' = (u'*v - u*v') / v^2
                    BinaryOp::Div => div(
                        sub(mul(du, v.clone()), mul(u, dv)),
                        pow(v, Expression::Number(2.0)),
                    ),
                    BinaryOp::Pow => {
                        if !right.contains_variable(var) {
                            // (u^c)' = c*u^(c-1)*u'
                            let exponent = sub(v.clone(), Expression::Number(1.0));
                            mul(mul(v, pow(u, exponent)), du)
                        } else if !left.contains_variable(var) {
                            // (c^v)' = c^v*ln(c)*v'
                            mul(mul(self.clone(), apply("ln", u)), dv)
                        } else {
                            // (u^v)' = u^v*(v'*ln(u) + v*u'/u)
                            mul(
                                self.clone(),
                                add(mul(dv, apply("ln", u.clone())), div(mul(v, du), u)),
                            )
                        }
                    }
                };
                Ok(result)
            }

            Self::Function(name, args) => {
                let arg = match args.as_slice() {
                    [arg] => arg.clone(),
                    _ => {
                        return Err(ExpressionError::InvalidOperation {
                            message: format!(
                                "cannot differentiate {}() with {} arguments",
                                name,
                                args.len()
                            ),
                        })
                    }
                };
                let darg = arg.derivative(var)?;

                let outer = match name.as_str() {
                    "sqrt" => div(
                        Expression::Number(1.0),
                        mul(Expression::Number(2.0), apply("sqrt", arg)),
                    ),
                    "exp" => apply("exp", arg),
                    "log" | "ln" => div(Expression::Number(1.0), arg),
                    "log10" => div(
                        Expression::Number(1.0),
                        mul(Expression::Number(std::f64::consts::LN_10), arg),
                    ),
                    "sin" => apply("cos", arg),
                    "cos" => neg(apply("sin", arg)),
                    "tan" => div(
                        Expression::Number(1.0),
                        pow(apply("cos", arg), Expression::Number(2.0)),
                    ),
                    "abs" => div(arg.clone(), apply("abs", arg)),
                    "max" | "min" => {
                        return Err(ExpressionError::InvalidOperation {
                            message: format!("cannot differentiate {}()", name),
                        })
                    }
                    _ => {
                        return Err(ExpressionError::UndefinedFunction { name: name.clone() })
                    }
                };
                Ok(mul(outer, darg))
            }
        }
    }
}
