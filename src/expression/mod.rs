//! # Symbolic Expressions
//!
//! This module provides the expression tree used by the propagation engine:
//! parsing from text, numeric evaluation, substitution, symbolic
//! differentiation and constant-folding simplification.
//!
//! Besides ordinary variables an expression can hold *uncertainty symbols*,
//! written `d(x)`, which stand for the standard uncertainty of the variable
//! `x`. They are a separate node kind, so `d(x)` can never be confused with a
//! variable that happens to be named `dx`.
//!
//! ## Example Usage
//!
//! ```rust
//! use errprop_rs::expression::Expression;
//!
//! let expr = Expression::parse("x^2 * y").unwrap();
//! let dx = expr.derivative("x").unwrap();
//! assert_eq!(dx.to_string(), "2*x*y");
//! ```

mod derivative;
mod parser;
mod simplify;
mod substitute;

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub(crate) use simplify::{add, apply, mul, pow};

/// Prefix of the flat auxiliary name given to the uncertainty of a variable,
/// and the function name used to render uncertainty symbols (`d(x)`).
pub const UNCERTAINTY_PREFIX: &str = "d";

/// Error that can occur during expression parsing or evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Undefined uncertainty: d({name})")]
    UndefinedUncertainty { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {message}")]
    Domain { message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },
}

/// Result type for expression evaluation
pub type ExprResult<T> = Result<T, ExpressionError>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Variable reference
    Variable(String),

    /// Standard uncertainty of the named variable, rendered as `d(name)`
    Uncertainty(String),

    /// Unary operations
    Unary(UnaryOp, Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    /// Addition (+)
    Add,

    /// Subtraction (-)
    Sub,

    /// Multiplication (*)
    Mul,

    /// Division (/)
    Div,

    /// Power (^ or **)
    Pow,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => " + ",
            BinaryOp::Sub => " - ",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Context for expression evaluation, providing variable values
pub trait EvaluationContext {
    /// Get the value of a variable
    fn get_variable(&self, name: &str) -> ExprResult<f64>;

    /// Get the uncertainty of a variable, used for `d(name)` nodes
    fn get_uncertainty(&self, name: &str) -> ExprResult<f64> {
        Err(ExpressionError::UndefinedUncertainty {
            name: name.to_string(),
        })
    }
}

/// Simple implementation of EvaluationContext using HashMaps
#[derive(Debug, Clone, Default)]
pub struct SimpleContext {
    /// Map of variable names to values
    variables: HashMap<String, f64>,

    /// Map of variable names to uncertainties
    uncertainties: HashMap<String, f64>,
}

impl SimpleContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    /// Set the uncertainty of a variable
    pub fn set_uncertainty(&mut self, name: &str, uncertainty: f64) {
        self.uncertainties.insert(name.to_string(), uncertainty);
    }
}

impl EvaluationContext for SimpleContext {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn get_uncertainty(&self, name: &str) -> ExprResult<f64> {
        self.uncertainties
            .get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedUncertainty {
                name: name.to_string(),
            })
    }
}

impl EvaluationContext for HashMap<String, f64> {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }
}

impl Expression {
    /// Constant number
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Variable reference
    pub fn var(name: &str) -> Self {
        Self::Variable(name.to_string())
    }

    /// Uncertainty symbol `d(name)`
    pub fn uncertainty(name: &str) -> Self {
        Self::Uncertainty(name.to_string())
    }

    /// Raise this expression to a power
    pub fn pow(self, exponent: Expression) -> Self {
        Self::Binary(BinaryOp::Pow, Box::new(self), Box::new(exponent))
    }

    /// Square root of this expression
    pub fn sqrt(self) -> Self {
        Self::Function("sqrt".to_string(), vec![self])
    }

    /// Apply a named function to this expression
    pub fn apply(self, function: &str) -> Self {
        Self::Function(function.to_string(), vec![self])
    }

    /// Parse an expression from a string
    ///
    /// Supports `+ - * /`, `^` and `**` for powers, unary minus, parentheses,
    /// function calls such as `sqrt(x)`, and uncertainty symbols `d(x)`.
    pub fn parse(input: &str) -> ExprResult<Self> {
        parser::parse_expression(input)
    }

    /// Evaluate the expression with the given context
    pub fn evaluate<C: EvaluationContext>(&self, context: &C) -> ExprResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Variable(name) => context.get_variable(name),

            Self::Uncertainty(name) => context.get_uncertainty(name),

            Self::Unary(op, expr) => Ok(apply_unary(*op, expr.evaluate(context)?)),

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;
                apply_binary(*op, lhs, rhs)
            }

            Self::Function(name, args) => {
                let evaluated_args = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<ExprResult<Vec<f64>>>()?;
                apply_function(name, &evaluated_args)
            }
        }
    }

    /// Find all variable names used in the expression
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_names(&mut vars, false);
        vars.sort();
        vars.dedup();
        vars
    }

    /// Names of the variables whose uncertainty symbol `d(name)` appears in the expression
    pub fn uncertainty_symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names, true);
        names.sort();
        names.dedup();
        names
    }

    fn collect_names(&self, names: &mut Vec<String>, uncertainties: bool) {
        match self {
            Self::Number(_) => {}

            Self::Variable(name) => {
                if !uncertainties {
                    names.push(name.clone());
                }
            }

            Self::Uncertainty(name) => {
                if uncertainties {
                    names.push(name.clone());
                }
            }

            Self::Unary(_, expr) => expr.collect_names(names, uncertainties),

            Self::Binary(_, left, right) => {
                left.collect_names(names, uncertainties);
                right.collect_names(names, uncertainties);
            }

            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_names(names, uncertainties);
                }
            }
        }
    }

    /// Whether the variable `name` occurs in the expression
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Self::Number(_) | Self::Uncertainty(_) => false,
            Self::Variable(var) => var == name,
            Self::Unary(_, expr) => expr.contains_variable(name),
            Self::Binary(_, left, right) => {
                left.contains_variable(name) || right.contains_variable(name)
            }
            Self::Function(_, args) => args.iter().any(|arg| arg.contains_variable(name)),
        }
    }

    /// The constant value, if this node is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the expression is fully resolved to a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Number(n) if n.is_sign_negative() && *n != 0.0 => 3,
            Self::Number(_) | Self::Variable(_) | Self::Uncertainty(_) | Self::Function(..) => 5,
            Self::Unary(..) => 3,
            Self::Binary(op, ..) => op.precedence(),
        }
    }
}

pub(crate) fn apply_unary(op: UnaryOp, value: f64) -> f64 {
    match op {
        UnaryOp::Neg => -value,
    }
}

pub(crate) fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> ExprResult<f64> {
    match op {
        BinaryOp::Add => Ok(lhs + rhs),
        BinaryOp::Sub => Ok(lhs - rhs),
        BinaryOp::Mul => Ok(lhs * rhs),
        BinaryOp::Div => {
            if rhs == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
        BinaryOp::Pow => {
            if lhs == 0.0 && rhs < 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            let result = lhs.powf(rhs);
            if result.is_nan() && !lhs.is_nan() && !rhs.is_nan() {
                Err(ExpressionError::Domain {
                    message: format!("{}^{} is not a real number", lhs, rhs),
                })
            } else {
                Ok(result)
            }
        }
    }
}

fn single_argument(name: &str, args: &[f64]) -> ExprResult<f64> {
    match args {
        [value] => Ok(*value),
        _ => Err(ExpressionError::InvalidOperation {
            message: format!("{}() requires 1 argument, got {}", name, args.len()),
        }),
    }
}

fn positive_argument(name: &str, args: &[f64]) -> ExprResult<f64> {
    let value = single_argument(name, args)?;
    if value <= 0.0 {
        return Err(ExpressionError::Domain {
            message: format!("{}() of non-positive value {}", name, value),
        });
    }
    Ok(value)
}

pub(crate) fn apply_function(name: &str, args: &[f64]) -> ExprResult<f64> {
    match name {
        "sin" => Ok(single_argument(name, args)?.sin()),
        "cos" => Ok(single_argument(name, args)?.cos()),
        "tan" => Ok(single_argument(name, args)?.tan()),
        "exp" => Ok(single_argument(name, args)?.exp()),
        "abs" => Ok(single_argument(name, args)?.abs()),
        "log" | "ln" => Ok(positive_argument(name, args)?.ln()),
        "log10" => Ok(positive_argument(name, args)?.log10()),
        "sqrt" => {
            let value = single_argument(name, args)?;
            if value < 0.0 {
                return Err(ExpressionError::Domain {
                    message: format!("sqrt() of negative value {}", value),
                });
            }
            Ok(value.sqrt())
        }
        "max" | "min" => {
            if args.len() < 2 {
                return Err(ExpressionError::InvalidOperation {
                    message: format!(
                        "{}() requires at least 2 arguments, got {}",
                        name,
                        args.len()
                    ),
                });
            }
            if name == "max" {
                Ok(args.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
            } else {
                Ok(args.iter().fold(f64::INFINITY, |a, &b| a.min(b)))
            }
        }
        _ => Err(ExpressionError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Variable(name) => write!(f, "{}", name),
            Self::Uncertainty(name) => write!(f, "{}({})", UNCERTAINTY_PREFIX, name),
            Self::Unary(UnaryOp::Neg, expr) => {
                f.write_str("-")?;
                write_operand(f, expr, expr.precedence() <= 3)
            }
            Self::Binary(op, left, right) => {
                let prec = op.precedence();
                let (left_parens, right_parens) = match op {
                    BinaryOp::Pow => (left.precedence() <= prec, right.precedence() < prec),
                    BinaryOp::Sub | BinaryOp::Div => {
                        (left.precedence() < prec, right.precedence() <= prec)
                    }
                    BinaryOp::Add | BinaryOp::Mul => {
                        (left.precedence() < prec, right.precedence() < prec)
                    }
                };
                write_operand(f, left, left_parens)?;
                f.write_str(op.symbol())?;
                write_operand(f, right, right_parens)
            }
            Self::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expression, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl std::ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::Unary(UnaryOp::Neg, Box::new(self))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::Binary($op, Box::new(self), Box::new(rhs))
            }
        }

        impl std::ops::$trait<f64> for Expression {
            type Output = Expression;

            fn $method(self, rhs: f64) -> Expression {
                Expression::Binary($op, Box::new(self), Box::new(Expression::Number(rhs)))
            }
        }

        impl std::ops::$trait<Expression> for f64 {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::Binary($op, Box::new(Expression::Number(self)), Box::new(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);
