//! Tests for expression parsing, evaluation and display

use errprop_rs::expression::{EvaluationContext, Expression, ExpressionError, SimpleContext};
use std::collections::HashMap;

#[test]
fn test_expression_parsing() {
    let expr = Expression::parse("42").unwrap();
    assert!(expr.variables().is_empty());
    assert_eq!(expr.as_number(), Some(42.0));

    let expr = Expression::parse("(x + y) * (z - 1) / w").unwrap();
    assert_eq!(expr.variables(), vec!["w", "x", "y", "z"]);

    let expr = Expression::parse("  (  x  +  y  )  *  z  ").unwrap();
    assert_eq!(expr.to_string(), "(x + y)*z");

    let expr = Expression::parse("1.5e-3 * avgAs").unwrap();
    assert_eq!(expr.variables(), vec!["avgAs"]);

    let expr = Expression::parse("slope_primary + slope_household").unwrap();
    assert_eq!(expr.variables(), vec!["slope_household", "slope_primary"]);
}

#[test]
fn test_parse_errors() {
    for source in ["", "x +", "(x + y", "x y", "2 * * 3", "d()"] {
        match Expression::parse(source) {
            Err(ExpressionError::ParseError { .. }) => {}
            other => panic!("Expected ParseError for '{}', got {:?}", source, other),
        }
    }
}

#[test]
fn test_operator_precedence() {
    let context = HashMap::from([("x".to_string(), 3.0)]);
    let eval = |source: &str| Expression::parse(source).unwrap().evaluate(&context).unwrap();

    assert_eq!(eval("1 + 2 * 3"), 7.0);
    assert_eq!(eval("10 - 4 - 3"), 3.0);
    assert_eq!(eval("8 / 4 / 2"), 1.0);
    assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
    assert_eq!(eval("-x^2"), -9.0);
    assert_eq!(eval("(-x)^2"), 9.0);
    assert_eq!(eval("2 * -x"), -6.0);
}

#[test]
fn test_uncertainty_symbols_are_not_variables() {
    let expr = Expression::parse("d(x) + dx").unwrap();
    assert_eq!(expr.variables(), vec!["dx"]);
    assert_eq!(expr.uncertainty_symbols(), vec!["x"]);
    assert_eq!(expr.to_string(), "d(x) + dx");
}

#[test]
fn test_custom_context() {
    struct Fixed;

    impl EvaluationContext for Fixed {
        fn get_variable(&self, name: &str) -> Result<f64, ExpressionError> {
            match name {
                "x" => Ok(2.0),
                _ => Err(ExpressionError::UndefinedVariable {
                    name: name.to_string(),
                }),
            }
        }
    }

    let expr = Expression::parse("x^2 + 1").unwrap();
    assert_eq!(expr.evaluate(&Fixed).unwrap(), 5.0);

    match Expression::parse("d(x)").unwrap().evaluate(&Fixed) {
        Err(ExpressionError::UndefinedUncertainty { name }) => assert_eq!(name, "x"),
        other => panic!("Expected UndefinedUncertainty error, got {:?}", other),
    }
}

#[test]
fn test_builders_and_operators() {
    let x = Expression::var("x");
    let y = Expression::var("y");
    let expr = (x.clone() * 2.0 + 1.0 / y).sqrt();
    assert_eq!(expr.to_string(), "sqrt(x*2 + 1/y)");

    let mut context = SimpleContext::new();
    context.set_variable("x", 4.0);
    context.set_variable("y", 1.0);
    assert_eq!(expr.evaluate(&context).unwrap(), 3.0);

    let expr = (-x).apply("exp");
    assert_eq!(expr.to_string(), "exp(-x)");
}

#[test]
fn test_substitution() {
    let expr = Expression::parse("fp / (fp + fo)").unwrap();
    let fo = Expression::parse("1 - fp - ff").unwrap();
    let composed = expr.substitute("fo", &fo);
    assert_eq!(composed.variables(), vec!["ff", "fp"]);

    let values = HashMap::from([("fp".to_string(), 0.6), ("ff".to_string(), 0.1)]);
    let value = composed.substitute_values(&values).simplify().unwrap();
    assert!((value.as_number().unwrap() - 0.6 / 0.9).abs() < 1e-12);
}
