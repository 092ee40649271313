//! Tests for the propagation engine

use std::collections::HashMap;

use approx::assert_relative_eq;
use errprop_rs::expression::{Expression, ExpressionError};
use errprop_rs::propagation::{
    auxiliary_name, propagate_uncertainty, Bindings, PropagationConfig, Propagator,
    UnboundUncertainty,
};
use errprop_rs::{ErrpropError, UncertainValue};
use proptest::prelude::*;

use crate::test_helpers::{approx_eq, linear_uncertainty};

fn map(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

#[test]
fn test_symbolic_result_without_bindings() {
    let expr = Expression::parse("x * y").unwrap();
    let result = propagate_uncertainty(&expr, &HashMap::new(), &HashMap::new()).unwrap();

    assert_eq!(result.value().to_string(), "x*y");
    assert_eq!(result.uncertainty().to_string(), "sqrt(y^2*d(x)^2 + x^2*d(y)^2)");
    assert_eq!(result.uncertainty().uncertainty_symbols(), vec!["x", "y"]);
}

#[test]
fn test_values_without_uncertainties() {
    let expr = Expression::parse("x * y").unwrap();
    let result =
        propagate_uncertainty(&expr, &map(&[("x", 2.0), ("y", 3.0)]), &HashMap::new()).unwrap();

    assert_eq!(*result.value(), Expression::Number(6.0));
    assert_eq!(result.uncertainty().to_string(), "sqrt(9*d(x)^2 + 4*d(y)^2)");
    assert_eq!(result.to_string(), "6.00+-sqrt(9*d(x)^2 + 4*d(y)^2)");
}

#[test]
fn test_fully_bound_product() {
    let expr = Expression::parse("x * y").unwrap();
    let result = propagate_uncertainty(
        &expr,
        &map(&[("x", 20.0), ("y", 30.0)]),
        &map(&[("x", 2.0), ("y", 3.0)]),
    )
    .unwrap();

    assert!(result.is_numeric());
    let numeric = result.to_numeric().unwrap();
    assert_eq!(*numeric.value(), 600.0);
    assert_relative_eq!(*numeric.uncertainty(), 84.8528137423857, max_relative = 1e-12);
    assert_eq!(numeric.to_string(), "600.00+-84.85");
}

#[test]
fn test_name_collision_is_detected_first() {
    let expr = Expression::parse("x + dx").unwrap();
    let err = propagate_uncertainty(&expr, &map(&[("x", 1.0)]), &map(&[("x", 0.1)]))
        .unwrap_err();
    match &err {
        ErrpropError::NameCollision {
            variable,
            auxiliary,
        } => {
            assert_eq!(variable, "x");
            assert_eq!(auxiliary, &auxiliary_name("x"));
        }
        other => panic!("Expected NameCollision, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "cannot propagate uncertainty with both a variable named 'x' and a variable named 'dx'"
    );
}

#[test]
fn test_absent_uncertainty_is_zero() {
    let expr = Expression::parse("x + y").unwrap();
    let values = map(&[("x", 1.0), ("y", 2.0)]);

    let absent = propagate_uncertainty(&expr, &values, &map(&[("x", 1.0)])).unwrap();
    let zero = propagate_uncertainty(&expr, &values, &map(&[("x", 1.0), ("y", 0.0)])).unwrap();

    assert_eq!(absent, zero);
    assert_eq!(absent.to_numeric().unwrap(), UncertainValue::new(3.0, 1.0));
}

#[test]
fn test_exact_variable_with_singular_partial() {
    // d/dx sqrt(x) is undefined at x = 0, but x carries no uncertainty
    let expr = Expression::parse("sqrt(x) + y").unwrap();
    let values = map(&[("x", 0.0), ("y", 1.0)]);

    let absent = propagate_uncertainty(&expr, &values, &map(&[("y", 1.0)])).unwrap();
    let zero = propagate_uncertainty(&expr, &values, &map(&[("y", 1.0), ("x", 0.0)])).unwrap();

    assert_eq!(absent, zero);
    assert_eq!(absent.to_numeric().unwrap(), UncertainValue::new(1.0, 1.0));

    // With an uncertainty on x the partial is evaluated and fails
    let result = propagate_uncertainty(&expr, &values, &map(&[("y", 1.0), ("x", 0.1)]));
    assert!(matches!(
        result,
        Err(ErrpropError::Expression(ExpressionError::DivisionByZero))
    ));
}

#[test]
fn test_partial_values_keep_symbols() {
    let expr = Expression::parse("a * b + c").unwrap();
    let result = propagate_uncertainty(
        &expr,
        &map(&[("a", 2.0)]),
        &map(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]),
    )
    .unwrap();

    assert_eq!(result.value().to_string(), "2*b + c");
    assert_eq!(result.value().variables(), vec!["b", "c"]);
    assert_eq!(result.uncertainty().variables(), vec!["b"]);

    match result.to_numeric() {
        Err(ErrpropError::Unresolved { symbols }) => assert_eq!(symbols, vec!["b", "c"]),
        other => panic!("Expected Unresolved, got {:?}", other),
    }
}

#[test]
fn test_symbolic_policy() {
    let propagator = Propagator::new(PropagationConfig {
        unbound_uncertainty: UnboundUncertainty::Symbolic,
        ..PropagationConfig::default()
    });
    let expr = Expression::parse("2*x + 3*y").unwrap();
    let result = propagator
        .propagate(&expr, &map(&[("x", 1.0), ("y", 1.0)]), &map(&[("y", 0.5)]))
        .unwrap();
    assert_eq!(result.uncertainty().to_string(), "sqrt(4*d(x)^2 + 2.25)");
}

#[test]
fn test_matches_finite_difference_reference() {
    let expr = Expression::parse("(a*exp(-b) + sqrt(c)) / (1 + a*c)").unwrap();
    let x = [1.2, 0.4, 2.5];
    let u = [0.05, 0.02, 0.1];
    let bindings = Bindings::from_uncertain_values([
        ("a", UncertainValue::new(x[0], u[0])),
        ("b", UncertainValue::new(x[1], u[1])),
        ("c", UncertainValue::new(x[2], u[2])),
    ]);

    let result = Propagator::default()
        .propagate_bindings(&expr, &bindings)
        .unwrap()
        .to_numeric()
        .unwrap();

    let f = |p: &[f64]| (p[0] * (-p[1]).exp() + p[2].sqrt()) / (1.0 + p[0] * p[2]);
    assert_relative_eq!(*result.value(), f(&x), max_relative = 1e-12);
    assert!(approx_eq(
        *result.uncertainty(),
        linear_uncertainty(f, &x, &u),
        1e-8
    ));
}

#[test]
fn test_propagate_many_keeps_order() {
    let bindings = Bindings::from_uncertain_values([
        ("x", UncertainValue::new(20.0, 2.0)),
        ("y", UncertainValue::new(30.0, 3.0)),
    ]);
    let quantities: Vec<(String, Expression)> = [
        ("product", "x * y"),
        ("sum", "x + y"),
        ("ratio", "x / y"),
    ]
    .iter()
    .map(|(name, source)| (name.to_string(), Expression::parse(source).unwrap()))
    .collect();

    let results = Propagator::default()
        .propagate_many(&quantities, &bindings)
        .unwrap();
    let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["product", "sum", "ratio"]);

    let sum = results[1].1.to_numeric().unwrap();
    assert_relative_eq!(*sum.uncertainty(), 13f64.sqrt(), max_relative = 1e-12);
}

proptest! {
    #[test]
    fn prop_linear_combination(
        a in -10.0f64..10.0,
        b in -10.0f64..10.0,
        ux in 0.0f64..5.0,
        uy in 0.0f64..5.0,
    ) {
        let expr = Expression::parse(&format!("({})*x + ({})*y", a, b)).unwrap();
        let result = propagate_uncertainty(
            &expr,
            &map(&[("x", 1.0), ("y", 1.0)]),
            &map(&[("x", ux), ("y", uy)]),
        )
        .unwrap()
        .to_numeric()
        .unwrap();

        let expected = ((a * ux).powi(2) + (b * uy).powi(2)).sqrt();
        prop_assert!((result.uncertainty() - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
