//! Tests for Bindings

use errprop_rs::expression::Expression;
use errprop_rs::propagation::Bindings;
use errprop_rs::{propagate_uncertainty, ErrpropError, UncertainValue};

const PARAMETER_FILE: &str = r#"{
    "ff": {"value": 0.1, "uncertainty": 0.02},
    "fc": {"value": 0.05, "uncertainty": 0.01},
    "md": {"value": 0.6, "uncertainty": 0.05},
    "mb": {"value": 0.1, "uncertainty": 0.02},
    "Mf": 20.0,
    "Q": 2.5,
    "avgAs": {"value": 40.0, "uncertainty": 4.0}
}"#;

#[test]
fn test_parameter_file() {
    let bindings = Bindings::from_json(PARAMETER_FILE).unwrap();

    assert_eq!(bindings.len(), 7);
    assert_eq!(bindings.get("ff"), Some(UncertainValue::new(0.1, 0.02)));
    assert_eq!(bindings.get("Mf"), Some(UncertainValue::exact(20.0)));
    assert_eq!(bindings.uncertainties().len(), 5);
    assert_eq!(
        bindings.names(),
        vec!["Mf", "Q", "avgAs", "fc", "ff", "mb", "md"]
    );
}

#[test]
fn test_bindings_drive_propagation() {
    let bindings = Bindings::from_json(PARAMETER_FILE).unwrap();
    let expr = Expression::parse("Mf / Q / avgAs").unwrap();
    let result = propagate_uncertainty(&expr, bindings.values(), bindings.uncertainties())
        .unwrap()
        .to_numeric()
        .unwrap();

    // Only avgAs is uncertain: relative uncertainty carries over unchanged
    assert!((result.value() - 0.2).abs() < 1e-12);
    assert!((result.relative_uncertainty() - 0.1).abs() < 1e-12);
}

#[test]
fn test_serde_roundtrip() {
    let mut bindings = Bindings::from_uncertain_values([("x", UncertainValue::new(1.0, 0.5))]);
    bindings.insert_value("k", 2.0);

    let json = serde_json::to_string(&bindings).unwrap();
    let back: Bindings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bindings);
}

#[test]
fn test_malformed_parameter_file() {
    for json in [r#"["x", 1.0]"#, r#"{"x": {"value": 1.0}}"#, "not json"] {
        match Bindings::from_json(json) {
            Err(ErrpropError::JsonError(_)) => {}
            other => panic!("Expected JsonError for {}, got {:?}", json, other),
        }
    }
}
