//! Linearized propagation compared with Monte Carlo sampling

use errprop_rs::mass_balance::WellModel;
use errprop_rs::monte_carlo::monte_carlo_propagate;
use errprop_rs::propagation::{Bindings, Propagator};
use errprop_rs::{Expression, UncertainValue};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bindings() -> Bindings {
    Bindings::from_uncertain_values([
        ("ff", UncertainValue::new(0.12, 0.01)),
        ("fc", UncertainValue::new(0.04, 0.005)),
        ("md", UncertainValue::new(0.65, 0.02)),
        ("mb", UncertainValue::new(0.12, 0.01)),
        ("Mf", UncertainValue::new(15.0, 0.5)),
        ("Q", UncertainValue::new(2.0, 0.05)),
        ("avgAs", UncertainValue::new(55.0, 1.0)),
        ("intercept", UncertainValue::new(6.0, 0.3)),
        ("slope", UncertainValue::new(0.55, 0.01)),
    ])
}

#[test]
fn test_small_uncertainties_agree() {
    let bindings = bindings();
    let quantities = WellModel::Distributed.derived_quantities().unwrap();
    let (name, fp) = &quantities[1];
    assert_eq!(name, "fp");

    let linear = Propagator::default()
        .propagate_bindings(fp, &bindings)
        .unwrap()
        .to_numeric()
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let sampled = monte_carlo_propagate(fp, &bindings, 20_000, &[0.68, 0.95], &mut rng).unwrap();

    let relative = |a: f64, b: f64| (a - b).abs() / b.abs();
    assert!(relative(sampled.mean, *linear.value()) < 0.01);
    assert!(relative(sampled.std, *linear.uncertainty()) < 0.05);
}

#[test]
fn test_non_linear_formula_diverges() {
    // 1/x with a 30% relative uncertainty: the first-order result
    // underestimates the sampled spread
    let expr = Expression::parse("1 / x").unwrap();
    let bindings = Bindings::from_uncertain_values([("x", UncertainValue::new(10.0, 3.0))]);

    let linear = Propagator::default()
        .propagate_bindings(&expr, &bindings)
        .unwrap()
        .to_numeric()
        .unwrap();
    assert!((linear.uncertainty() - 0.03).abs() < 1e-12);

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let sampled = monte_carlo_propagate(&expr, &bindings, 20_000, &[0.68], &mut rng).unwrap();
    assert!(sampled.median > 0.0);
    let (lower, upper) = sampled.interval(0.68).unwrap();
    assert!(upper - lower > 2.0 * linear.uncertainty());
}
