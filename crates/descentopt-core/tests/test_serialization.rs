//! Serialization of configurations and results.

#![cfg(feature = "serde")]

use descentopt_core::{
    differentiation::FiniteDifference,
    line_search::LineSearchParams,
    optimizer::{OptimizationResult, StoppingCriterion, TerminationReason},
};
use nalgebra::dvector;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_stopping_criterion_json() {
    let criterion = StoppingCriterion::new()
        .with_gradient_tolerance(1e-5)
        .with_step_tolerance(1e-7)
        .with_max_iterations(250);

    let json = serde_json::to_string(&criterion).unwrap();
    let decoded: StoppingCriterion = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, criterion);
}

#[test]
fn test_line_search_params_from_json() {
    let params: LineSearchParams =
        serde_json::from_str(r#"{"initial_step_size": 2.0, "rho": 0.25, "max_halvings": 12}"#)
            .unwrap();
    assert_eq!(
        params,
        LineSearchParams::default()
            .with_initial_step_size(2.0)
            .with_rho(0.25)
            .with_max_halvings(12)
    );
}

#[test]
fn test_finite_difference_json() {
    let fd = FiniteDifference::new(1e-6).unwrap();
    let decoded: FiniteDifference =
        serde_json::from_str(&serde_json::to_string(&fd).unwrap()).unwrap();
    assert_eq!(decoded.step(), 1e-6);
}

#[test]
fn test_result_json() {
    let result = OptimizationResult::new(
        dvector![1.0, 2.0],
        0.0,
        3,
        Duration::from_millis(5),
        TerminationReason::GradientTolerance,
    )
    .with_gradient_norm(Some(1e-5))
    .with_function_evaluations(42);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["iterations"], 3);
    assert_eq!(value["function_evaluations"], 42);
    assert_eq!(value["termination_reason"], "GradientTolerance");
    assert_eq!(value["converged"], true);

    let decoded: OptimizationResult = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.point, result.point);
    assert_eq!(decoded.termination_reason, result.termination_reason);
}
