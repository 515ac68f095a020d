//! Tests for engine runs

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::{ArithmeticError, InvalidTrialCountError, RunError};
use crate::model::{Distribution, Model, Variable};
use crate::simulation::{Engine, simulate};

fn variable(name: &str, distribution: Distribution) -> Variable {
    Variable::new(name, distribution).unwrap()
}

/// Constant-like input: every outcome is exact
#[test]
fn test_deterministic_formula() {
    let x = variable("x", Distribution::Normal { mean: 5.0, std: 0.0 });
    let model = Model::new("x*2", [x]).unwrap();
    for n in [1, 2, 999, 10_001] {
        let results = simulate(&model, n).unwrap();
        assert_eq!(results.len(), n);
        assert!(results.outcomes().iter().all(|&o| o == 10.0));
        assert_eq!(results.statistics().std, 0.0);
        assert_eq!(results.statistics().median, 10.0);
    }
}

#[test]
fn test_zero_trials_rejected() {
    let x = variable("x", Distribution::Uniform { min: 0.0, max: 1.0 });
    let model = Model::new("x", [x]).unwrap();
    assert_eq!(
        simulate(&model, 0).unwrap_err(),
        RunError::InvalidTrialCount(InvalidTrialCountError { requested: 0 })
    );
}

#[test]
fn test_statistics_of_a_sum() {
    let model = Model::new(
        "a + b",
        [
            variable("a", Distribution::Normal { mean: 10.0, std: 3.0 }),
            variable("b", Distribution::Normal { mean: -4.0, std: 4.0 }),
        ],
    )
    .unwrap();
    let results = Engine::new().with_seed(17).run(&model, 50_000).unwrap();
    let stats = results.statistics();
    assert_abs_diff_eq!(stats.mean, 6.0, epsilon = 0.1);
    assert_abs_diff_eq!(stats.std, 5.0, epsilon = 0.1);
    assert_abs_diff_eq!(stats.median, 6.0, epsilon = 0.1);
    let (lo, hi) = stats.interval_95();
    assert_abs_diff_eq!(lo, 6.0 - 1.96 * 5.0, epsilon = 0.3);
    assert_abs_diff_eq!(hi, 6.0 + 1.96 * 5.0, epsilon = 0.3);
    assert!(stats.min <= stats.p2_5 && stats.p2_5 <= stats.p25);
    assert!(stats.p25 <= stats.median && stats.median <= stats.p75);
    assert!(stats.p75 <= stats.p97_5 && stats.p97_5 <= stats.max);
}

#[test]
fn test_variables_are_independent_streams() {
    // Same distribution, different variables: the draws must differ
    let model = Model::new(
        "x - y",
        [
            variable("x", Distribution::Uniform { min: 0.0, max: 1.0 }),
            variable("y", Distribution::Uniform { min: 0.0, max: 1.0 }),
        ],
    )
    .unwrap();
    let results = Engine::new().with_seed(5).run(&model, 2000).unwrap();
    assert!(results.outcomes().iter().any(|&o| o != 0.0));
    assert_abs_diff_eq!(results.statistics().mean, 0.0, epsilon = 0.05);
}

#[test]
fn test_adding_a_variable_keeps_earlier_streams() {
    let x = variable("x", Distribution::Uniform { min: 0.0, max: 1.0 });
    let noise = variable("noise", Distribution::Normal { mean: 0.0, std: 1.0 });
    let alone = Model::new("x", [x.clone()]).unwrap();
    let with_noise = Model::new("x", [x, noise]).unwrap();

    let engine = Engine::new().with_seed(77);
    assert_eq!(
        engine.run(&alone, 300).unwrap().outcomes(),
        engine.run(&with_noise, 300).unwrap().outcomes()
    );
}

#[test]
fn test_run_with_caller_rng() {
    let model = Model::new(
        "k * 2",
        [variable("k", Distribution::Binomial { trials: 4, p: 0.5 })],
    )
    .unwrap();
    let engine = Engine::new().with_batch_size(3);
    let a = engine
        .run_with_rng(&model, 100, &mut SmallRng::seed_from_u64(1))
        .unwrap();
    let b = engine
        .run_with_rng(&model, 100, &mut SmallRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(a.outcomes(), b.outcomes());
    assert!(a.outcomes().iter().all(|o| o.fract() == 0.0 && (0.0..=8.0).contains(o)));
    assert_eq!(a.metrics().batches, 34);
    assert_eq!(a.metrics().evaluations, 100);
}

#[test]
fn test_domain_error_aborts_with_values() {
    let model = Model::new(
        "log(x)",
        [variable("x", Distribution::Uniform { min: -1.0, max: -0.5 })],
    )
    .unwrap();
    let err = Engine::new().with_seed(3).run(&model, 1000).unwrap_err();
    let RunError::Evaluation(err) = err else {
        panic!("expected an evaluation error, got {err:?}");
    };
    assert!(matches!(err.cause, ArithmeticError::Domain { operation: "log", .. }));
    assert_eq!(err.values.len(), 1);
    assert_eq!(err.values[0].0, "x");
    assert!(err.values[0].1 < 0.0);
    assert!(err.to_string().contains("log(x)"));
}

#[test]
fn test_overflow_aborts() {
    let model = Model::new(
        "exp(x)",
        [variable("x", Distribution::Uniform { min: 800.0, max: 900.0 })],
    )
    .unwrap();
    assert!(matches!(
        Engine::new().run(&model, 10),
        Err(RunError::Evaluation(ref e)) if e.cause == ArithmeticError::Overflow { operation: "exp" }
    ));
}
