//! Tests for the goal evaluator and the point estimator

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use crate::error::EvaluateError;
use crate::model::{Distribution, Model, Results, Variable};
use crate::simulation::Engine;

fn uniform_model(formula: &str) -> Model {
    let x = Variable::new("x", Distribution::Uniform { min: 0.0, max: 10.0 }).unwrap();
    Model::new(formula, [x]).unwrap()
}

fn run(model: &Model, trials: usize, seed: u64) -> Results {
    Engine::new().with_seed(seed).run(model, trials).unwrap()
}

#[test]
fn test_goal_boundaries() {
    let results = run(&uniform_model("x * 100"), 1000, 1);
    let stats = *results.statistics();

    let below = results.goal_probability(stats.min - 1.0);
    assert_abs_diff_eq!(below.percentile, 0.0);
    assert_abs_diff_eq!(below.probability, 100.0);

    let above = results.goal_probability(stats.max + 1.0);
    assert_abs_diff_eq!(above.percentile, 100.0);
    assert_abs_diff_eq!(above.probability, 0.0);
}

#[test]
fn test_goal_at_median_of_odd_run() {
    let results = run(&uniform_model("x * 100"), 1001, 2);
    let median = results.statistics().median;
    assert!(results.outcomes().contains(&median));

    let goal = results.goal_probability(median);
    assert_abs_diff_eq!(goal.percentile, 50.0, epsilon = 0.1);
    assert_abs_diff_eq!(goal.probability, 50.0, epsilon = 0.1);
}

#[test]
fn test_goal_ties_count_half() {
    // Binomial(1, 0.5) yields only 0 and 1
    let coin = Variable::new("c", Distribution::Binomial { trials: 1, p: 0.5 }).unwrap();
    let model = Model::new("c", [coin]).unwrap();
    let results = run(&model, 4000, 3);
    let zeros = results.outcomes().iter().filter(|&&o| o == 0.0).count() as f64;

    let goal = results.goal_probability(0.0);
    assert_abs_diff_eq!(goal.percentile, 100.0 * 0.5 * zeros / 4000.0, epsilon = 1e-9);
}

#[test]
fn test_estimator_scenario() {
    let results = run(&uniform_model("x*100"), 1000, 4);
    let estimate = results.estimate(5.0).unwrap();
    assert_eq!(estimate.y, 500.0);

    let below = results.outcomes().iter().filter(|&&o| o < 500.0).count() as f64;
    let equal = results.outcomes().iter().filter(|&&o| o == 500.0).count() as f64;
    let expected = 100.0 * (below + 0.5 * equal) / 1000.0;
    assert_abs_diff_eq!(estimate.percentile, expected, epsilon = 1e-9);
    assert_abs_diff_eq!(estimate.percentile, 50.0, epsilon = 5.0);
}

#[test]
fn test_estimator_substitutes_first_declared_variable() {
    let price = Variable::new("price", Distribution::Normal { mean: 10.0, std: 1.0 }).unwrap();
    let units = Variable::new("units", Distribution::Poisson { rate: 5.0 }).unwrap();

    let model = Model::new("price * 3", [price.clone(), units.clone()]).unwrap();
    let results = run(&model, 200, 5);
    assert_eq!(results.estimate(2.0).unwrap().y, 6.0);

    // Reordering the declaration changes which name receives x
    let model = Model::new("price * 3", [units, price]).unwrap();
    let results = run(&model, 200, 5);
    match results.estimate(2.0).unwrap_err() {
        EvaluateError::UndefinedVariable(e) => assert_eq!(e.name, "price"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_estimator_fails_when_other_variables_are_needed() {
    let a = Variable::new("a", Distribution::Uniform { min: 1.0, max: 2.0 }).unwrap();
    let b = Variable::new("b", Distribution::Uniform { min: 1.0, max: 2.0 }).unwrap();
    let model = Model::new("a * b", [a, b]).unwrap();
    let results = run(&model, 100, 6);
    let err = results.estimate(1.5).unwrap_err();
    assert!(matches!(err, EvaluateError::UndefinedVariable(ref e) if e.name == "b"));
    assert!(err.to_string().contains("a * b"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_goal_probability_is_monotone(seed in any::<u64>(), a in -200.0..1200.0f64, b in -200.0..1200.0f64) {
        let results = run(&uniform_model("x * 100"), 257, seed);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p_lo = results.goal_probability(lo);
        let p_hi = results.goal_probability(hi);
        prop_assert!(p_lo.probability >= p_hi.probability);
        prop_assert!((0.0..=100.0).contains(&p_lo.percentile));
        prop_assert!((p_lo.percentile + p_lo.probability - 100.0).abs() < 1e-9);
    }

    #[test]
    fn prop_percentiles_are_ordered(seed in any::<u64>(), p in 0.0..100.0f64, q in 0.0..100.0f64) {
        let results = run(&uniform_model("sqrt(x) - x"), 101, seed);
        let (lo, hi) = if p <= q { (p, q) } else { (q, p) };
        prop_assert!(results.percentile(lo) <= results.percentile(hi));
        prop_assert!(results.percentile(lo) >= results.statistics().min);
        prop_assert!(results.percentile(hi) <= results.statistics().max);
    }

    #[test]
    fn prop_outcome_count_matches_trials(trials in 1usize..400, batch in 1usize..64) {
        let model = uniform_model("x");
        let results = Engine::new().with_seed(0).with_batch_size(batch).run(&model, trials).unwrap();
        prop_assert_eq!(results.len(), trials);
        prop_assert!(results.outcomes().iter().all(|o| (0.0..=10.0).contains(o)));
    }
}
