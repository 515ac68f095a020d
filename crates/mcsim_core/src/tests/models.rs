//! Tests for model construction and formula validation

use std::collections::HashMap;

use crate::error::{FormulaError, ModelError};
use crate::evaluate::{Formula, WHITELIST};
use crate::model::{Distribution, Model, Variable};

fn var(name: &str) -> Variable {
    Variable::new(name, Distribution::Normal { mean: 1.0, std: 0.5 }).unwrap()
}

#[test]
fn test_declared_variables_accepted() {
    let model = Model::new("x + y", [var("x"), var("y")]).unwrap();
    assert_eq!(model.formula().referenced_variables(), vec!["x", "y"]);
}

#[test]
fn test_undeclared_variable_named() {
    let err = Model::new("x + y", [var("x")]).unwrap_err();
    assert_eq!(err.undefined_variable(), Some("y"));
    let msg = err.to_string();
    assert!(msg.contains("'y'"));
    assert!(msg.contains("x + y"));
}

#[test]
fn test_unused_variables_are_allowed() {
    let model = Model::new("2 * a", [var("a"), var("b")]).unwrap();
    assert_eq!(model.formula().referenced_variables(), vec!["a"]);
    assert_eq!(model.len(), 2);
}

#[test]
fn test_every_whitelisted_function_compiles() {
    let calls = [
        "sqrt(x)", "exp(x)", "log(x)", "sin(x)", "cos(x)", "tan(x)", "abs(x)", "min(x, 1)",
        "max(x, 1)", "pow(x, 2)",
    ];
    assert_eq!(calls.len(), WHITELIST.len());
    for call in calls {
        assert!(Model::new(call, [var("x")]).is_ok(), "{call}");
    }
}

#[test]
fn test_names_outside_the_whitelist_are_undefined() {
    for (formula, name) in [
        ("floor(x)", "floor"),
        ("x + pi", "pi"),
        ("__builtins__", "__builtins__"),
        ("Sqrt(x)", "Sqrt"),
    ] {
        let err = Model::new(formula, [var("x")]).unwrap_err();
        assert_eq!(err.undefined_variable(), Some(name), "{formula}");
    }
}

#[test]
fn test_syntax_errors_are_distinct_from_undefined_names() {
    for formula in ["x +", "(x", "x y", "sqrt", "x(1)", "pow(x)", "x # 2"] {
        let err = Model::new(formula, [var("x")]).unwrap_err();
        assert!(
            matches!(err, ModelError::Formula(FormulaError::Syntax(_))),
            "{formula}: {err}"
        );
    }
}

#[test]
fn test_very_long_formula_is_a_syntax_error() {
    let formula = vec!["x"; 10_000].join(" + ");
    match Model::new(&formula, [var("x")]).unwrap_err() {
        ModelError::Formula(FormulaError::Syntax(e)) => {
            assert!(e.message.contains("nested too deeply"))
        }
        other => panic!("unexpected error {other:?}"),
    }

    let model = Model::new(&vec!["x"; 400].join(" + "), [var("x")]).unwrap();
    let results = crate::simulation::Engine::new().with_seed(1).run(&model, 2).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_evaluate_with_mapping() {
    let model = Model::new("max(a, b) - min(a, b) + abs(-2) ^ 2", [var("a"), var("b")]).unwrap();
    let values = HashMap::from([("a", 3.0), ("b", 10.0)]);
    assert_eq!(model.evaluate(&values), Ok(11.0));
}

#[test]
fn test_arithmetic_is_double_precision() {
    let formula = Formula::compile("x / 3 * 3 - x", &["x"]).unwrap();
    let value = formula.evaluate_slots(&[0.1]).unwrap();
    assert!(value.abs() < 1e-15);

    let formula = Formula::compile("1e-3 * 2.5E2 + .5", &["x"]).unwrap();
    assert_eq!(formula.evaluate_slots(&[0.0]), Ok(0.75));
}

#[test]
fn test_display_lists_variables() {
    let model = Model::new("x * 2", [var("x")]).unwrap();
    assert_eq!(model.to_string(), "y = x * 2\n  x ~ normal(mean=1, std=0.5)\n");
}
