#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Golden tests over the generated fixtures.
//!
//! Cases marked `oracle` were run natively in strict mode when the
//! fixtures were generated; the sandbox must agree with that result or
//! error class. The remaining cases pin behavior where the sandbox is
//! stricter than native evaluation.

mod common;

use common::{load, run, Case, Fixture};

/// Run every case of `file`, collecting mismatches into one report.
fn run_fixture(file: &str) {
    let Fixture { globals, cases } = load(file);
    assert!(!cases.is_empty(), "{file} has no cases");

    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| check(case, &globals).err())
        .collect();

    assert!(
        failures.is_empty(),
        "{} of {} cases in {file} failed:\n\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n\n")
    );
}

fn check(case: &Case, globals: &serde_json::Map<String, serde_json::Value>) -> Result<(), String> {
    let result = run(case, globals);
    let origin = if case.oracle { "native" } else { "pinned" };
    if result.outcome != case.expected {
        return Err(format!(
            "{}\n  source:   {}\n  expected: {:?} ({origin})\n  got:      {:?}",
            case.name, case.source, case.expected, result.outcome
        ));
    }
    if let Some(expected) = &case.free_variables {
        let got: Option<Vec<&str>> = result
            .free_variables
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect());
        let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
        if got.as_ref() != Some(&expected) {
            return Err(format!(
                "{}\n  source: {}\n  free variables: expected {expected:?}, got {got:?}",
                case.name, case.source
            ));
        }
    }
    Ok(())
}

#[test]
fn golden_tests_expressions() {
    run_fixture("expressions.json");
}

#[test]
fn golden_tests_functions() {
    run_fixture("functions.json");
}

#[test]
fn golden_tests_rejections() {
    run_fixture("rejections.json");
}

#[test]
fn golden_tests_parse_under_every_mode() {
    // Every tree must at least be accepted by the reader for its mode.
    for file in ["expressions.json", "functions.json", "rejections.json"] {
        for case in load(file).cases {
            let tree = case.ast.to_string();
            let read = match case.mode {
                common::Mode::Expression => cookc::tree::read_expression(&tree).map(drop),
                common::Mode::Function => cookc::tree::read_function(&tree).map(drop),
            };
            assert!(read.is_ok(), "{file}: {}: {:?}", case.name, read.err());
        }
    }
}
