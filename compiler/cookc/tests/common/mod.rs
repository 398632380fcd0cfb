//! Fixture loading and execution shared by the integration tests.
//!
//! Fixtures live in `tests/fixtures/*.json` and are produced by
//! `tests/fixtures/generate.js`: each case carries the source text, the
//! ESTree an external parser produced for it, and the expected outcome.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use cook_eval::value::{from_json, to_json};
use cookc::{CookError, CookOptions, PrecookOptions, Rules};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub globals: serde_json::Map<String, serde_json::Value>,
    pub cases: Vec<Case>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Expression,
    Function,
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRules {
    #[serde(default)]
    pub no_var: bool,
    #[serde(default)]
    pub loose_globals: bool,
    #[serde(default)]
    pub annex_b: bool,
}

impl From<CaseRules> for Rules {
    fn from(rules: CaseRules) -> Self {
        Rules {
            no_var: rules.no_var,
            loose_global_assignment: rules.loose_globals,
            annex_b_block_functions: rules.annex_b,
        }
    }
}

/// Either the JSON form of the result or the class of the error.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Value(serde_json::Value),
    Error(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub name: String,
    pub mode: Mode,
    pub source: String,
    pub ast: serde_json::Value,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub rules: CaseRules,
    pub free_variables: Option<Vec<String>>,
    /// Whether `expected` was recorded from native evaluation.
    pub oracle: bool,
    pub expected: Outcome,
}

/// What running a case produced.
#[derive(Debug)]
pub struct Run {
    /// `None` when analysis itself failed.
    pub free_variables: Option<BTreeSet<String>>,
    pub outcome: Outcome,
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn load(file: &str) -> Fixture {
    let path = fixtures_dir().join(file);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

/// The case named `name` in `file`.
pub fn case(file: &str, name: &str) -> (Fixture, usize) {
    let fixture = load(file);
    let index = fixture
        .cases
        .iter()
        .position(|c| c.name == name)
        .unwrap_or_else(|| panic!("no case named {name:?} in {file}"));
    (fixture, index)
}

pub fn options_for(case: &Case, globals: &serde_json::Map<String, serde_json::Value>) -> CookOptions {
    globals.iter().fold(
        CookOptions::default().with_rules(case.rules.into()),
        |options, (name, value)| options.with_global(name, from_json(value)),
    )
}

fn error_outcome(err: &CookError) -> Outcome {
    match (err, err.error_class()) {
        (_, Some(class)) => Outcome::Error(class.to_string()),
        (CookError::Eval(_), None) => Outcome::Error("Uncaught".to_string()),
        (other, None) => panic!("fixture tree was not accepted: {other}"),
    }
}

/// Run `case` with freshly converted `globals`.
pub fn run(case: &Case, globals: &serde_json::Map<String, serde_json::Value>) -> Run {
    let tree = case.ast.to_string();
    let precook_options = PrecookOptions::default().with_rules(case.rules.into());
    let options = options_for(case, globals);

    let analysed = match case.mode {
        Mode::Expression => cookc::tree::read_expression(&tree)
            .and_then(|expression| cookc::precook(expression, &case.source, precook_options))
            .map(|precooked| {
                let names = precooked.free_variables.clone();
                (names, cookc::cook(&precooked, &options))
            }),
        Mode::Function => cookc::prefeast(&tree, &case.source, precook_options).map(|precooked| {
            let names = precooked.free_variables.clone();
            let args: Vec<_> = case.args.iter().map(from_json).collect();
            let result = cookc::feast(&precooked, &options)
                .and_then(|function| cookc::invoke(&function, &args));
            (names, result)
        }),
    };

    match analysed {
        Ok((names, result)) => Run {
            free_variables: Some(names),
            outcome: match result {
                Ok(value) => Outcome::Value(to_json(&value)),
                Err(err) => error_outcome(&err),
            },
        },
        Err(err) => Run {
            free_variables: None,
            outcome: error_outcome(&err),
        },
    }
}

/// Run the case named `name` in `file` and return its outcome.
pub fn outcome_of(file: &str, name: &str) -> Outcome {
    let (fixture, index) = case(file, name);
    run(&fixture.cases[index], &fixture.globals).outcome
}
