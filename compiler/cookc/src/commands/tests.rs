#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

/// Write `contents` to a file unique to this test process.
fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cook-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_parse_flags() {
    let parsed = EvalArgs::parse(&argv(&[
        "tree.json",
        "--source",
        "src.js",
        "--globals",
        "{}",
        "--no-var",
        "--typescript",
    ]))
    .unwrap();
    assert_eq!(parsed.tree, "tree.json");
    assert_eq!(parsed.source.as_deref(), Some("src.js"));
    assert_eq!(parsed.globals.as_deref(), Some("{}"));
    assert!(parsed.rules.no_var);
    assert!(!parsed.rules.loose_global_assignment);
    assert!(parsed.typescript);
    assert!(!parsed.function);
}

#[test]
fn test_args_imply_function() {
    let parsed = EvalArgs::parse(&argv(&["--args", "[1]", "f.json"])).unwrap();
    assert!(parsed.function);
    assert_eq!(parsed.tree, "f.json");
}

#[test]
fn test_parse_errors() {
    let cases = [
        (argv(&[]), "missing syntax tree path"),
        (argv(&["a.json", "--source"]), "--source needs a value"),
        (argv(&["a.json", "--fast"]), "unknown option '--fast'"),
        (argv(&["a.json", "b.json"]), "unexpected argument 'b.json'"),
    ];
    for (args, message) in cases {
        let err = EvalArgs::parse(&args).unwrap_err();
        assert_eq!(err.to_string(), message);
    }
}

#[test]
fn test_evaluate_expression_file() {
    // DATA.a + 1
    let tree = json!({
        "type": "BinaryExpression", "operator": "+",
        "left": {
            "type": "MemberExpression", "computed": false,
            "object": {"type": "Identifier", "name": "DATA"},
            "property": {"type": "Identifier", "name": "a"}
        },
        "right": {"type": "Literal", "value": 1}
    });
    let path = scratch_file("expression.json", &tree.to_string());
    let globals = scratch_file("globals.json", r#"{"DATA": {"a": 41}}"#);
    let args = EvalArgs {
        tree: path.display().to_string(),
        globals: Some(format!("@{}", globals.display())),
        ..EvalArgs::default()
    };
    assert_eq!(evaluate(&args, "").unwrap(), json!(42));
    assert_eq!(free_variables(&args, "").unwrap(), ["DATA"]);
}

#[test]
fn test_evaluate_function_file() {
    // function twice(x) { return [x, x]; }
    let tree = json!({
        "type": "Program",
        "body": [{
            "type": "FunctionDeclaration",
            "id": {"type": "Identifier", "name": "twice"},
            "params": [{"type": "Identifier", "name": "x"}],
            "body": {"type": "BlockStatement", "body": [{
                "type": "ReturnStatement",
                "argument": {"type": "ArrayExpression", "elements": [
                    {"type": "Identifier", "name": "x"},
                    {"type": "Identifier", "name": "x"}
                ]}
            }]}
        }]
    });
    let path = scratch_file("function.json", &tree.to_string());
    let args = EvalArgs {
        tree: path.display().to_string(),
        args: Some(r#"[{"k": "v"}]"#.to_string()),
        function: true,
        ..EvalArgs::default()
    };
    assert_eq!(evaluate(&args, "").unwrap(), json!([{"k": "v"}, {"k": "v"}]));
}

#[test]
fn test_bad_inputs() {
    let args = EvalArgs {
        tree: "/nonexistent/cook/tree.json".to_string(),
        ..EvalArgs::default()
    };
    assert!(matches!(evaluate(&args, ""), Err(CliError::Io { .. })));

    let path = scratch_file("literal.json", r#"{"type": "Literal", "value": 1}"#);
    let args = EvalArgs {
        tree: path.display().to_string(),
        globals: Some("[1]".to_string()),
        ..EvalArgs::default()
    };
    let err = evaluate(&args, "").unwrap_err();
    assert_eq!(err.to_string(), "--globals must be a JSON object");

    let args = EvalArgs {
        globals: Some("{".to_string()),
        ..args
    };
    assert!(matches!(
        evaluate(&args, ""),
        Err(CliError::Json { what: "globals", .. })
    ));
}

#[test]
fn test_evaluation_errors_pass_through() {
    let path = scratch_file("missing.json", r#"{"type": "Identifier", "name": "nope"}"#);
    let args = EvalArgs {
        tree: path.display().to_string(),
        ..EvalArgs::default()
    };
    let err = evaluate(&args, "").unwrap_err();
    assert_eq!(err.to_string(), "ReferenceError: nope is not defined");
}
