//! `cook` subcommands.

use ariadne::{Color, Label, Report, ReportKind, Source};
use cook_eval::value::{from_json, to_json};
use cook_eval::{Globals, Value};
use cookc::{CookError, CookOptions, PrecookOptions, Rules};
use thiserror::Error;

/// Failures of the command itself, as opposed to the evaluated code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid {what}: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Cook(#[from] CookError),
}

/// Parsed `cook eval` / `cook globals` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalArgs {
    pub tree: String,
    pub source: Option<String>,
    pub globals: Option<String>,
    pub args: Option<String>,
    pub function: bool,
    pub typescript: bool,
    pub rules: Rules,
}

impl EvalArgs {
    pub fn parse(argv: &[String]) -> Result<Self, CliError> {
        let mut parsed = EvalArgs::default();
        let mut tree = None;
        let mut iter = argv.iter();
        while let Some(arg) = iter.next() {
            let mut value_of = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--source" => parsed.source = Some(value_of("--source")?),
                "--globals" => parsed.globals = Some(value_of("--globals")?),
                "--args" => parsed.args = Some(value_of("--args")?),
                "--function" | "-f" => parsed.function = true,
                "--typescript" => parsed.typescript = true,
                "--no-var" => parsed.rules.no_var = true,
                "--loose-globals" => parsed.rules.loose_global_assignment = true,
                "--annex-b" => parsed.rules.annex_b_block_functions = true,
                flag if flag.starts_with('-') => {
                    return Err(CliError::Usage(format!("unknown option '{flag}'")));
                }
                path if tree.is_none() => tree = Some(path.to_string()),
                extra => return Err(CliError::Usage(format!("unexpected argument '{extra}'"))),
            }
        }
        parsed.tree = tree.ok_or_else(|| CliError::Usage("missing syntax tree path".to_string()))?;
        if parsed.args.is_some() {
            parsed.function = true;
        }
        Ok(parsed)
    }

    fn precook_options(&self) -> PrecookOptions {
        PrecookOptions::default()
            .with_rules(self.rules)
            .with_typescript(self.typescript)
    }
}

pub(crate) fn read_file(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })
}

/// Inline JSON, or `@path` to read it from a file.
fn read_json(text: &str, what: &'static str) -> Result<serde_json::Value, CliError> {
    let owned;
    let text = match text.strip_prefix('@') {
        Some(path) => {
            owned = read_file(path)?;
            owned.as_str()
        }
        None => text,
    };
    serde_json::from_str(text).map_err(|source| CliError::Json { what, source })
}

fn read_globals(text: Option<&str>) -> Result<Globals, CliError> {
    let Some(text) = text else {
        return Ok(Globals::new());
    };
    match read_json(text, "globals")? {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(name, value)| (name.clone(), from_json(value)))
            .collect()),
        _ => Err(CliError::Usage("--globals must be a JSON object".to_string())),
    }
}

fn read_args(text: Option<&str>) -> Result<Vec<Value>, CliError> {
    let Some(text) = text else {
        return Ok(Vec::new());
    };
    match read_json(text, "arguments")? {
        serde_json::Value::Array(items) => Ok(items.iter().map(from_json).collect()),
        _ => Err(CliError::Usage("--args must be a JSON array".to_string())),
    }
}

/// Free variables of the tree, sorted.
pub fn free_variables(args: &EvalArgs, source: &str) -> Result<Vec<String>, CliError> {
    let tree = read_file(&args.tree)?;
    let names = if args.function {
        cookc::prefeast(&tree, source, args.precook_options())?.free_variables
    } else {
        let expression = cookc::tree::read_expression(&tree)?;
        cookc::precook(expression, source, args.precook_options())?.free_variables
    };
    Ok(names.into_iter().collect())
}

/// Evaluate the tree and convert the result to JSON.
pub fn evaluate(args: &EvalArgs, source: &str) -> Result<serde_json::Value, CliError> {
    let tree = read_file(&args.tree)?;
    let options = CookOptions {
        rules: args.rules,
        global_variables: read_globals(args.globals.as_deref())?,
        ..CookOptions::default()
    };
    let value = if args.function {
        let call_args = read_args(args.args.as_deref())?;
        let precooked = cookc::prefeast(&tree, source, args.precook_options())?;
        let function = cookc::feast(&precooked, &options)?;
        cookc::invoke(&function, &call_args)?
    } else {
        let expression = cookc::tree::read_expression(&tree)?;
        let precooked = cookc::precook(expression, source, args.precook_options())?;
        cookc::cook(&precooked, &options)?
    };
    Ok(to_json(&value))
}

/// Print a failure, underlining the offending source when there is some.
pub fn report(err: &CliError, source_path: Option<&str>, source: &str) {
    let CliError::Cook(cook_err) = err else {
        eprintln!("error: {err}");
        return;
    };
    let class = cook_err.error_class().unwrap_or("Error");
    let (Some(path), Some(span)) = (source_path, cook_err.span()) else {
        eprintln!("error: {cook_err}");
        return;
    };
    let range = span.char_range(source);
    let printed = Report::build(ReportKind::Error, path, range.start)
        .with_message(format!("{class}: {}", cook_err.message()))
        .with_label(
            Label::new((path, range))
                .with_message(class)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((path, Source::from(source.to_string())));
    if printed.is_err() {
        eprintln!("error: {cook_err}");
    }
}

#[cfg(test)]
mod tests;
