//! Cook CLI
//!
//! Runs ESTree JSON produced by an external parser through the sandboxed
//! interpreter.

mod commands;

use commands::{report, EvalArgs};

fn main() {
    cookc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "eval" | "globals" => {
            let parsed = match EvalArgs::parse(&args[2..]) {
                Ok(parsed) => parsed,
                Err(err) => {
                    eprintln!("error: {err}");
                    eprintln!();
                    eprintln!("Usage: cook {command} <ast.json> [options]");
                    eprintln!("Run `cook help` for the list of options.");
                    std::process::exit(2);
                }
            };
            let source = match parsed.source.as_deref().map(commands::read_file) {
                Some(Ok(text)) => text,
                Some(Err(err)) => {
                    report(&err, None, "");
                    std::process::exit(1);
                }
                None => String::new(),
            };

            if command == "globals" {
                match commands::free_variables(&parsed, &source) {
                    Ok(names) => {
                        for name in names {
                            println!("{name}");
                        }
                    }
                    Err(err) => {
                        report(&err, parsed.source.as_deref(), &source);
                        std::process::exit(1);
                    }
                }
                return;
            }

            match commands::evaluate(&parsed, &source) {
                Ok(value) => match serde_json::to_string_pretty(&value) {
                    Ok(text) => println!("{text}"),
                    Err(err) => {
                        eprintln!("error: cannot print result: {err}");
                        std::process::exit(1);
                    }
                },
                Err(err) => {
                    report(&err, parsed.source.as_deref(), &source);
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("cook {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Cook - sandboxed evaluation of ESTree syntax trees");
    println!();
    println!("Usage: cook <command> [options]");
    println!();
    println!("Commands:");
    println!("  eval <ast.json>      Evaluate an expression or call a function");
    println!("  globals <ast.json>   List the globals the code may read");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --source <file>     Source text the tree was parsed from (for diagnostics)");
    println!("  --globals <json>    Global variables as a JSON object, or @file");
    println!("  --args <json>       Call arguments as a JSON array, or @file (implies --function)");
    println!("  --function, -f      The tree is a function; call it");
    println!("  --typescript        Accept `as` and `!` type assertions");
    println!("  --no-var            Reject `var` declarations");
    println!("  --loose-globals     Assigning an undeclared name creates a global");
    println!("  --annex-b           Block-level functions update same-named vars");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=cook_eval=debug   Trace evaluation");
    println!("  COOK_LOG_TREE=1            Render traces as an indented tree");
    println!();
    println!("Examples:");
    println!("  cook eval expr.json --source expr.js --globals '{{\"DATA\": {{\"a\": 1}}}}'");
    println!("  cook eval fn.json --args '[1, 2]'");
    println!("  cook globals fn.json --function");
}
