use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use stutter::{BackendKind, CompileOptions, Error, render_error};
use stutter_core::{compiler, parser};
use tracing::{debug, info};

/// Stutter - compile arithmetic expressions to a stack machine or to C
#[derive(Parser, Debug)]
#[command(name = "stutter", version)]
#[command(about = "Compile an expression to stack-machine code or C", long_about = None)]
struct Args {
    /// File to write the generated code to
    output: PathBuf,

    /// Read the expression from this file (if not provided, reads from stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Code generator to use: `stack` or `c`
    #[arg(short, long, default_value_t = BackendKind::Stack)]
    backend: BackendKind,

    /// Print the parsed AST (for debugging)
    #[arg(long)]
    debug_parse: bool,
}

fn read_source(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .into_diagnostic()
                .wrap_err("failed to read standard input")?;
            Ok(source)
        }
    }
}

/// Parse and compile; `None` when an error has already been reported.
fn generate(source: &str, args: &Args) -> Option<String> {
    let tree = match parser::parse(source) {
        Ok(tree) => tree,
        Err(error) => {
            render_error(&Error::Parse {
                error,
                input: source.to_string(),
            });
            return None;
        }
    };

    if args.debug_parse {
        println!("=== Parsed AST ===");
        println!("{tree}");
        println!();
    }

    match compiler::compile(&tree, &CompileOptions::new(args.backend)) {
        Ok(code) => Some(code),
        Err(e) => {
            render_error(&e.into());
            None
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let source = read_source(args.input.as_deref())?;
    debug!(bytes = source.len(), backend = %args.backend, "Read source");

    let Some(code) = generate(&source, args) else {
        return Ok(false);
    };

    fs::write(&args.output, code)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "Wrote generated code");
    Ok(true)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    exit_code(run(&args))
}

fn exit_code(outcome: Result<bool>) -> ExitCode {
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}
