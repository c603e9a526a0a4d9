//! FanC Compiler Driver
//!
//! Reads a parsed program as JSON, runs semantic analysis and code
//! generation, and writes the IR text.

use clap::Parser;
use fcc_common::CompilerError;
use fcc_frontend::{CompileOptions, Frontend, Program};
use log::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fcc")]
#[command(about = "FanC Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Parsed program in JSON form (defaults to stdin)
    input: Option<PathBuf>,

    /// Output IR file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with compile options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Leave the runtime library out of the output
    #[arg(long)]
    no_runtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CompilerError> {
    let mut options = load_options(cli.config.as_deref())?;
    if cli.no_runtime {
        options.emit_runtime = false;
    }
    debug!("compile options: {options:?}");

    let source = read_input(cli.input.as_deref())?;
    let program = decode_program(&source)?;
    info!("compiling {} functions", program.functions.len());

    let ir = Frontend::compile(&program, &options)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, ir)?;
            info!("IR written to {}", path.display());
        }
        None => print!("{ir}"),
    }
    Ok(())
}

/// Options from `path`, or the defaults when no file is given
fn load_options(path: Option<&Path>) -> Result<CompileOptions, CompilerError> {
    let Some(path) = path else {
        return Ok(CompileOptions::default());
    };
    let text = fs::read_to_string(path)?;
    parse_options(&text)
}

fn parse_options(text: &str) -> Result<CompileOptions, CompilerError> {
    serde_json::from_str(text).map_err(|e| CompilerError::input_error(format!("bad config: {e}")))
}

fn read_input(path: Option<&Path>) -> Result<String, CompilerError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn decode_program(source: &str) -> Result<Program, CompilerError> {
    if source.trim().is_empty() {
        return Err(CompilerError::input_error("empty input"));
    }
    Frontend::parse_json(source)
}
