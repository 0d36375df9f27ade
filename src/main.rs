//! Command-line entry point: `boundcheck <input-module> [<output-path>]`.
//!
//! Exits `0` on success (reports, if any, are written regardless of
//! whether any were found) and `-1` if the input module cannot be parsed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use boundcheck::engine::{Engine, EngineConfig};
use boundcheck::error::EngineError;
use boundcheck::module::Module;

#[derive(Parser)]
#[command(name = "boundcheck")]
#[command(about = "Interprocedural interval analysis for out-of-bounds indexing", long_about = None)]
struct Cli {
    /// Path to the input module, serialized as JSON.
    input: PathBuf,

    /// Where to write report lines. Falls back to stdout if omitted or
    /// unopenable.
    output: Option<PathBuf>,

    /// Maximum call-context depth for interprocedural recursion.
    #[arg(long, default_value_t = 2)]
    context_depth_bound: usize,

    /// Sets the level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match cli.verbose {
        0 => log::set_max_level(log::LevelFilter::Info),
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // The CLI's exit-code contract (0 / -1) is part of the spec, so the
    // top-level anyhow::Result is matched here rather than propagated with
    // `?` from main, which would forward Rust's own process::Termination
    // exit code instead.
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            exit_unparseable()
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let module = load_module(&cli.input)?;

    let config = EngineConfig { context_depth_bound: cli.context_depth_bound };
    let mut engine = Engine::new(config);
    info!("analyzing module {}", module.name);
    engine.analyze_module(&module);

    let lines = engine.report_lines();
    write_report(cli.output.as_deref(), &lines);
    Ok(())
}

/// Reads and deserializes the input module, surfacing typed `EngineError`s
/// that `anyhow` then wraps with call-site context for the CLI's diagnostic
/// output. The Err variant is what the `0` / `-1` exit-code contract of §6
/// distinguishes at the top of `main`.
fn load_module(path: &Path) -> Result<Module, EngineError> {
    let text = fs::read_to_string(path).map_err(|source| EngineError::Io { path: path.display().to_string(), source })?;
    serde_json::from_str(&text).map_err(|e| EngineError::MalformedModule(e.to_string()))
}

fn write_report(output: Option<&Path>, lines: &[String]) {
    let body = lines.join("\n");
    match output {
        Some(path) => match fs::File::create(path) {
            Ok(mut f) => {
                if writeln!(f, "{body}").is_err() {
                    println!("{body}");
                }
            }
            Err(_) => println!("{body}"),
        },
        None => println!("{body}"),
    }
}

fn exit_unparseable() -> ExitCode {
    // `-1` as an 8-bit process exit code wraps to 255.
    ExitCode::from(255)
}
