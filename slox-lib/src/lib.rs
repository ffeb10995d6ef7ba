//! This crate contains the front-end and runtime library for Slox, a small
//! dynamically-typed object-oriented scripting language evaluated by walking
//! the AST directly.
//!
//! The pipeline is scanner → parser → resolver → evaluator. This crate owns
//! everything up to and including the [`Interpreter`] seam; the evaluator
//! itself lives in the `slox-tw` crate.

pub mod ast;
pub mod callable;
pub mod class;
pub mod environment;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod pretty_printers;
pub mod scanner;
pub mod slox;
pub mod span;
pub mod tokens;

use color_eyre::Result;
use std::{env, process};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

pub use self::interpreter::Interpreter;

/// Run the interpreter, taking a source file as the first CLI argument, or
/// running the REPL if no file was given.
///
/// Exits with 64 on bad usage, 65 if the script had a static error, and 70 if
/// it failed at runtime.
pub fn run_interpreter<T: Interpreter>() -> Result<()> {
    color_eyre::install()?;

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::WARN.into())
                    .from_env_lossy(),
            ),
        ),
    )?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut interpreter = slox::SloxInterpreter::<T>::new();

    match args.as_slice() {
        [] => interpreter.run_prompt()?,
        [path] => {
            if let Err(error) = interpreter.run_file(path) {
                match error {
                    slox::RunFileError::StaticError => process::exit(slox::EXIT_STATIC_ERROR),
                    slox::RunFileError::RuntimeError => process::exit(slox::EXIT_RUNTIME_ERROR),
                    slox::RunFileError::Io(error) => return Err(error.into()),
                }
            }
        }
        _ => {
            eprintln!("Usage: slox-tw [script]");
            process::exit(slox::EXIT_USAGE);
        }
    }

    Ok(())
}
