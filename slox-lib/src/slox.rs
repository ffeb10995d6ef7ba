//! This module acts as a top-level entrypoint to evaluating Slox code.

use crate::{
    object::SloxObject,
    parser::Parser,
    scanner::Scanner,
    span::{SourceMap, Span},
    tokens::{Token, TokenKind},
    Interpreter,
};
use lazy_static::lazy_static;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    fs, io,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};
use thiserror::Error;
use tracing::{debug, trace};

/// The command was used incorrectly (see sysexits).
pub const EXIT_USAGE: i32 = 64;

/// The input program failed to scan, parse, or resolve.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// The program failed at runtime.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Have we encountered at least one error before runtime?
static HAD_STATIC_ERROR: AtomicBool = AtomicBool::new(false);

/// Have we encountered at least one error at runtime?
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

lazy_static! {
    /// The line table of the code being worked with.
    static ref SOURCE_MAP: RwLock<SourceMap> = RwLock::new(SourceMap::new(""));
}

/// The Slox interpreter driver, owning a long-lived evaluator.
#[derive(Clone, Debug)]
pub struct SloxInterpreter<T: Interpreter> {
    /// The core evaluator implementation to use.
    interpreter: T,
}

/// An error that can be returned from [`SloxInterpreter::run_file`].
#[derive(Debug, Error)]
pub enum RunFileError {
    /// The script had a scan, parse, or resolve error.
    #[error("The script could not be compiled")]
    StaticError,

    /// The script failed at runtime.
    #[error("The script failed at runtime")]
    RuntimeError,

    /// A standard I/O error.
    #[error("I/O error: `{0:?}`")]
    Io(#[from] io::Error),
}

/// An error that can be returned from [`SloxInterpreter::run_prompt`].
#[derive(Debug, Error)]
pub enum PromptError {
    /// An error from `rustyline`.
    #[error("rustyline error: `{0:?}`")]
    Readline(#[from] ReadlineError),

    /// A standard I/O error.
    #[error("I/O error: `{0:?}`")]
    Io(#[from] io::Error),
}

impl<T: Interpreter> Default for SloxInterpreter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpreter> SloxInterpreter<T> {
    /// Create a new driver with a fresh evaluator.
    pub fn new() -> Self {
        Self {
            interpreter: T::new(),
        }
    }

    /// Read the given file and run its contents.
    ///
    /// The file is read as a byte stream and decoded lossily: the language is
    /// ASCII-oriented, but string literals may contain arbitrary bytes.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<(), RunFileError> {
        let code = String::from_utf8_lossy(&fs::read(path)?).into_owned();

        *SOURCE_MAP.write().unwrap() = SourceMap::new(&code);
        self.run_code(&code);

        if HAD_STATIC_ERROR.load(Ordering::Relaxed) {
            Err(RunFileError::StaticError)
        } else if HAD_RUNTIME_ERROR.load(Ordering::Relaxed) {
            Err(RunFileError::RuntimeError)
        } else {
            Ok(())
        }
    }

    /// Read code from an interactive prompt and run it, line by line.
    ///
    /// The evaluator is shared across all lines, so globals defined on one
    /// line are visible on later ones. Errors are reported but don't end the
    /// session; EOF or Ctrl-C does.
    pub fn run_prompt(&mut self) -> Result<(), PromptError> {
        let mut prompt = DefaultEditor::new()?;

        let history_file =
            home::home_dir().map(|dir| dir.join(".config").join("slox").join(".history"));
        if let Some(history_file) = &history_file {
            if !history_file.exists() {
                if let Some(parent) = history_file.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::File::create(history_file)?;
            }
            prompt.load_history(history_file)?;
        }

        // All the code entered so far. Each new line is padded to the width of
        // this accumulated source before being scanned, so that spans stay
        // unique across lines and keep mapping to increasing line numbers.
        let mut source = String::new();

        loop {
            match prompt.readline("> ") {
                Ok(mut line) => {
                    prompt.add_history_entry(&line)?;
                    if let Some(history_file) = &history_file {
                        prompt.save_history(history_file)?;
                    }
                    line.push('\n');

                    let previous_width = source.len();
                    source.push_str(&line);
                    *SOURCE_MAP.write().unwrap() = SourceMap::new(&source);

                    let padded = format!("{:previous_width$}{line}", "");
                    if let Some(value) = self.run_code(&padded) {
                        println!("{}", value.repr());
                    }
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => return Ok(()),
                Err(ReadlineError::Io(e)) => return Err(e)?,
                Err(error) => panic!("Unknown rustyline error: `{error:?}`"),
            }

            HAD_STATIC_ERROR.store(false, Ordering::Relaxed);
            HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
        }
    }

    /// Run the given Slox code, returning the value of a trailing expression
    /// statement for the prompt to echo.
    ///
    /// Evaluation only starts if the whole static phase (scanning and parsing
    /// here, resolution inside [`Interpreter::interpret`]) found no errors.
    fn run_code(&mut self, code: &str) -> Option<SloxObject> {
        debug!("Running code: ```slox\n{}```", code.trim_start());

        let tokens = Scanner::scan_tokens(code);
        trace!(?tokens);

        let stmts = Parser::parse(tokens);
        trace!(?stmts);

        if HAD_STATIC_ERROR.load(Ordering::Relaxed) {
            return None;
        }

        self.interpreter.interpret(&stmts)
    }
}

/// Report a static error at the given token.
pub fn report_token_error(token: &Token<'_>, message: &str) {
    let location = if token.kind == TokenKind::Eof {
        "at end".to_string()
    } else {
        format!("at '{}'", token.lexeme)
    };

    print_static_error(token.span, &format!(" {location}"), message);
    HAD_STATIC_ERROR.store(true, Ordering::Relaxed);
}

/// Report a static error with no token location, e.g. from the scanner.
pub fn report_static_error(span: Span, message: &str) {
    print_static_error(span, "", message);
    HAD_STATIC_ERROR.store(true, Ordering::Relaxed);
}

/// Report a static error at the given name, e.g. from the resolver.
pub fn report_name_error(name: &crate::span::Spanned<String>, message: &str) {
    print_static_error(name.span, &format!(" at '{}'", name.item), message);
    HAD_STATIC_ERROR.store(true, Ordering::Relaxed);
}

/// Report an error at runtime.
pub fn report_runtime_error(span: Span, message: &str) {
    use crossterm::style::Stylize;

    let line = SOURCE_MAP.read().unwrap().line_of_span(span);
    eprintln!("{}", format!("{message}\n[line {line}]").red());
    HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
}

/// Print a static diagnostic as `[line N] Error <where>: <message>`.
fn print_static_error(span: Span, location: &str, message: &str) {
    use crossterm::style::Stylize;

    let line = SOURCE_MAP.read().unwrap().line_of_span(span);
    eprintln!(
        "[line {line}] {}{location}: {message}",
        "Error".red().bold()
    );
}
