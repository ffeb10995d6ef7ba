//! This crate runs golden-file tests against compiled Slox interpreters.
//!
//! Every `.slox` script in the test directory becomes a [`TestCase`] holding
//! its expected stdout/stderr (read from sibling `.stdout`/`.stderr` files; a
//! missing file means "expect nothing"). The cases are fanned out over a
//! worker pool, one run per script per interpreter, and the workers send
//! their outcomes back over a channel so that only the main thread ever
//! touches the terminal.

use clap::Parser;
use crossterm::style::Stylize;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::{self, Command},
    str,
    sync::mpsc,
};
use strip_ansi::strip_ansi;
use thiserror::Error;
use threadpool::ThreadPool;
use walkdir::WalkDir;

/// Why a script's run didn't match its golden files.
#[derive(Debug, Error)]
enum Failure {
    #[error("failed to run the interpreter: {0}")]
    Io(#[from] io::Error),

    #[error("interpreter output was not UTF-8: {0}")]
    Decoding(#[from] str::Utf8Error),

    #[error("wrong {stream}:\n--- expected ---\n{expected}\n--- actual ---\n{actual}")]
    Mismatch {
        stream: &'static str,
        expected: String,
        actual: String,
    },
}

/// One script together with the output it is expected to produce.
#[derive(Clone, Debug)]
struct TestCase {
    /// The path of the `.slox` script.
    script: PathBuf,

    /// The expected stdout, trimmed.
    expected_stdout: String,

    /// The expected stderr, trimmed.
    expected_stderr: String,
}

impl TestCase {
    /// Load the golden files for the given script.
    fn load(script: PathBuf) -> Self {
        let expected_stdout = read_golden(&script, "stdout");
        let expected_stderr = read_golden(&script, "stderr");
        Self {
            script,
            expected_stdout,
            expected_stderr,
        }
    }

    /// The script's file name, for report lines.
    fn name(&self) -> String {
        display_name(&self.script)
    }

    /// Run the script under the given interpreter and compare both streams.
    fn run(&self, interpreter: &Path) -> Result<(), Failure> {
        let output = Command::new(interpreter).arg(&self.script).output()?;
        check_stream("stdout", &self.expected_stdout, &output.stdout)?;
        check_stream("stderr", &self.expected_stderr, &output.stderr)?;
        Ok(())
    }
}

/// Read the golden file with the given extension next to the script.
fn read_golden(script: &Path, extension: &str) -> String {
    fs::read_to_string(script.with_extension(extension))
        .map(|contents| contents.trim().to_string())
        .unwrap_or_default()
}

/// Compare one output stream against its golden text, ANSI styling stripped.
fn check_stream(stream: &'static str, expected: &str, raw: &[u8]) -> Result<(), Failure> {
    let actual = strip_ansi(str::from_utf8(raw)?).trim().to_string();
    if expected == actual {
        Ok(())
    } else {
        Err(Failure::Mismatch {
            stream,
            expected: expected.to_string(),
            actual,
        })
    }
}

/// The last component of a path, for report lines.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A finished run, sent back from the worker pool to the main thread.
struct Completed {
    /// The interpreter's file name.
    interpreter: String,

    /// The script's file name.
    case: String,

    /// Whether the outputs matched, and how they differed if not.
    result: Result<(), Failure>,
}

/// The args of the program.
#[derive(Parser, Debug)]
struct Args {
    /// The directory of Slox scripts to test.
    test_dir: PathBuf,

    /// The interpreters to test with.
    #[arg(short, long)]
    interpreter: Vec<PathBuf>,
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();

    let cases: Vec<TestCase> = WalkDir::new(env::current_dir()?.join(&args.test_dir))
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_type().is_file().then_some(entry.into_path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "slox"))
        .map(TestCase::load)
        .collect();
    let total = cases.len() * args.interpreter.len();

    let pool = ThreadPool::new(num_cpus::get());
    let (sender, receiver) = mpsc::channel();

    for interpreter in &args.interpreter {
        for case in &cases {
            let interpreter = interpreter.clone();
            let case = case.clone();
            let sender = sender.clone();
            pool.execute(move || {
                let result = case.run(&interpreter);
                // A send failure means the main thread is gone, and with it
                // anyone who could care about this result.
                let _ = sender.send(Completed {
                    interpreter: display_name(&interpreter),
                    case: case.name(),
                    result,
                });
            });
        }
    }
    drop(sender);

    // The channel closes once every worker has reported, so this drains
    // exactly `total` results.
    let mut failures = 0u32;
    for completed in receiver {
        match completed.result {
            Ok(()) => println!(
                "{} {} {}",
                completed.interpreter,
                completed.case,
                "PASSED".green().bold(),
            ),
            Err(failure) => {
                failures += 1;
                println!(
                    "{} {} {}:\n{failure}\n",
                    completed.interpreter,
                    completed.case,
                    "FAILED".red().bold(),
                );
            }
        }
    }

    println!("\n{failures} failures in {total} tests");
    if failures > 0 {
        process::exit(255);
    }

    Ok(())
}
