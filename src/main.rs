use std::{io, path::PathBuf, process};

use clap::Parser;
use natrix::{error::{Error, StderrHandler},
             source::Source};
use tracing_subscriber::EnvFilter;

/// natrix is a small dynamically-typed, indentation-delimited
/// programming language in the Python family.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the script to run.
    filename: PathBuf,

    /// Non-negative value bound to the variable `arg` inside the
    /// script.
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..))]
    arg: i64,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env())
                             .with_writer(io::stderr)
                             .init();

    // `try_parse` instead of `parse`: usage problems exit with status
    // 1, the same as every other failure.
    let args = Args::try_parse().unwrap_or_else(|error| {
                                    let _ = error.print();
                                    process::exit(1);
                                });

    let source = Source::from_file(&args.filename).unwrap_or_else(|error| {
                     eprintln!("Failed to read '{}': {error}", args.filename.display());
                     process::exit(1);
                 });

    let mut stdout = io::stdout().lock();
    match natrix::interpret(&source, args.arg, &mut stdout, &mut StderrHandler) {
        Ok(()) => {},
        // Diagnostics already went to stderr via the handler.
        Err(Error::Parse) => process::exit(1),
        Err(Error::Runtime(error)) => {
            eprintln!("{error}");
            process::exit(1);
        },
    }
}
