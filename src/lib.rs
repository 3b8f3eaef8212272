//! # natrix
//!
//! natrix is a tree-walking interpreter for a small dynamically-typed,
//! indentation-delimited language written in Rust. It normalizes and
//! indexes source text, tokenizes it with an indentation-aware lexer,
//! parses it by recursive descent into an arena-allocated AST, and
//! executes the tree over a mark-and-sweep garbage-collected heap.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::io::Write;

use tracing::debug;

use crate::{error::{DiagHandler, Error},
            interpreter::{evaluator::evaluate, parser::parse},
            source::Source,
            util::arena::Arena};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Stmt` enums that represent the
/// syntactic structure of source code as a tree. The AST is built by
/// the parser into an arena and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language
///   constructs.
/// - Attaches source spans to AST nodes for error reporting.
/// - Provides the indented text dump used for debugging and golden
///   tests.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines the diagnostic machinery used during lexing and
/// parsing (kinds, the handler trait, the bundled sinks) and the
/// runtime fault enum raised during evaluation. It standardizes error
/// reporting and carries exact source positions for compile-time
/// problems.
///
/// # Responsibilities
/// - Defines the diagnostic handler contract and its stderr renderer.
/// - Defines the runtime fault enum with its exact messages.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, the object
/// model and the garbage collector to provide a complete runtime for
/// source code execution.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, heap, evaluator.
/// - Provides the building blocks behind [`interpret`].
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// Source text handling.
///
/// This module owns loading and normalization of source code and the
/// lazily-built line index that diagnostics use to turn byte offsets
/// into line and column numbers.
///
/// # Responsibilities
/// - Normalizes line endings and guarantees a final newline.
/// - Maps byte positions to 1-based lines in logarithmic time.
/// - Defines the `Span` type shared by tokens, AST and diagnostics.
pub mod source;
/// General utilities.
///
/// This module provides the supporting infrastructure that is not
/// specific to a single interpreter phase.
///
/// # Responsibilities
/// - Provides the arena allocator backing the AST.
pub mod util;

/// Parses and executes a program.
///
/// The source is parsed into a fresh arena; on success the program
/// runs with `arg` bound to the variable `arg` and `print` writing to
/// `out`. Diagnostics go to `handler`; when any is reported, execution
/// is skipped entirely.
///
/// # Errors
/// Returns [`Error::Parse`] when parsing failed (the diagnostics were
/// already delivered to the handler) and [`Error::Runtime`] when the
/// program aborted with a runtime fault.
///
/// # Examples
/// ```
/// use natrix::{error::StderrHandler, source::Source};
///
/// let source = Source::from_string("<string>", "print(2 + 2)\n");
/// let mut out = Vec::new();
/// let res = natrix::interpret(&source, 0, &mut out, &mut StderrHandler);
/// assert!(res.is_ok());
/// assert_eq!(out, b"4\n");
/// ```
pub fn interpret<W: Write>(source: &Source,
                           arg: i64,
                           out: &mut W,
                           handler: &mut dyn DiagHandler)
                           -> Result<(), Error> {
    let arena = Arena::new();
    let Some(program) = parse(&arena, source, handler) else {
        return Err(Error::Parse);
    };
    let stats = arena.stats();
    debug!(target: "natrix::parser",
           chunks = stats.chunk_count,
           bytes = stats.alloc_size,
           nodes = stats.alloc_count,
           "arena usage after parse");

    evaluate(source, program, arg, out).map_err(Error::Runtime)
}
