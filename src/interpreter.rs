/// The evaluator module executes AST nodes.
///
/// The evaluator traverses the AST, executes statements, evaluates
/// expressions over heap values, and maintains the variable
/// environment. It is the core execution engine of the interpreter.
///
/// # Responsibilities
/// - Executes statements in order and evaluates expressions left to
///   right.
/// - Keeps every intermediate value reachable across allocations, per
///   the collector's safety contract.
/// - Reports runtime faults such as division by zero or undefined
///   variables.
pub mod evaluator;
/// The heap module manages garbage-collected objects.
///
/// The heap owns every runtime value and reclaims unreachable ones
/// with a mark-and-sweep collector driven by allocation pressure.
/// Reachability starts from an explicit LIFO root stack.
///
/// # Responsibilities
/// - Allocates objects and hands out stable handles.
/// - Collects unreachable objects and adapts the collection threshold.
/// - Hosts the pinned singletons: booleans, small-int cache, type
///   objects.
pub mod heap;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the normalized source text and produces a stream of
/// tokens, synthesizing the `NEWLINE`/`INDENT`/`DEDENT` tokens that
/// carry the language's significant indentation. This is the first
/// stage of interpretation.
///
/// # Responsibilities
/// - Converts the input byte stream into tokens with exact source
///   spans.
/// - Tracks the indentation stack and emits the virtual block tokens.
/// - Reports lexical errors with a static reason, one per run.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from
/// tokens.
///
/// The parser processes the token stream by recursive descent and
/// constructs an arena-allocated AST representing expressions and
/// statements. It stops at the first error.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions,
///   statements).
/// - Validates the grammar and reports diagnostics with exact spans.
/// - Enforces structural rules such as valid assignment targets.
pub mod parser;
/// The value module defines the runtime object model.
///
/// This module declares the heap object variants used during
/// execution (integers, booleans, strings, lists and their storage,
/// type objects, environment records) and the generic operations that
/// dispatch on the receiver's type.
///
/// # Responsibilities
/// - Defines the `Obj` enum and the type descriptors.
/// - Implements boolean conversion, element access and assignment,
///   and index checking with their fault messages.
/// - Provides the list and string primitives used by the evaluator.
pub mod value;
