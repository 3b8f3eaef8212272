/// Core parser state and expression parsing.
///
/// Contains the parser struct, the `parse` entry point, token
/// bookkeeping helpers, and the primary/postfix expression levels.
pub mod core;

/// Binary operator precedence levels.
///
/// Implements the multiplicative, additive and relational levels of
/// the expression grammar. The relational level is non-associative.
pub mod binary;

/// Statement parsing.
///
/// Implements simple statements (expression, assignment, `print`,
/// `pass`) and the statement-sequence loop.
pub mod statement;

/// Block and compound statement parsing.
///
/// Implements indented blocks and the `while`/`if`/`elif`/`else`
/// statements built from them.
pub mod block;

pub use self::core::parse;
