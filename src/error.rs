/// Compile-time diagnostics.
///
/// Defines the diagnostic severity, the pluggable handler trait through
/// which the parser reports lexical and syntactic problems, and the two
/// bundled sinks: the stderr renderer used by the driver and a
/// collecting sink used by tests.
pub mod diag;
/// Runtime errors.
///
/// Contains all fault types that can be raised during evaluation, such
/// as division by zero, undefined variables, bad subscripts, or
/// exhausted collector resources. Runtime faults abort the program.
pub mod runtime_error;

pub use self::diag::{CollectingHandler, DiagHandler, DiagKind, StderrHandler};
pub use self::runtime_error::RuntimeError;

#[derive(Debug)]
/// The result of a failed [`crate::interpret`] call.
pub enum Error {
    /// Parsing failed. The diagnostics were already delivered to the
    /// handler; no program was executed.
    Parse,
    /// Execution failed with a runtime fault.
    Runtime(RuntimeError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parsing failed"),
            Self::Runtime(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Error {}
