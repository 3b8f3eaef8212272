use std::io;

#[derive(Debug)]
/// Represents all faults that can occur while executing a program.
///
/// Runtime faults are not catchable from the language: the driver
/// prints the message on stderr and terminates with a non-zero status.
pub enum RuntimeError {
    /// The right operand of `/` evaluated to zero.
    DivisionByZero,
    /// A name was read before any assignment to it.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
    },
    /// An integer literal does not fit into a 64-bit signed integer.
    IntegerLiteralTooLarge,
    /// A subscript index is outside `[-len, len)`.
    IndexOutOfRange,
    /// A subscript index is not an `int`.
    IndexMustBeInteger,
    /// A subscript was applied to something other than a list.
    SubscriptedValueMustBeList,
    /// A `while` or `if` condition did not evaluate to an `int`.
    ConditionMustBeInteger,
    /// A binary operator was applied to an unsupported combination of
    /// operand types.
    OperandsMustBeIntegers,
    /// The type provides no boolean conversion.
    CannotConvertToBool {
        /// The name of the offending type.
        type_name: &'static str,
    },
    /// The type provides no element access.
    NotSubscriptable {
        /// The name of the offending type.
        type_name: &'static str,
    },
    /// The type provides no element assignment.
    NoItemAssignment {
        /// The name of the offending type.
        type_name: &'static str,
    },
    /// `print` was applied to a value that is neither `int` nor `str`.
    CannotPrint {
        /// The name of the offending type.
        type_name: &'static str,
    },
    /// The fixed-capacity GC root stack overflowed.
    TooManyRoots,
    /// The collection threshold can no longer grow.
    TooManyObjects,
    /// Writing program output failed.
    Output(io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::UndefinedVariable { name } => write!(f, "Undefined variable: {name}"),
            Self::IntegerLiteralTooLarge => write!(f, "Integer literal too large"),
            Self::IndexOutOfRange => write!(f, "Index out of range"),
            Self::IndexMustBeInteger => write!(f, "Index must be an integer"),
            Self::SubscriptedValueMustBeList => write!(f, "Subscripted value must be a list"),
            Self::ConditionMustBeInteger => write!(f, "Condition must be an integer"),
            Self::OperandsMustBeIntegers => write!(f, "Operands must be integers"),
            Self::CannotConvertToBool { type_name } => {
                write!(f, "cannot convert '{type_name}' object to bool")
            },
            Self::NotSubscriptable { type_name } => {
                write!(f, "'{type_name}' object is not subscriptable")
            },
            Self::NoItemAssignment { type_name } => {
                write!(f, "'{type_name}' object does not support item assignment")
            },
            Self::CannotPrint { type_name } => write!(f, "cannot print '{type_name}' object"),
            Self::TooManyRoots => write!(f, "too many GC roots"),
            Self::TooManyObjects => write!(f, "too many objects"),
            Self::Output(error) => write!(f, "Failed to write output: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<io::Error> for RuntimeError {
    fn from(error: io::Error) -> Self {
        Self::Output(error)
    }
}
