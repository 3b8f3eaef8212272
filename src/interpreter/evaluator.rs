/// Core evaluation logic.
///
/// Contains the evaluation context, statement execution, expression
/// evaluation and the environment, all integrated with the collector's
/// rooting discipline.
pub mod core;

/// Binary operator evaluation.
///
/// Implements integer arithmetic with wrap-around, integer
/// comparisons, and string concatenation.
pub mod binary;

pub use self::core::evaluate;
