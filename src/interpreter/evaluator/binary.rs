use std::io::Write;

use crate::{ast::{BinaryOp, Expr},
            error::RuntimeError,
            interpreter::{evaluator::core::{Context, EvalResult},
                          heap::Handle}};

impl<W: Write> Context<'_, W> {
    /// Evaluates a binary expression.
    ///
    /// Operands are evaluated left to right; the left value is rooted
    /// across the evaluation of the right one, which may allocate and
    /// trigger a collection. This ordering is observable and must not
    /// change.
    pub(in crate::interpreter::evaluator) fn eval_binary(&mut self,
                                                         left: &Expr,
                                                         op: BinaryOp,
                                                         right: &Expr)
                                                         -> EvalResult<Handle> {
        let lhs = self.eval(left)?;
        self.heap.root(lhs)?;
        let rhs = self.eval(right)?;
        let result = self.apply_binary(op, lhs, rhs);
        self.heap.unroot(lhs);
        result
    }

    /// Applies a binary operation to two evaluated values.
    ///
    /// Two `int` operands use 64-bit two's-complement arithmetic;
    /// comparisons yield `int` 0 or 1. `+` on two `str` operands
    /// concatenates. Every other combination is a fault.
    fn apply_binary(&mut self, op: BinaryOp, lhs: Handle, rhs: Handle) -> EvalResult<Handle> {
        if let (Some(left), Some(right)) =
            (self.heap.int_value(lhs), self.heap.int_value(rhs))
        {
            let value = match op {
                BinaryOp::Add => left.wrapping_add(right),
                BinaryOp::Sub => left.wrapping_sub(right),
                BinaryOp::Mul => left.wrapping_mul(right),
                BinaryOp::Div => {
                    if right == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    left.wrapping_div(right)
                },
                BinaryOp::Eq => i64::from(left == right),
                BinaryOp::Ne => i64::from(left != right),
                BinaryOp::Lt => i64::from(left < right),
                BinaryOp::Le => i64::from(left <= right),
                BinaryOp::Gt => i64::from(left > right),
                BinaryOp::Ge => i64::from(left >= right),
            };
            return self.heap.new_int(value);
        }
        if op == BinaryOp::Add && self.heap.is_str(lhs) && self.heap.is_str(rhs) {
            return self.heap.str_concat(lhs, rhs);
        }
        Err(RuntimeError::OperandsMustBeIntegers)
    }
}
