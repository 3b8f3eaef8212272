use std::io::Write;

use crate::{ast::{Expr, Stmt},
            error::RuntimeError,
            interpreter::{heap::{Handle, Heap},
                          value::core::Obj},
            source::{Source, Span}};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the fault that aborts the run.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Executes a parsed program.
///
/// A fresh heap is created, the environment is seeded with the `arg`
/// binding, and the statements run in order. On success the
/// environment is unrooted and a final collection reclaims every
/// object; on a fault the function returns immediately, mirroring the
/// abort semantics of runtime errors (the heap is reclaimed by drop).
///
/// # Parameters
/// - `source`: The source the AST spans point into.
/// - `program`: The parsed statements.
/// - `arg`: Value bound to the variable `arg`.
/// - `out`: Sink receiving `print` output.
///
/// # Errors
/// Returns the first runtime fault encountered.
pub fn evaluate<W: Write>(source: &Source,
                          program: &[Stmt],
                          arg: i64,
                          out: &mut W)
                          -> EvalResult<()> {
    let mut heap = Heap::new();
    let env = heap.alloc(Obj::Env { head: None })?;
    heap.root(env)?;
    let mut context = Context { source,
                                out,
                                heap,
                                env };

    let arg = context.heap.new_int(arg)?;
    context.env_set("arg", arg)?;
    context.exec_block(program)?;

    context.heap.unroot(env);
    context.heap.collect()?;
    debug_assert_eq!(context.heap.objects_count(), 0);
    Ok(())
}

/// Stores the runtime evaluation state.
///
/// The context owns the heap and keeps a single rooted handle to the
/// environment; every binding hangs off that handle as a chain of
/// GC-managed cells, so one root keeps all variables alive.
pub(in crate::interpreter::evaluator) struct Context<'a, W> {
    source: &'a Source,
    out:    &'a mut W,
    pub(in crate::interpreter::evaluator) heap: Heap,
    env:    Handle,
}

impl<W: Write> Context<'_, W> {
    /// Executes a statement sequence in order.
    fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Executes a single statement.
    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expr { expr } => {
                self.eval(expr)?;
                Ok(())
            },
            Stmt::Assignment { target, value } => self.exec_assignment(target, value),
            Stmt::While { condition, body } => {
                while self.eval_condition(condition)? {
                    self.exec_block(body)?;
                }
                Ok(())
            },
            Stmt::If { condition,
                       then_body,
                       else_body, } => {
                if self.eval_condition(condition)? {
                    self.exec_block(then_body)
                } else {
                    self.exec_block(else_body)
                }
            },
            Stmt::Pass => Ok(()),
            Stmt::Print { expr } => self.exec_print(expr),
        }
    }

    /// Evaluates a `while`/`if` condition, which must be an `int`;
    /// any nonzero value counts as true.
    fn eval_condition(&mut self, condition: &Expr) -> EvalResult<bool> {
        let value = self.eval(condition)?;
        match self.heap.int_value(value) {
            Some(value) => Ok(value != 0),
            None => Err(RuntimeError::ConditionMustBeInteger),
        }
    }

    /// Executes an assignment to a name or a list element.
    ///
    /// The right-hand side is evaluated first. For a subscript target
    /// it is rooted across the evaluation of the receiver and the
    /// index, both of which may allocate.
    fn exec_assignment(&mut self, target: &Expr, value: &Expr) -> EvalResult<()> {
        let rhs = self.eval(value)?;
        match target {
            Expr::Name { span } => self.env_set_span(*span, rhs),
            Expr::Subscript { value: receiver,
                              index,
                              .. } => {
                self.heap.root(rhs)?;
                let receiver = self.eval(receiver)?;
                if !self.heap.is_list(receiver) {
                    return Err(RuntimeError::SubscriptedValueMustBeList);
                }
                self.heap.root(receiver)?;
                let index = self.eval(index)?;
                self.heap.set_element(receiver, index, rhs)?;
                self.heap.unroot(receiver);
                self.heap.unroot(rhs);
                Ok(())
            },
            _ => unreachable!("assignment targets are checked by the parser"),
        }
    }

    /// Executes a `print` statement: decimal for an `int`, raw bytes
    /// for a `str`, each followed by a newline.
    fn exec_print(&mut self, expr: &Expr) -> EvalResult<()> {
        let value = self.eval(expr)?;
        match self.heap.get(value) {
            Obj::Int(value) => writeln!(self.out, "{value}")?,
            Obj::Str(bytes) => {
                self.out.write_all(bytes)?;
                self.out.write_all(b"\n")?;
            },
            obj => return Err(RuntimeError::CannotPrint { type_name: obj.type_name() }),
        }
        Ok(())
    }

    /// Evaluates an expression to a heap value.
    ///
    /// The returned handle is unrooted; callers that allocate before
    /// using it must root it first.
    pub(in crate::interpreter::evaluator) fn eval(&mut self, expr: &Expr) -> EvalResult<Handle> {
        match expr {
            Expr::IntLiteral { span } => {
                let digits = self.source.slice(*span);
                let value: i64 = digits.parse()
                                       .map_err(|_| RuntimeError::IntegerLiteralTooLarge)?;
                self.heap.new_int(value)
            },
            Expr::StrLiteral { span } => {
                // Drop the surrounding quotes.
                let content = self.source.slice(Span::new(span.start + 1, span.end - 1));
                self.heap.new_str(content.as_bytes())
            },
            Expr::ListLiteral { elements, .. } => self.eval_list_literal(elements),
            Expr::Name { span } => self.env_get(*span),
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right),
            Expr::Subscript { value, index, .. } => self.eval_subscript(value, index),
        }
    }

    /// Evaluates a list literal.
    ///
    /// The list is created with the element count as initial capacity
    /// and stays rooted while the elements are evaluated and appended;
    /// each element is additionally rooted across its append, which
    /// may grow the storage.
    fn eval_list_literal(&mut self, elements: &[&Expr]) -> EvalResult<Handle> {
        let list = self.heap.new_list(elements.len())?;
        self.heap.root(list)?;
        for element in elements {
            let value = self.eval(element)?;
            self.heap.root(value)?;
            self.heap.list_append(list, value)?;
            self.heap.unroot(value);
        }
        self.heap.unroot(list);
        Ok(list)
    }

    /// Evaluates a subscript expression on a list.
    fn eval_subscript(&mut self, value: &Expr, index: &Expr) -> EvalResult<Handle> {
        let receiver = self.eval(value)?;
        if !self.heap.is_list(receiver) {
            return Err(RuntimeError::SubscriptedValueMustBeList);
        }
        self.heap.root(receiver)?;
        let index = self.eval(index)?;
        let result = self.heap.get_element(receiver, index);
        self.heap.unroot(receiver);
        result
    }

    /// Looks up a name, newest binding first.
    fn env_get(&mut self, span: Span) -> EvalResult<Handle> {
        let name = self.source.slice(span);
        let mut cursor = self.env_head();
        while let Some(cell) = cursor {
            match self.heap.get(cell) {
                Obj::EnvCell { name: cell_name,
                               value,
                               next, } => {
                    if &**cell_name == name {
                        return Ok(*value);
                    }
                    cursor = *next;
                },
                obj => panic!("environment chain must hold cells, found {}", obj.type_name()),
            }
        }
        Err(RuntimeError::UndefinedVariable { name: name.to_string() })
    }

    fn env_set_span(&mut self, span: Span, value: Handle) -> EvalResult<()> {
        self.env_set(self.source.slice(span), value)
    }

    /// Binds `name` to `value`, overwriting an existing binding or
    /// inserting a fresh cell at the head of the chain.
    ///
    /// Inserting allocates, so `value` is rooted across the cell
    /// allocation.
    pub(in crate::interpreter::evaluator) fn env_set(&mut self,
                                                     name: &str,
                                                     value: Handle)
                                                     -> EvalResult<()> {
        let mut cursor = self.env_head();
        while let Some(cell) = cursor {
            let (found, next) = match self.heap.get(cell) {
                Obj::EnvCell { name: cell_name, next, .. } => (&**cell_name == name, *next),
                obj => panic!("environment chain must hold cells, found {}", obj.type_name()),
            };
            if found {
                match self.heap.get_mut(cell) {
                    Obj::EnvCell { value: slot, .. } => *slot = value,
                    obj => panic!("environment chain must hold cells, found {}", obj.type_name()),
                }
                return Ok(());
            }
            cursor = next;
        }

        let head = self.env_head();
        self.heap.root(value)?;
        let cell = self.heap.alloc(Obj::EnvCell { name: name.into(),
                                                  value,
                                                  next: head })?;
        self.heap.unroot(value);
        match self.heap.get_mut(self.env) {
            Obj::Env { head } => *head = Some(cell),
            obj => panic!("environment root must be an environment, found {}", obj.type_name()),
        }
        Ok(())
    }

    fn env_head(&self) -> Option<Handle> {
        match self.heap.get(self.env) {
            Obj::Env { head } => *head,
            obj => panic!("environment root must be an environment, found {}", obj.type_name()),
        }
    }
}
