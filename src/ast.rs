use std::fmt::Write;

use crate::source::{Source, Span};

/// Represents a binary operator.
///
/// Binary operators cover arithmetic and comparisons. Comparisons are
/// non-associative: `a < b < c` is a parse error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition (`+`), also string concatenation.
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Equal to (`==`)
    Eq,
    /// Not equal to (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
}

impl BinaryOp {
    /// The uppercase name used by [`dump`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{operator}")
    }
}

/// An abstract syntax tree node representing an expression.
///
/// Expression nodes live in the parse arena and reference their
/// children through arena references, so the whole tree is freed as one
/// unit. Literal and name nodes carry only a [`Span`]; the lexeme is
/// recovered from the source, which must outlive the tree.
#[derive(Debug)]
pub enum Expr<'a> {
    /// An integer literal. The digits are parsed during evaluation, so
    /// an oversized literal is a runtime fault, not a parse error.
    IntLiteral {
        /// The span of the digits.
        span: Span,
    },
    /// A string literal. The span includes the surrounding quotes.
    StrLiteral {
        /// The span including both `"` characters.
        span: Span,
    },
    /// A list literal (e.g. `[1, 2, 3]`).
    ListLiteral {
        /// The element expressions, in source order.
        elements: &'a [&'a Expr<'a>],
        /// The span from `[` to `]` inclusive.
        span:     Span,
    },
    /// Reference to a variable by name.
    Name {
        /// The span of the identifier.
        span: Span,
    },
    /// A binary operation. Its extent is derived from the operands.
    Binary {
        /// Left operand.
        left:  &'a Expr<'a>,
        /// The operator.
        op:    BinaryOp,
        /// Right operand.
        right: &'a Expr<'a>,
    },
    /// A subscript expression (e.g. `a[i]`).
    Subscript {
        /// The subscripted expression.
        value: &'a Expr<'a>,
        /// The index expression.
        index: &'a Expr<'a>,
        /// Position one past the closing `]`.
        end:   usize,
    },
}

impl Expr<'_> {
    /// Byte offset where the expression begins.
    #[must_use]
    pub fn start(&self) -> usize {
        match self {
            Self::IntLiteral { span }
            | Self::StrLiteral { span }
            | Self::ListLiteral { span, .. }
            | Self::Name { span } => span.start,
            Self::Binary { left, .. } => left.start(),
            Self::Subscript { value, .. } => value.start(),
        }
    }

    /// Byte offset one past the end of the expression.
    #[must_use]
    pub fn end(&self) -> usize {
        match self {
            Self::IntLiteral { span }
            | Self::StrLiteral { span }
            | Self::ListLiteral { span, .. }
            | Self::Name { span } => span.end,
            Self::Binary { right, .. } => right.end(),
            Self::Subscript { end, .. } => *end,
        }
    }

    /// The full extent of the expression, used for diagnostics such as
    /// the invalid-assignment-target report.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start(), self.end())
    }
}

/// Represents a statement.
///
/// Statement sequences are arena slices executed in order. A missing
/// `else` branch is stored as an empty slice, which executes like an
/// explicit `pass`.
#[derive(Debug)]
pub enum Stmt<'a> {
    /// A standalone expression evaluated for its effect.
    Expr {
        /// The expression to evaluate.
        expr: &'a Expr<'a>,
    },
    /// An assignment. The parser guarantees that `target` is a `Name`
    /// or a `Subscript`.
    Assignment {
        /// The assignment target.
        target: &'a Expr<'a>,
        /// The assigned expression.
        value:  &'a Expr<'a>,
    },
    /// A `while` loop.
    While {
        /// The loop condition, re-evaluated before every iteration.
        condition: &'a Expr<'a>,
        /// The loop body.
        body:      &'a [Stmt<'a>],
    },
    /// An `if` statement. `elif` chains nest as a single `If` inside
    /// `else_body`.
    If {
        /// The branch condition.
        condition: &'a Expr<'a>,
        /// Statements executed when the condition holds.
        then_body: &'a [Stmt<'a>],
        /// Statements executed otherwise.
        else_body: &'a [Stmt<'a>],
    },
    /// A `pass` statement; does nothing.
    Pass,
    /// A `print(...)` statement.
    Print {
        /// The printed expression.
        expr: &'a Expr<'a>,
    },
}

/// Renders a statement sequence as an indented text tree.
///
/// The output starts with an `AST dump:` header, statements appear as
/// `STMT_*` lines and expressions as `EXPR_*` lines with their operands
/// nested two spaces deeper. Used by golden tests and emitted through
/// `tracing` at debug level after a successful parse.
#[must_use]
pub fn dump(source: &Source, stmts: &[Stmt]) -> String {
    let mut out = String::from("AST dump:\n");
    dump_stmts(&mut out, source, stmts, 2);
    out
}

fn dump_stmts(out: &mut String, source: &Source, stmts: &[Stmt], indent: usize) {
    for stmt in stmts {
        dump_stmt(out, source, stmt, indent);
    }
}

fn dump_stmt(out: &mut String, source: &Source, stmt: &Stmt, indent: usize) {
    let pad = " ".repeat(indent);
    match stmt {
        Stmt::Expr { expr } => {
            let _ = writeln!(out, "{pad}STMT_EXPR");
            dump_expr(out, source, expr, indent + 2, None);
        },
        Stmt::Assignment { target, value } => {
            let _ = writeln!(out, "{pad}STMT_ASSIGNMENT");
            dump_expr(out, source, target, indent + 2, Some("left"));
            dump_expr(out, source, value, indent + 2, Some("right"));
        },
        Stmt::While { condition, body } => {
            let _ = writeln!(out, "{pad}STMT_WHILE");
            dump_expr(out, source, condition, indent + 2, Some("condition"));
            let _ = writeln!(out, "{pad}  body:");
            dump_stmts(out, source, body, indent + 4);
        },
        Stmt::If { condition,
                   then_body,
                   else_body, } => {
            let _ = writeln!(out, "{pad}STMT_IF");
            dump_expr(out, source, condition, indent + 2, Some("condition"));
            let _ = writeln!(out, "{pad}  then_body:");
            dump_stmts(out, source, then_body, indent + 4);
            let _ = writeln!(out, "{pad}  else_body:");
            dump_stmts(out, source, else_body, indent + 4);
        },
        Stmt::Pass => {
            let _ = writeln!(out, "{pad}STMT_PASS");
        },
        Stmt::Print { expr } => {
            let _ = writeln!(out, "{pad}STMT_PRINT");
            dump_expr(out, source, expr, indent + 2, None);
        },
    }
}

fn dump_expr(out: &mut String, source: &Source, expr: &Expr, indent: usize, label: Option<&str>) {
    let pad = " ".repeat(indent);
    let _ = write!(out, "{pad}");
    if let Some(label) = label {
        let _ = write!(out, "{label}: ");
    }
    match expr {
        Expr::IntLiteral { span } => {
            let _ = writeln!(out, "EXPR_INT_LITERAL {{literal: {:?}}}", source.slice(*span));
        },
        Expr::StrLiteral { span } => {
            let _ = writeln!(out, "EXPR_STRING_LITERAL {{literal: {:?}}}", source.slice(*span));
        },
        Expr::ListLiteral { elements, .. } => {
            let _ = writeln!(out, "EXPR_LIST_LITERAL");
            for element in *elements {
                dump_expr(out, source, element, indent + 2, None);
            }
        },
        Expr::Name { span } => {
            let _ = writeln!(out, "EXPR_NAME {{identifier: {:?}}}", source.slice(*span));
        },
        Expr::Binary { left, op, right } => {
            let _ = writeln!(out, "EXPR_BINARY {{op: {}}}", op.name());
            dump_expr(out, source, left, indent + 2, Some("left"));
            dump_expr(out, source, right, indent + 2, Some("right"));
        },
        Expr::Subscript { value, index, .. } => {
            let _ = writeln!(out, "EXPR_SUBSCRIPT");
            dump_expr(out, source, value, indent + 2, Some("value"));
            dump_expr(out, source, index, indent + 2, Some("index"));
        },
    }
}
