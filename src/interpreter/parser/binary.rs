use crate::{ast::{BinaryOp, Expr},
            error::DiagHandler,
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser}}};

impl<'a, H: DiagHandler + ?Sized> Parser<'a, '_, H> {
    /// Parses a multiplicative expression.
    ///
    /// Grammar: `mul_expr := postfix_expr (('*' | '/') postfix_expr)*`
    pub(in crate::interpreter::parser) fn multiplicative_expr(&mut self)
                                                              -> ParseResult<&'a Expr<'a>> {
        let mut result = self.postfix_expr()?;
        while matches!(self.current.kind, TokenKind::Star | TokenKind::Slash) {
            let op = if self.current.kind == TokenKind::Star {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            self.consume();
            let right = self.postfix_expr()?;
            result = self.arena.alloc(Expr::Binary { left: result,
                                                     op,
                                                     right });
        }
        Some(result)
    }

    /// Parses an additive expression.
    ///
    /// Grammar: `add_expr := mul_expr (('+' | '-') mul_expr)*`
    pub(in crate::interpreter::parser) fn additive_expr(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut result = self.multiplicative_expr()?;
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.current.kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            self.consume();
            let right = self.multiplicative_expr()?;
            result = self.arena.alloc(Expr::Binary { left: result,
                                                     op,
                                                     right });
        }
        Some(result)
    }

    /// Parses a relational expression.
    ///
    /// The relational level is deliberately non-associative, so at
    /// most one comparison operator is accepted: `a < b < c` fails at
    /// the second `<` with "expected end of line".
    ///
    /// Grammar:
    /// `rel_expr := add_expr (('==' | '!=' | '<' | '<=' | '>' | '>=') add_expr)?`
    pub(in crate::interpreter::parser) fn relational_expr(&mut self) -> ParseResult<&'a Expr<'a>> {
        let result = self.additive_expr()?;
        let op = match self.current.kind {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            _ => return Some(result),
        };
        self.consume();
        let right = self.additive_expr()?;
        Some(self.arena.alloc(Expr::Binary { left: result,
                                             op,
                                             right }))
    }
}
