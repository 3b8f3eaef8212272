use crate::{ast::{Expr, Stmt},
            error::{DiagHandler, DiagKind},
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser}}};

impl<'a, H: DiagHandler + ?Sized> Parser<'a, '_, H> {
    /// Parses a sequence of statements ending at `sentinel` (`EOF` for
    /// a file, `DEDENT` for a block). At least one statement is
    /// required.
    ///
    /// Grammar: `statements := statement+`
    pub(in crate::interpreter::parser) fn statements(&mut self,
                                                     sentinel: TokenKind)
                                                     -> ParseResult<&'a [Stmt<'a>]> {
        let mut stmts = vec![self.statement()?];
        while self.current.kind != sentinel {
            stmts.push(self.statement()?);
        }
        Some(self.arena.alloc_slice(stmts))
    }

    /// Parses one statement.
    ///
    /// Grammar:
    /// ```text
    /// statement := 'while' expr ':' block
    ///            | 'if' expr ':' block (elif_block | else_block)?
    ///            | simple_stmt NEWLINE
    /// ```
    pub(in crate::interpreter::parser) fn statement(&mut self) -> ParseResult<Stmt<'a>> {
        match self.current.kind {
            TokenKind::KwWhile => self.while_stmt(),
            TokenKind::KwIf => self.if_stmt(),
            _ => {
                let stmt = self.simple_stmt()?;
                self.expect(TokenKind::Newline, "expected end of line")?;
                Some(stmt)
            },
        }
    }

    /// Parses a statement that fits on a single line.
    ///
    /// Grammar:
    /// ```text
    /// simple_stmt := 'print' '(' expr ')' | 'pass'
    ///              | expr '=' expr | expr
    /// ```
    fn simple_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        match self.current.kind {
            TokenKind::KwPrint => {
                self.consume();
                self.expect(TokenKind::LParen, "expected '('")?;
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                Some(Stmt::Print { expr })
            },
            TokenKind::KwPass => {
                self.consume();
                Some(Stmt::Pass)
            },
            _ => {
                let expr = self.expression()?;
                if !self.check(TokenKind::Equals) {
                    return Some(Stmt::Expr { expr });
                }
                if !matches!(expr, Expr::Name { .. } | Expr::Subscript { .. }) {
                    self.handler.report(self.source,
                                        DiagKind::Error,
                                        expr.span(),
                                        "cannot assign to expression here");
                    return None;
                }
                self.consume();
                let value = self.expression()?;
                Some(Stmt::Assignment { target: expr, value })
            },
        }
    }
}
