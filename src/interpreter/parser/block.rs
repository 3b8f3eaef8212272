use crate::{ast::Stmt,
            error::DiagHandler,
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser}}};

impl<'a, H: DiagHandler + ?Sized> Parser<'a, '_, H> {
    /// Parses an indented block.
    ///
    /// Grammar: `block := NEWLINE INDENT statements DEDENT`
    pub(in crate::interpreter::parser) fn block(&mut self) -> ParseResult<&'a [Stmt<'a>]> {
        self.expect(TokenKind::Newline, "newline expected")?;
        self.expect(TokenKind::Indent, "indent expected")?;
        let stmts = self.statements(TokenKind::Dedent)?;
        self.consume();
        Some(stmts)
    }

    /// Parses a `while` statement, the keyword being the current
    /// token.
    ///
    /// Grammar: `'while' expr ':' block`
    pub(in crate::interpreter::parser) fn while_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        self.consume();
        let condition = self.expression()?;
        self.expect(TokenKind::Colon, "expected ':'")?;
        let body = self.block()?;
        Some(Stmt::While { condition, body })
    }

    /// Parses an `if` statement with its `elif`/`else` tail, the `if`
    /// keyword being the current token.
    ///
    /// Grammar: `'if' expr ':' block (elif_block | else_block)?`
    pub(in crate::interpreter::parser) fn if_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        self.consume();
        let condition = self.expression()?;
        self.expect(TokenKind::Colon, "expected ':'")?;
        let then_body = self.block()?;
        let else_body = self.else_tail()?;
        Some(Stmt::If { condition,
                        then_body,
                        else_body })
    }

    /// Parses the `elif`/`else` continuation of an `if` statement.
    ///
    /// An `elif` becomes a nested single-statement `If` in the else
    /// branch; a missing tail becomes an empty branch, which executes
    /// like `pass`.
    fn else_tail(&mut self) -> ParseResult<&'a [Stmt<'a>]> {
        match self.current.kind {
            TokenKind::KwElif => {
                self.consume();
                let condition = self.expression()?;
                self.expect(TokenKind::Colon, "expected ':'")?;
                let then_body = self.block()?;
                let else_body = self.else_tail()?;
                let nested = Stmt::If { condition,
                                        then_body,
                                        else_body };
                Some(self.arena.alloc_slice(vec![nested]))
            },
            TokenKind::KwElse => {
                self.consume();
                self.expect(TokenKind::Colon, "expected ':'")?;
                self.block()
            },
            _ => Some(&[]),
        }
    }
}
