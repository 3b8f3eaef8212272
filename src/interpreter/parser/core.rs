use tracing::{debug, enabled};

use crate::{ast::{self, Expr, Stmt},
            error::{DiagHandler, DiagKind},
            interpreter::lexer::{Lexer, Token, TokenKind},
            source::{Source, Span},
            util::arena::Arena};

/// Result type used throughout the parser.
///
/// The parser stops at the first problem: `None` means a diagnostic
/// has already been delivered to the handler and parsing must unwind.
pub type ParseResult<T> = Option<T>;

/// Parses a whole source file into a statement sequence.
///
/// AST nodes are allocated in `arena` and reference `source` through
/// spans, so both must outlive the returned slice. Diagnostics are
/// delivered through `handler`; on the first one, parsing stops and
/// `None` is returned. A successful parse emits no diagnostics and
/// yields at least one statement.
///
/// # Parameters
/// - `arena`: Arena receiving all AST nodes.
/// - `source`: Normalized source code.
/// - `handler`: Sink for diagnostics.
///
/// # Returns
/// The parsed statements, or `None` if a diagnostic was reported.
pub fn parse<'a, H>(arena: &'a Arena,
                    source: &Source,
                    handler: &mut H)
                    -> ParseResult<&'a [Stmt<'a>]>
    where H: DiagHandler + ?Sized
{
    let mut lexer = Lexer::new(source.text());
    let current = lexer.next_token();
    let mut parser = Parser { arena,
                              source,
                              handler,
                              lexer,
                              current };

    let result = parser.statements(TokenKind::Eof);
    debug_assert!(result.is_none() || parser.current.kind == TokenKind::Eof);

    if let Some(stmts) = result
       && enabled!(target: "natrix::parser", tracing::Level::DEBUG)
    {
        for line in ast::dump(source, stmts).lines() {
            debug!(target: "natrix::parser", "{line}");
        }
    }
    result
}

/// Internal state of the parser: the token source, a single token of
/// lookahead, and the destinations for nodes and diagnostics.
pub(in crate::interpreter::parser) struct Parser<'a, 's, H: ?Sized> {
    pub(in crate::interpreter::parser) arena:   &'a Arena,
    pub(in crate::interpreter::parser) source:  &'s Source,
    pub(in crate::interpreter::parser) handler: &'s mut H,
    pub(in crate::interpreter::parser) lexer:   Lexer<'s>,
    pub(in crate::interpreter::parser) current: Token,
}

impl<'a, H: DiagHandler + ?Sized> Parser<'a, '_, H> {
    /// Reports an error at the current token.
    ///
    /// When the current token is a lexer error, the lexer's message
    /// replaces the given one so the user sees the lexical reason.
    pub(in crate::interpreter::parser) fn error(&mut self, message: &str) {
        let message = if self.current.kind == TokenKind::Error {
            self.lexer.error_message().unwrap_or(message)
        } else {
            message
        };
        self.handler
            .report(self.source, DiagKind::Error, self.current.span, message);
    }

    /// Consumes the current token and advances to the next one.
    pub(in crate::interpreter::parser) fn consume(&mut self) -> Token {
        debug_assert!(self.current.kind != TokenKind::Error
                      && self.current.kind != TokenKind::Eof);
        let token = self.current;
        self.current = self.lexer.next_token();
        token
    }

    /// Whether the current token has the given kind.
    pub(in crate::interpreter::parser) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes the current token if it has the expected kind,
    /// otherwise reports `message` at it.
    pub(in crate::interpreter::parser) fn expect(&mut self,
                                                 kind: TokenKind,
                                                 message: &str)
                                                 -> ParseResult<Token> {
        if self.current.kind != kind {
            self.error(message);
            return None;
        }
        Some(self.consume())
    }

    /// Parses a full expression.
    ///
    /// Grammar: `expr := rel_expr`
    pub(in crate::interpreter::parser) fn expression(&mut self) -> ParseResult<&'a Expr<'a>> {
        self.relational_expr()
    }

    /// Parses a primary expression.
    ///
    /// Grammar:
    /// ```text
    /// primary := INT_LITERAL | STRING_LITERAL | IDENTIFIER
    ///          | '(' expr ')'
    ///          | '[' (expr (',' expr)* ','?)? ']'
    /// ```
    pub(in crate::interpreter::parser) fn primary(&mut self) -> ParseResult<&'a Expr<'a>> {
        match self.current.kind {
            TokenKind::IntLiteral => {
                let token = self.consume();
                Some(self.arena.alloc(Expr::IntLiteral { span: token.span }))
            },
            TokenKind::StringLiteral => {
                let token = self.consume();
                Some(self.arena.alloc(Expr::StrLiteral { span: token.span }))
            },
            TokenKind::Identifier => {
                let token = self.consume();
                Some(self.arena.alloc(Expr::Name { span: token.span }))
            },
            TokenKind::LParen => {
                self.consume();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected closing parenthesis")?;
                Some(expr)
            },
            TokenKind::LBracket => self.list_literal(),
            _ => {
                self.error("expected expression");
                None
            },
        }
    }

    /// Parses a list literal, the `[` being the current token. A
    /// trailing comma before the closing bracket is allowed.
    fn list_literal(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.consume().span.start;
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.consume();
                if self.check(TokenKind::RBracket) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBracket, "expected closing bracket")?.span.end;
        let elements = self.arena.alloc_slice(elements);
        Some(self.arena.alloc(Expr::ListLiteral { elements,
                                                  span: Span::new(start, end) }))
    }

    /// Parses a postfix expression: a primary followed by any number
    /// of subscripts.
    ///
    /// Grammar: `postfix_expr := primary ('[' expr ']')*`
    pub(in crate::interpreter::parser) fn postfix_expr(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut result = self.primary()?;
        while self.check(TokenKind::LBracket) {
            self.consume();
            let index = self.expression()?;
            let end_token = self.expect(TokenKind::RBracket, "expected closing bracket")?;
            result = self.arena.alloc(Expr::Subscript { value: result,
                                                        index,
                                                        end: end_token.span.end });
        }
        Some(result)
    }
}
