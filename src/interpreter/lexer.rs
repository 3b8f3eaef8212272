use tracing::trace;

use crate::source::Span;

/// Maximum number of simultaneously open indentation levels.
pub const MAX_INDENT_STACK: usize = 64;

/// Represents a lexical token kind.
///
/// A token is a minimal but meaningful unit of text produced by the
/// lexer. Besides the textual tokens, the lexer synthesizes the virtual
/// `Newline`/`Indent`/`Dedent` tokens that delimit statements and
/// blocks, a repeatable `Eof`, and a single `Error` token after which
/// it must not be called again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One or more decimal digits, e.g. `42`.
    IntLiteral,
    /// A double-quoted string on a single line, quotes included.
    StringLiteral,
    /// A name such as `x` or `_count2`.
    Identifier,
    /// `if`
    KwIf,
    /// `elif`
    KwElif,
    /// `else`
    KwElse,
    /// `while`
    KwWhile,
    /// `print`
    KwPrint,
    /// `pass`
    KwPass,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `=`
    Equals,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// End of a non-empty line. When the line ends in a comment the
    /// token starts at the `#`, so diagnostics anchored to the line end
    /// point at the comment rather than past it.
    Newline,
    /// The line is indented deeper than the previous one; spans the
    /// additional whitespace.
    Indent,
    /// The line returns to an enclosing indentation level. Several
    /// dedents may be produced at once.
    Dedent,
    /// End of input; returned repeatedly once reached.
    Eof,
    /// A lexical error; [`Lexer::error_message`] holds the reason.
    Error,
}

impl TokenKind {
    /// The uppercase name used when rendering tokens.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IntLiteral => "INT_LITERAL",
            Self::StringLiteral => "STRING_LITERAL",
            Self::Identifier => "IDENTIFIER",
            Self::KwIf => "KW_IF",
            Self::KwElif => "KW_ELIF",
            Self::KwElse => "KW_ELSE",
            Self::KwWhile => "KW_WHILE",
            Self::KwPrint => "KW_PRINT",
            Self::KwPass => "KW_PASS",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::LBracket => "LBRACKET",
            Self::RBracket => "RBRACKET",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Equals => "EQUALS",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Newline => "NEWLINE",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::Eof => "EOF",
            Self::Error => "ERROR",
        }
    }
}

/// A token: its kind plus the covered slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The covered source range. Empty for `Eof` and pending `Dedent`s.
    pub span: Span,
}

impl Token {
    /// Renders the token as `NAME("lexeme")` with an escaped lexeme,
    /// given the text the span points into.
    #[must_use]
    pub fn describe(&self, text: &str) -> String {
        format!("{}({:?})", self.kind.name(), &text[self.span.start..self.span.end])
    }
}

/// The indentation-aware lexer.
///
/// The lexer requires normalized input: no `\r` and a final `\n`
/// (guaranteed by [`crate::source::Source`]). It keeps a stack of open
/// indentation widths; when a line starts at a new width it emits
/// `Indent` or one `Dedent` per closed level, the surplus being
/// delivered on subsequent calls. Lines containing only whitespace and
/// comments produce no tokens at all.
///
/// After an `Error` token has been returned the lexer must not be
/// called again; the parser aborts on the first diagnostic, which
/// upholds this.
pub struct Lexer<'src> {
    text:            &'src str,
    start:           usize,
    current:         usize,
    indent_stack:    [usize; MAX_INDENT_STACK],
    indent_top:      usize,
    pending_dedents: usize,
    empty_line:      bool,
    error_message:   Option<&'static str>,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over normalized source text.
    #[must_use]
    pub fn new(text: &'src str) -> Self {
        debug_assert!(text.ends_with('\n'), "source text must be normalized");
        Self { text,
               start: 0,
               current: 0,
               indent_stack: [0; MAX_INDENT_STACK],
               indent_top: 0,
               pending_dedents: 0,
               empty_line: true,
               error_message: None }
    }

    /// The reason for a previously returned `Error` token.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error_message
    }

    /// Produces the next token.
    ///
    /// Pending dedents are delivered first; afterwards one token is
    /// scanned, skipping lines that contain no tokens.
    pub fn next_token(&mut self) -> Token {
        debug_assert!(self.error_message.is_none(),
                      "the lexer must not be called after an error");
        loop {
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return self.make_token(TokenKind::Dedent);
            }
            let kind = self.parse_token();
            if kind == TokenKind::Newline && self.empty_line {
                // The line held only whitespace and comments.
                continue;
            }
            self.empty_line = kind == TokenKind::Newline;
            return self.make_token(kind);
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let token = Token { kind,
                            span: Span::new(self.start, self.current) };
        trace!(target: "natrix::lexer", "{}", token.describe(self.text));
        token
    }

    /// The byte at the cursor, with `0` standing in for end of input.
    fn peek(&self) -> u8 {
        self.text.as_bytes().get(self.current).copied().unwrap_or(0)
    }

    fn error(&mut self, message: &'static str) -> TokenKind {
        self.error_message = Some(message);
        TokenKind::Error
    }

    /// Scans one token, handling the start-of-line indentation check
    /// first when the previous token ended a line.
    fn parse_token(&mut self) -> TokenKind {
        debug_assert_eq!(self.pending_dedents, 0);
        if self.empty_line {
            let mut indent = 0;
            while self.peek() == b' ' {
                self.current += 1;
                indent += 1;
            }
            let next = self.peek();
            if next != b'#' && next != b'\n' && indent != self.indent_stack[self.indent_top] {
                return self.handle_indentation_change(indent);
            }
        }

        self.skip_whitespace();
        if self.peek().is_ascii_digit() {
            while self.peek().is_ascii_digit() {
                self.current += 1;
            }
            return TokenKind::IntLiteral;
        }
        if self.peek().is_ascii_alphabetic() || self.peek() == b'_' {
            while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
                self.current += 1;
            }
            return keyword_or_identifier(&self.text[self.start..self.current]);
        }
        let byte = self.peek();
        self.current += 1;
        match byte {
            0 => {
                // Rewind so that `Eof` is returned on subsequent calls.
                self.current -= 1;
                TokenKind::Eof
            },
            b'\n' => TokenKind::Newline,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'=' => {
                if self.peek() == b'=' {
                    self.current += 1;
                    TokenKind::Eq
                } else {
                    TokenKind::Equals
                }
            },
            b'!' => {
                if self.peek() == b'=' {
                    self.current += 1;
                    TokenKind::Ne
                } else {
                    self.error("invalid syntax")
                }
            },
            b'<' => {
                if self.peek() == b'=' {
                    self.current += 1;
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            },
            b'>' => {
                if self.peek() == b'=' {
                    self.current += 1;
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            },
            b'"' => {
                // todo escape sequences
                loop {
                    match self.peek() {
                        b'"' => {
                            self.current += 1;
                            return TokenKind::StringLiteral;
                        },
                        b'\n' => return self.error("unterminated string"),
                        _ => self.current += 1,
                    }
                }
            },
            _ => {
                // Consume the rest of a multi-byte character so the
                // error span stays on a character boundary.
                while !self.text.is_char_boundary(self.current) {
                    self.current += 1;
                }
                self.error("unexpected character")
            },
        }
    }

    /// Skips spaces and comments and records the token start.
    ///
    /// A comment is folded into the trailing `Newline` token: the token
    /// start is moved back to the `#`, which keeps diagnostics like
    /// "expected closing parenthesis" anchored to a visible position.
    fn skip_whitespace(&mut self) {
        while self.peek() == b' ' {
            self.current += 1;
        }
        self.start = self.current;
        if self.peek() == b'#' {
            while self.peek() != b'\n' {
                debug_assert!(self.current < self.text.len(),
                              "source text must end with a newline");
                self.current += 1;
            }
        }
    }

    /// Compares the indentation of a fresh line with the stack and
    /// emits `Indent` or the first of possibly several `Dedent`s.
    fn handle_indentation_change(&mut self, indent: usize) -> TokenKind {
        let last_indent = self.indent_stack[self.indent_top];
        if indent > last_indent {
            self.start = self.current - indent + last_indent;
            if self.indent_top + 1 == MAX_INDENT_STACK {
                return self.error("too many indentation levels");
            }
            self.indent_top += 1;
            self.indent_stack[self.indent_top] = indent;
            TokenKind::Indent
        } else {
            debug_assert!(indent < last_indent);
            debug_assert_eq!(self.pending_dedents, 0);
            self.start = self.current - indent;
            while self.indent_top > 0 && indent < self.indent_stack[self.indent_top] {
                self.pending_dedents += 1;
                self.indent_top -= 1;
            }
            if indent != self.indent_stack[self.indent_top] {
                return self.error("unindent does not match any outer indentation level");
            }
            self.pending_dedents -= 1;
            TokenKind::Dedent
        }
    }
}

/// Resolves an identifier lexeme against the keyword table.
fn keyword_or_identifier(lexeme: &str) -> TokenKind {
    match lexeme {
        "if" => TokenKind::KwIf,
        "elif" => TokenKind::KwElif,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "print" => TokenKind::KwPrint,
        "pass" => TokenKind::KwPass,
        _ => TokenKind::Identifier,
    }
}
