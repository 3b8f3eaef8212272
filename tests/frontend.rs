use natrix::{ast,
             error::{CollectingHandler, DiagKind, diag::render},
             interpreter::{lexer::{Lexer, Token, TokenKind},
                           parser::parse},
             source::{Source, Span},
             util::arena::Arena};

// ---------------------------------------------------------------------
// Source normalization and line index
// ---------------------------------------------------------------------

#[test]
fn normalize_string() {
    let source = Source::from_string("<string>", "a\nb\rc\r\r\nd");
    assert_eq!(source.filename(), "<string>");
    assert_eq!(source.text(), "a\nb\nc\n\nd\n");
}

#[test]
fn normalize_empty_string() {
    let source = Source::from_string("<string>", "");
    assert_eq!(source.text(), "\n");
    assert_eq!(source.line_count(), 2);
}

#[test]
fn normalize_keeps_trailing_newline() {
    assert_eq!(Source::from_string("<string>", "abc\n").text(), "abc\n");
    assert_eq!(Source::from_string("<string>", "abc\r").text(), "abc\n");
    assert_eq!(Source::from_string("<string>", "abc").text(), "abc\n");
}

#[test]
fn normalization_leaves_no_carriage_returns() {
    let inputs = ["\r", "\r\n", "a\r\rb", "\r\r\n\r", "x\r\ny\rz"];
    for input in inputs {
        let source = Source::from_string("<string>", input);
        assert!(!source.text().contains('\r'), "input: {input:?}");
        assert!(source.text().ends_with('\n'), "input: {input:?}");
        let newlines = source.text().bytes().filter(|&b| b == b'\n').count();
        assert_eq!(source.line_count(), newlines + 1, "input: {input:?}");
    }
}

#[test]
fn line_numbers() {
    let source = Source::from_string("<string>", "\na\nb\n\nc\n");
    assert_eq!(source.line_count(), 6);
    let expected = [1, 2, 2, 3, 3, 4, 5, 5, 6];
    for (pos, line) in expected.into_iter().enumerate() {
        assert_eq!(source.line_number(pos), line, "pos {pos}");
    }
}

#[test]
fn line_starts_and_ends() {
    let source = Source::from_string("<string>", "\na\nb\n\nc\n");
    let expected = [(0, 0), (1, 2), (3, 4), (5, 5), (6, 7), (8, 8)];
    for (line, (start, end)) in expected.into_iter().enumerate() {
        let line = line + 1;
        assert_eq!(source.line_start(line), start, "line {line}");
        assert_eq!(source.line_end(line), end, "line {line}");
    }
}

#[test]
fn line_index_brackets_every_position() {
    let source = Source::from_string("<string>", "first\nsecond\n\nlast one\n");
    for pos in 0..=source.text().len() {
        let line = source.line_number(pos);
        assert!(source.line_start(line) <= pos, "pos {pos}");
        assert!(pos <= source.line_end(line), "pos {pos}");
    }
}

// ---------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------

/// Collects tokens until (and including) the first `Eof` or `Error`.
fn lex(text: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let kind = token.kind;
        tokens.push(token);
        if kind == TokenKind::Eof || kind == TokenKind::Error {
            return tokens;
        }
    }
}

fn assert_tokens(text: &str, expected: &[(TokenKind, &str)]) {
    let tokens = lex(text);
    let actual: Vec<(TokenKind, &str)> =
        tokens.iter()
              .map(|t| (t.kind, &text[t.span.start..t.span.end]))
              .collect();
    assert_eq!(actual, expected, "text: {text:?}");
}

#[test]
fn lex_empty_source() {
    let mut lexer = Lexer::new("\n");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.error_message(), None);
}

#[test]
fn lex_comment_only_lines() {
    assert_tokens("# comment\n", &[(TokenKind::Eof, "")]);
    assert_tokens("    # comment\n", &[(TokenKind::Eof, "")]);
}

#[test]
fn lex_comment_folds_into_newline() {
    assert_tokens("42    # comment\n",
                  &[(TokenKind::IntLiteral, "42"),
                    (TokenKind::Newline, "# comment\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_symbols_with_comment_on_next_line() {
    assert_tokens("/-\n# comment\n",
                  &[(TokenKind::Slash, "/"),
                    (TokenKind::Minus, "-"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_simple_expression() {
    assert_tokens("(_x2 + 10) * 3\n",
                  &[(TokenKind::LParen, "("),
                    (TokenKind::Identifier, "_x2"),
                    (TokenKind::Plus, "+"),
                    (TokenKind::IntLiteral, "10"),
                    (TokenKind::RParen, ")"),
                    (TokenKind::Star, "*"),
                    (TokenKind::IntLiteral, "3"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_compound_operators() {
    assert_tokens("a == b != c <= d >= e < f > g = h\n",
                  &[(TokenKind::Identifier, "a"),
                    (TokenKind::Eq, "=="),
                    (TokenKind::Identifier, "b"),
                    (TokenKind::Ne, "!="),
                    (TokenKind::Identifier, "c"),
                    (TokenKind::Le, "<="),
                    (TokenKind::Identifier, "d"),
                    (TokenKind::Ge, ">="),
                    (TokenKind::Identifier, "e"),
                    (TokenKind::Lt, "<"),
                    (TokenKind::Identifier, "f"),
                    (TokenKind::Gt, ">"),
                    (TokenKind::Identifier, "g"),
                    (TokenKind::Equals, "="),
                    (TokenKind::Identifier, "h"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_string_literals() {
    assert_tokens("\"hi\" + \"\"\n",
                  &[(TokenKind::StringLiteral, "\"hi\""),
                    (TokenKind::Plus, "+"),
                    (TokenKind::StringLiteral, "\"\""),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_unterminated_string() {
    let mut lexer = Lexer::new("\"abc\n");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(lexer.error_message(), Some("unterminated string"));
}

#[test]
fn lex_unexpected_character() {
    let mut lexer = Lexer::new("4  `\n");
    assert_eq!(lexer.next_token().kind, TokenKind::IntLiteral);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.span, Span::new(3, 4));
    assert_eq!(lexer.error_message(), Some("unexpected character"));
}

#[test]
fn lex_lone_bang() {
    let mut lexer = Lexer::new("!\n");
    assert_eq!(lexer.next_token().kind, TokenKind::Error);
    assert_eq!(lexer.error_message(), Some("invalid syntax"));
}

#[test]
fn lex_keywords_versus_identifiers() {
    assert_tokens("i if ifi else elif elif1\n",
                  &[(TokenKind::Identifier, "i"),
                    (TokenKind::KwIf, "if"),
                    (TokenKind::Identifier, "ifi"),
                    (TokenKind::KwElse, "else"),
                    (TokenKind::KwElif, "elif"),
                    (TokenKind::Identifier, "elif1"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
    assert_tokens("while print pass\n",
                  &[(TokenKind::KwWhile, "while"),
                    (TokenKind::KwPrint, "print"),
                    (TokenKind::KwPass, "pass"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_indentation() {
    assert_tokens("1\n  2\n   3\n   4  #comment\n      # empty line\n\n5 \n",
                  &[(TokenKind::IntLiteral, "1"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Indent, "  "),
                    (TokenKind::IntLiteral, "2"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Indent, " "),
                    (TokenKind::IntLiteral, "3"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::IntLiteral, "4"),
                    (TokenKind::Newline, "#comment\n"),
                    (TokenKind::Dedent, ""),
                    (TokenKind::Dedent, ""),
                    (TokenKind::IntLiteral, "5"),
                    (TokenKind::Newline, "\n"),
                    (TokenKind::Eof, "")]);
}

#[test]
fn lex_dedent_mismatch() {
    let mut lexer = Lexer::new("1\n  2\n 3\n");
    let kinds = [TokenKind::IntLiteral,
                 TokenKind::Newline,
                 TokenKind::Indent,
                 TokenKind::IntLiteral,
                 TokenKind::Newline];
    for kind in kinds {
        assert_eq!(lexer.next_token().kind, kind);
    }
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(lexer.error_message(),
               Some("unindent does not match any outer indentation level"));
}

#[test]
fn lex_too_many_indentation_levels() {
    // Each line one space deeper than the previous; level 64 overflows
    // the stack.
    let mut text = String::new();
    for depth in 0..65 {
        text.push_str(&" ".repeat(depth));
        text.push_str("x\n");
    }
    let mut lexer = Lexer::new(&text);
    let mut last = lexer.next_token();
    while last.kind != TokenKind::Eof && last.kind != TokenKind::Error {
        last = lexer.next_token();
    }
    assert_eq!(last.kind, TokenKind::Error);
    assert_eq!(lexer.error_message(), Some("too many indentation levels"));
}

#[test]
fn indents_and_dedents_balance() {
    let scripts = ["a\n",
                   "if a:\n  b\n",
                   "if a:\n  if b:\n    c\n  d\ne\n",
                   "while a:\n    b\n    while c:\n            d\ne\n"];
    for script in scripts {
        let tokens = lex(script);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof), "script: {script:?}");
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, dedents, "script: {script:?}");
    }
}

#[test]
fn lexemes_form_a_subsequence_of_the_source() {
    let script = "x = [1, 2]\nif x[0] < 2:\n  print(\"ok\")  # done\n";
    let bytes = script.as_bytes();
    let mut pos = 0;
    for token in lex(script) {
        if matches!(token.kind, TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof) {
            continue;
        }
        let lexeme = &bytes[token.span.start..token.span.end];
        for &byte in lexeme {
            while bytes[pos] != byte {
                pos += 1;
            }
            pos += 1;
        }
    }
}

#[test]
fn token_rendering() {
    let text = "42\n";
    let mut lexer = Lexer::new(text);
    let token = lexer.next_token();
    assert_eq!(token.describe(text), "INT_LITERAL(\"42\")");
    assert_eq!(lexer.next_token().describe(text), "NEWLINE(\"\\n\")");
}

// ---------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------

fn parse_and_dump(text: &str) -> String {
    let source = Source::from_string("<string>", text);
    let arena = Arena::new();
    let mut handler = CollectingHandler::new();
    let stmts = parse(&arena, &source, &mut handler);
    match stmts {
        Some(stmts) => {
            assert!(handler.messages.is_empty(), "unexpected diagnostics: {:?}", handler.messages);
            ast::dump(&source, stmts)
        },
        None => panic!("parse failed: {:?}", handler.messages),
    }
}

fn parse_and_capture_diag(text: &str) -> String {
    let source = Source::from_string("<string>", text);
    let arena = Arena::new();
    let mut handler = CollectingHandler::new();
    let stmts = parse(&arena, &source, &mut handler);
    assert!(stmts.is_none(), "parse unexpectedly succeeded");
    assert_eq!(handler.messages.len(), 1, "diagnostics: {:?}", handler.messages);
    handler.messages.remove(0)
}

#[test]
fn parse_simple_expression() {
    assert_eq!(parse_and_dump("(10 - 3) * 6\n1\n"),
               "AST dump:\n\
                \x20 STMT_EXPR\n\
                \x20   EXPR_BINARY {op: MUL}\n\
                \x20     left: EXPR_BINARY {op: SUB}\n\
                \x20       left: EXPR_INT_LITERAL {literal: \"10\"}\n\
                \x20       right: EXPR_INT_LITERAL {literal: \"3\"}\n\
                \x20     right: EXPR_INT_LITERAL {literal: \"6\"}\n\
                \x20 STMT_EXPR\n\
                \x20   EXPR_INT_LITERAL {literal: \"1\"}\n");
}

#[test]
fn parse_statements_and_blocks() {
    assert_eq!(parse_and_dump("while n > 0:\n  pass\n"),
               "AST dump:\n\
                \x20 STMT_WHILE\n\
                \x20   condition: EXPR_BINARY {op: GT}\n\
                \x20     left: EXPR_NAME {identifier: \"n\"}\n\
                \x20     right: EXPR_INT_LITERAL {literal: \"0\"}\n\
                \x20   body:\n\
                \x20     STMT_PASS\n");
    assert_eq!(parse_and_dump("a[0] = \"x\"\nprint(a[0])\n"),
               "AST dump:\n\
                \x20 STMT_ASSIGNMENT\n\
                \x20   left: EXPR_SUBSCRIPT\n\
                \x20     value: EXPR_NAME {identifier: \"a\"}\n\
                \x20     index: EXPR_INT_LITERAL {literal: \"0\"}\n\
                \x20   right: EXPR_STRING_LITERAL {literal: \"\\\"x\\\"\"}\n\
                \x20 STMT_PRINT\n\
                \x20   EXPR_SUBSCRIPT\n\
                \x20     value: EXPR_NAME {identifier: \"a\"}\n\
                \x20     index: EXPR_INT_LITERAL {literal: \"0\"}\n");
}

#[test]
fn parse_if_elif_else_nests() {
    assert_eq!(parse_and_dump("if a:\n  pass\nelif b:\n  pass\nelse:\n  1\n"),
               "AST dump:\n\
                \x20 STMT_IF\n\
                \x20   condition: EXPR_NAME {identifier: \"a\"}\n\
                \x20   then_body:\n\
                \x20     STMT_PASS\n\
                \x20   else_body:\n\
                \x20     STMT_IF\n\
                \x20       condition: EXPR_NAME {identifier: \"b\"}\n\
                \x20       then_body:\n\
                \x20         STMT_PASS\n\
                \x20       else_body:\n\
                \x20         STMT_EXPR\n\
                \x20           EXPR_INT_LITERAL {literal: \"1\"}\n");
}

#[test]
fn parse_list_literals() {
    assert_eq!(parse_and_dump("[1, [2, 3], \"x\",]\n"),
               "AST dump:\n\
                \x20 STMT_EXPR\n\
                \x20   EXPR_LIST_LITERAL\n\
                \x20     EXPR_INT_LITERAL {literal: \"1\"}\n\
                \x20     EXPR_LIST_LITERAL\n\
                \x20       EXPR_INT_LITERAL {literal: \"2\"}\n\
                \x20       EXPR_INT_LITERAL {literal: \"3\"}\n\
                \x20     EXPR_STRING_LITERAL {literal: \"\\\"x\\\"\"}\n");
}

#[test]
fn binary_operators_render_their_symbol() {
    use natrix::ast::BinaryOp;
    let cases = [(BinaryOp::Add, "+", "ADD"),
                 (BinaryOp::Div, "/", "DIV"),
                 (BinaryOp::Le, "<=", "LE"),
                 (BinaryOp::Ne, "!=", "NE")];
    for (op, symbol, name) in cases {
        assert_eq!(op.to_string(), symbol);
        assert_eq!(op.name(), name);
    }
}

#[test]
fn diag_invalid_token() {
    assert_eq!(parse_and_capture_diag("(10 - 3) ` 6\n1\n"),
               "error: 1:10-1: unexpected character");
}

#[test]
fn diag_missing_paren_points_at_comment() {
    assert_eq!(parse_and_capture_diag("\n(10 - 3   # comment\n"),
               "error: 2:11-10: expected closing parenthesis");
}

#[test]
fn diag_expected_expression() {
    assert_eq!(parse_and_capture_diag("\n(10 -\n"), "error: 2:6-1: expected expression");
}

#[test]
fn diag_missing_colon() {
    assert_eq!(parse_and_capture_diag("while 1\n  pass\n"), "error: 1:8-1: expected ':'");
}

#[test]
fn diag_block_structure() {
    assert_eq!(parse_and_capture_diag("if 1: pass\n"), "error: 1:7-4: newline expected");
    assert_eq!(parse_and_capture_diag("if 1:\npass\n"), "error: 2:1-4: indent expected");
}

#[test]
fn diag_missing_bracket() {
    assert_eq!(parse_and_capture_diag("a[1\n"), "error: 1:4-1: expected closing bracket");
    assert_eq!(parse_and_capture_diag("[1, 2\n"), "error: 1:6-1: expected closing bracket");
}

#[test]
fn diag_print_parentheses() {
    assert_eq!(parse_and_capture_diag("print 1\n"), "error: 1:7-1: expected '('");
    assert_eq!(parse_and_capture_diag("print(1 2\n"), "error: 1:9-1: expected ')'");
}

// ---------------------------------------------------------------------
// Diagnostic rendering
// ---------------------------------------------------------------------

#[test]
fn render_places_the_caret() {
    let source = Source::from_string("demo.ntx", "x = yy + 1\n");
    let rendered = render(&source, DiagKind::Error, Span::new(4, 6), "boom");
    assert_eq!(rendered, "demo.ntx:1:5: error: boom\nx = yy + 1\n    ^^\n");
}

#[test]
fn render_clamps_empty_and_overlong_spans() {
    let source = Source::from_string("demo.ntx", "abc\n");
    let empty = render(&source, DiagKind::Error, Span::new(1, 1), "empty");
    assert_eq!(empty, "demo.ntx:1:2: error: empty\nabc\n ^\n");
    // A span running past the end of the line collapses to one caret.
    let long = render(&source, DiagKind::Warning, Span::new(2, 4), "long");
    assert_eq!(long, "demo.ntx:1:3: warning: long\nabc\n  ^\n");
}

#[test]
fn render_skips_the_source_line_when_empty() {
    let source = Source::from_string("demo.ntx", "x\n\n");
    let rendered = render(&source, DiagKind::Error, Span::new(2, 2), "here");
    assert_eq!(rendered, "demo.ntx:2:1: error: here\n");
}
