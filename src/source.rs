use std::{fs, io, path::Path};

use once_cell::unsync::OnceCell;

/// A half-open byte range into the normalized source text.
///
/// Spans are produced by the lexer and carried through the AST so that
/// diagnostics and the evaluator can recover the original lexeme with
/// [`Source::slice`]. Virtual tokens (`EOF`, pending `DEDENT`s) have
/// `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end:   usize,
}

impl Span {
    /// Creates a span covering `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at the given position.
    #[must_use]
    pub const fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// The number of bytes covered by the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A loaded piece of source code with normalized line endings.
///
/// The stored text is guaranteed to contain no `\r` characters and to end
/// with a final `\n`; the lexer relies on both properties. A line-start
/// index is materialized lazily on the first position query and shared by
/// all subsequent lookups.
///
/// Lines are numbered starting at 1. The text after the final `\n` counts
/// as one extra, empty line, so `line_count` equals the number of `\n`
/// characters plus one.
pub struct Source {
    filename:    String,
    text:        String,
    line_starts: OnceCell<Vec<usize>>,
}

impl Source {
    /// Reads and normalizes a file.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the file cannot be read
    /// (including files that are not valid UTF-8).
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_string(&path.display().to_string(), &raw))
    }

    /// Normalizes an in-memory string.
    ///
    /// All `\r\n` pairs and standalone `\r` characters are replaced with
    /// `\n`, and a final `\n` is appended when missing (an empty input
    /// becomes `"\n"`).
    ///
    /// ## Example
    /// ```
    /// use natrix::source::Source;
    ///
    /// let source = Source::from_string("<string>", "a\nb\rc\r\r\nd");
    /// assert_eq!(source.text(), "a\nb\nc\n\nd\n");
    /// ```
    #[must_use]
    pub fn from_string(filename: &str, text: &str) -> Self {
        let mut normalized = String::with_capacity(text.len() + 1);
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\r' {
                normalized.push('\n');
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            } else {
                normalized.push(c);
            }
        }
        if !normalized.ends_with('\n') {
            normalized.push('\n');
        }
        Self { filename:    filename.to_string(),
               text:        normalized,
               line_starts: OnceCell::new(), }
    }

    /// The name the source was loaded under.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The normalized text. Always ends with `\n`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The lexeme covered by `span`.
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// The number of lines, counting the empty line past the final `\n`.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    /// The 1-based line number containing the byte at `pos`.
    ///
    /// `pos` may be `text().len()`, which addresses the empty final line.
    #[must_use]
    pub fn line_number(&self, pos: usize) -> usize {
        self.line_starts().partition_point(|&start| start <= pos)
    }

    /// The byte offset of the first character of the 1-based line `line`.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts()[line - 1]
    }

    /// The byte offset of the `\n` terminating the 1-based line `line`,
    /// or the end of the text for the final, empty line.
    #[must_use]
    pub fn line_end(&self, line: usize) -> usize {
        let line_starts = self.line_starts();
        if line < line_starts.len() {
            line_starts[line] - 1
        } else {
            self.text.len()
        }
    }

    /// The lazily materialized line index: offset 0 plus the position
    /// after every `\n`.
    fn line_starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
                            let mut starts = vec![0];
                            for (pos, byte) in self.text.bytes().enumerate() {
                                if byte == b'\n' {
                                    starts.push(pos + 1);
                                }
                            }
                            starts
                        })
    }
}
