//! Cursor over a command line.

use lectern_core::ArgumentError;

/// Cursor over normalized command input.
///
/// Positions are byte offsets and always sit on a char boundary.
#[derive(Debug, Clone)]
pub struct InputReader<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> InputReader<'a> {
    /// Reader positioned at the start of `input`
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }

    /// The whole input
    #[must_use]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor. Offsets past the end clamp to the end.
    pub fn set_cursor(&mut self, cursor: usize) {
        let mut cursor = cursor.min(self.input.len());
        while !self.input.is_char_boundary(cursor) {
            cursor -= 1;
        }
        self.cursor = cursor;
    }

    /// Unread part of the input
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    /// Whether any input is left
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.cursor < self.input.len()
    }

    /// Next char without consuming it
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Consume one char
    pub fn skip(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.cursor += next.len_utf8();
        Some(next)
    }

    /// Consume whitespace
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.skip();
        }
    }

    /// Whether the cursor sits at the end of a token
    #[must_use]
    pub fn at_boundary(&self) -> bool {
        self.peek().map_or(true, char::is_whitespace)
    }

    /// Read up to the next whitespace
    pub fn read_unquoted(&mut self) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.cursor += len;
        &rest[..len]
    }

    /// Peek the token at the cursor without consuming it
    #[must_use]
    pub fn peek_unquoted(&self) -> &'a str {
        self.clone().read_unquoted()
    }

    /// Read a `"` or `'` quoted string, handling `\"` and `\\` escapes
    pub fn read_quoted(&mut self) -> Result<String, ArgumentError> {
        let start = self.cursor;
        let Some(quote @ ('"' | '\'')) = self.peek() else {
            return Err(ArgumentError::new(
                "string",
                self.peek_unquoted(),
                "expected a quote to start a string",
            ));
        };
        self.skip();

        let mut out = String::new();
        let mut escaped = false;
        while let Some(ch) = self.skip() {
            if escaped {
                if ch != quote && ch != '\\' {
                    self.cursor = start;
                    return Err(ArgumentError::new(
                        "string",
                        self.peek_unquoted(),
                        format!("invalid escape sequence '\\{ch}'"),
                    ));
                }
                out.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                return Ok(out);
            } else {
                out.push(ch);
            }
        }

        let unterminated = &self.input[start..];
        self.cursor = start;
        Err(ArgumentError::new("string", unterminated, "unclosed quoted string"))
    }

    /// Quoted string if the next char is a quote, otherwise one word
    pub fn read_string(&mut self) -> Result<String, ArgumentError> {
        match self.peek() {
            Some('"' | '\'') => self.read_quoted(),
            _ => Ok(self.read_unquoted().to_string()),
        }
    }

    /// Consume everything that is left
    pub fn read_remaining(&mut self) -> &'a str {
        let rest = self.remaining();
        self.cursor = self.input.len();
        rest
    }
}
