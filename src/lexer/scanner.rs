//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

/// Lexer for the agent specification DSL.
///
/// Tokenization always succeeds: there is no error token kind. Any character
/// that starts no other rule becomes a one-character symbol token, and an
/// unterminated string literal degrades to a best-effort string token holding
/// everything up to end of input.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    ///
    /// The result always ends with exactly one `EndOfInput` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_end = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if is_end {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let (kind, text) = match self.peek_char() {
            None => (TokenKind::EndOfInput, String::new()),
            Some('"') => self.scan_string(),
            Some(c) if c.is_ascii_digit() => self.scan_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.scan_word(),
            Some(c) => {
                self.advance();
                (TokenKind::Symbol, c.to_string())
            }
        };

        Token {
            kind,
            text,
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Scan an identifier or keyword.
    fn scan_word(&mut self) -> (TokenKind, String) {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let word = &self.source[start..self.pos];
        let kind = if is_keyword(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        (kind, word.to_string())
    }

    /// Scan a string literal.
    ///
    /// The language has no escape sequences: characters are taken verbatim
    /// until the next double quote. A missing closing quote yields a string
    /// token with whatever was collected up to end of input.
    fn scan_string(&mut self) -> (TokenKind, String) {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek_char() {
                None => break,
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        (TokenKind::String, value)
    }

    /// Scan an integer or float literal.
    ///
    /// The dot is consumed only when a digit follows it, so `60.` lexes as
    /// the integer `60` followed by a symbol token.
    fn scan_number(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        let mut kind = TokenKind::Integer;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.peek_char() == Some('.')
            && self
                .peek_next_char()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        {
            self.advance(); // consume the dot
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
            kind = TokenKind::Float;
        }

        (kind, self.source[start..self.pos].to_string())
    }

    /// Skip whitespace. The language has no comment syntax.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }
}
