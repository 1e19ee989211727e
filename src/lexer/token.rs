//! Lexer token types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse token classes for the agent specification DSL.
///
/// The parser matches fixed words and symbols by their literal text, so the
/// lexer only needs to distinguish the broad lexical classes here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    String,
    Integer,
    Float,
    Symbol,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string literal",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Symbol => "symbol",
            TokenKind::EndOfInput => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// Reserved words of the language, matched exactly (case-sensitive).
///
/// Structural words that only ever appear as literal text at one grammar
/// position (`task`, `action`, `connector`, `tool`, `config`, `parameters`,
/// `max_runtime`, `memory_usage`) are deliberately not reserved; they lex as
/// identifiers and the parser matches them by text.
pub const KEYWORDS: &[&str] = &[
    "agent",
    "permissions",
    "tasks",
    "telemetry",
    "retry",
    "input",
    "output",
    "connectors",
    "tools",
    "actions",
    "limits",
    "llm",
    "test",
    "deployment",
    "documentation",
    "allow",
    "deny",
    "emit",
    "on",
    "data",
    "type",
    "structure",
    "field",
    "description",
    "max_attempts",
    "delay",
    "backoff_strategy",
    "parallel_tasks",
    "provider",
    "model",
    "settings",
    "max_tokens",
    "temperature",
    "dryrun",
    "expected_output",
    "target",
    "strategy",
];

/// Whether a scanned word is one of the reserved words.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind, literal text, and source location.
///
/// String tokens carry the literal's content without the surrounding quotes.
/// The `EndOfInput` sentinel carries empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}
