//! Fuzz target for the agent specification DSL lexer.
//!
//! The lexer accepts every byte content: no input may panic it, and every
//! token sequence must end with exactly one end-of-input sentinel.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use agent_dsl::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();

        assert!(
            !tokens.is_empty(),
            "tokenization should produce at least the sentinel"
        );
        assert_eq!(
            tokens.last().unwrap().kind,
            TokenKind::EndOfInput,
            "last token should always be the end-of-input sentinel"
        );
        assert_eq!(
            tokens
                .iter()
                .filter(|t| t.kind == TokenKind::EndOfInput)
                .count(),
            1,
            "exactly one end-of-input sentinel"
        );

        for token in &tokens {
            assert!(token.span.start <= token.span.end, "span start should be <= end");
            assert!(token.span.line >= 1, "line numbers should be >= 1");
            assert!(token.span.column >= 1, "column numbers should be >= 1");
        }
    }
});
