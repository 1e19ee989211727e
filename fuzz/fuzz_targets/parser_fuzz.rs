//! Fuzz target for the agent specification DSL parser.
//!
//! Parsing is fail-fast and total: any UTF-8 input must produce either a
//! root AgentSpec or a structured ParseError, never a panic or a hang.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use agent_dsl::{parse, Lexer, ParseError, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        match parse(input) {
            Ok(spec) => {
                assert!(!spec.name.is_empty(), "a parsed spec always carries its name");
            }
            Err(
                ParseError::UnexpectedToken { line, column, .. }
                | ParseError::PrematureEndOfInput { line, column, .. },
            ) => {
                assert!(line >= 1, "error line should be >= 1");
                assert!(column >= 1, "error column should be >= 1");
            }
        }

        // The parser must also cope with a raw token vector.
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let _ = parser.parse();
    }
});
