//! Lexer module for the agent specification DSL

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
