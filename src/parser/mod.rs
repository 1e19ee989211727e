//! Parser module for the agent specification DSL

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::*;
