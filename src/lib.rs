//! Agent specification DSL - lexer, parser, and AST
//!
//! This crate is the front-end for the textual language that describes
//! autonomous task-executing agents. It turns an in-memory source buffer into
//! a fully-populated [`AgentSpec`] tree and does nothing else: no I/O, no
//! execution, no semantic validation of field values.
//!
//! Architecture:
//! ```text
//! Source text
//!     ↓
//! Lexer (token sequence, always ends with EndOfInput)
//!     ↓
//! Parser (recursive descent, LL(1), fail-fast)
//!     ↓
//! AgentSpec AST (owned by the caller)
//! ```
//!
//! ```
//! let spec = agent_dsl::parse(r#"
//!     agent Minimal {
//!         description "Smallest accepted specification."
//!         permissions { allow read_file }
//!         tasks { }
//!         input { type JSON }
//!         output { type JSON }
//!         connectors { }
//!         tools { }
//!         actions { }
//!         limits { max_runtime "60s" memory_usage "512MB" parallel_tasks 1 }
//!         deployment { target "staging" strategy "rolling" }
//!         documentation "Example."
//!     }
//! "#).unwrap();
//! assert_eq!(spec.name, "Minimal");
//! assert_eq!(spec.permissions.allow, vec!["read_file"]);
//! ```

pub mod lexer;
pub mod parser;

// Re-export key types for convenience
pub use lexer::*;
pub use parser::*;
