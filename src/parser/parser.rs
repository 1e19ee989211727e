//! Parser implementation
//!
//! A recursive-descent parser over the token sequence, one routine per
//! grammar nonterminal. The grammar is LL(1): every routine decides its
//! production from the current token alone, so no backtracking is needed.
//! Parsing is fail-fast: the first structural mismatch aborts the whole
//! parse and no partial AST is ever returned.

use super::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

/// Structural parse failure.
///
/// `PrematureEndOfInput` is raised whenever the mismatching token is the
/// end-of-input sentinel, so a truncated source is distinguishable from an
/// ordinary mismatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}, column {column}: in {production}: expected {expected}, found {found_kind} `{found_text}`")]
    UnexpectedToken {
        production: &'static str,
        expected: String,
        found_kind: TokenKind,
        found_text: String,
        line: usize,
        column: usize,
    },

    #[error("line {line}, column {column}: in {production}: expected {expected}, but the input ended")]
    PrematureEndOfInput {
        production: &'static str,
        expected: String,
        line: usize,
        column: usize,
    },
}

/// Parse source text into an [`AgentSpec`].
pub fn parse(source: &str) -> Result<AgentSpec, ParseError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens);
    parser.parse()
}

/// Parser for the agent specification DSL.
///
/// State is an immutable token vector plus an integer cursor; lookahead is
/// always exactly one token.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a vector of tokens.
    ///
    /// A missing end-of-input sentinel is appended so the cursor always has
    /// a current token to point at.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens
            .last()
            .map_or(true, |t| t.kind != TokenKind::EndOfInput)
        {
            tokens.push(Token {
                kind: TokenKind::EndOfInput,
                text: String::new(),
                span: Span::default(),
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the tokens into the root [`AgentSpec`] node.
    pub fn parse(&mut self) -> Result<AgentSpec, ParseError> {
        self.parse_agent_spec()
    }

    /// Parse the top-level `agent <Name> { ... }` block.
    ///
    /// Section order is fixed. The optional sections (`telemetry`, the
    /// top-level `retry`, `llm`, `test`) are recognized by peeking at the
    /// current token's text; absence is not an error.
    fn parse_agent_spec(&mut self) -> Result<AgentSpec, ParseError> {
        const P: &str = "agent";

        self.expect_literal(P, "agent")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "description")?;
        let description = self.expect_string(P)?;

        let permissions = self.parse_permissions()?;
        let tasks = self.parse_tasks()?;

        let telemetry = if self.check_literal("telemetry") {
            Some(self.parse_telemetry()?)
        } else {
            None
        };
        let retry = if self.check_literal("retry") {
            Some(self.parse_retry()?)
        } else {
            None
        };

        self.expect_literal(P, "input")?;
        let input = self.parse_data_spec("input")?;
        self.expect_literal(P, "output")?;
        let output = self.parse_data_spec("output")?;

        let connectors = self.parse_connectors()?;
        let tools = self.parse_tools()?;
        let actions = self.parse_actions()?;
        let limits = self.parse_limits()?;

        let llm = if self.check_literal("llm") {
            Some(self.parse_llm()?)
        } else {
            None
        };
        let test = if self.check_literal("test") {
            Some(self.parse_test()?)
        } else {
            None
        };

        let deployment = self.parse_deployment()?;

        self.expect_literal(P, "documentation")?;
        let documentation = self.expect_string(P)?;

        self.expect_literal(P, "}")?;
        self.expect_end(P)?;

        Ok(AgentSpec {
            name,
            description,
            permissions,
            tasks,
            telemetry,
            retry,
            input,
            output,
            connectors,
            tools,
            actions,
            limits,
            llm,
            test,
            deployment,
            documentation,
        })
    }

    /// Parse `permissions { (allow <ident> | deny <ident>)* }`.
    fn parse_permissions(&mut self) -> Result<Permissions, ParseError> {
        const P: &str = "permissions";

        self.expect_literal(P, "permissions")?;
        self.expect_literal(P, "{")?;

        let mut allow = Vec::new();
        let mut deny = Vec::new();

        while !self.check_literal("}") {
            if self.check_literal("allow") {
                self.advance();
                allow.push(self.expect_identifier(P)?);
            } else if self.check_literal("deny") {
                self.advance();
                deny.push(self.expect_identifier(P)?);
            } else {
                return Err(self.unexpected(P, "`allow` or `deny`"));
            }
        }

        self.expect_literal(P, "}")?;

        Ok(Permissions { allow, deny })
    }

    /// Parse `tasks { task* }`.
    fn parse_tasks(&mut self) -> Result<Vec<Task>, ParseError> {
        const P: &str = "tasks";

        self.expect_literal(P, "tasks")?;
        self.expect_literal(P, "{")?;

        let mut tasks = Vec::new();
        while !self.check_literal("}") {
            tasks.push(self.parse_task()?);
        }

        self.expect_literal(P, "}")?;
        Ok(tasks)
    }

    /// Parse `task <Name> { description <string> actions retry? }`.
    fn parse_task(&mut self) -> Result<Task, ParseError> {
        const P: &str = "task";

        self.expect_literal(P, "task")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "description")?;
        let description = self.expect_string(P)?;

        let actions = self.parse_actions()?;

        let retry = if self.check_literal("retry") {
            Some(self.parse_retry()?)
        } else {
            None
        };

        self.expect_literal(P, "}")?;

        Ok(Task {
            name,
            description,
            actions,
            retry,
        })
    }

    /// Parse `actions { action* }`.
    fn parse_actions(&mut self) -> Result<Vec<Action>, ParseError> {
        const P: &str = "actions";

        self.expect_literal(P, "actions")?;
        self.expect_literal(P, "{")?;

        let mut actions = Vec::new();
        while !self.check_literal("}") {
            actions.push(self.parse_action()?);
        }

        self.expect_literal(P, "}")?;
        Ok(actions)
    }

    /// Parse `action <Name> { type <string> parameters { ... } }`.
    fn parse_action(&mut self) -> Result<Action, ParseError> {
        const P: &str = "action";

        self.expect_literal(P, "action")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "type")?;
        let action_type = self.expect_string(P)?;

        self.expect_literal(P, "parameters")?;
        let parameters = self.parse_kv_block(P)?;

        self.expect_literal(P, "}")?;

        Ok(Action {
            name,
            action_type,
            parameters,
        })
    }

    /// Parse `telemetry { emit <ident> on <ident> data { field* } }`.
    fn parse_telemetry(&mut self) -> Result<Telemetry, ParseError> {
        const P: &str = "telemetry";

        self.expect_literal(P, "telemetry")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "emit")?;
        let telemetry_type = self.expect_identifier(P)?;
        self.expect_literal(P, "on")?;
        let event_type = self.expect_identifier(P)?;

        self.expect_literal(P, "data")?;
        self.expect_literal(P, "{")?;
        let mut fields = Vec::new();
        while !self.check_literal("}") {
            fields.push(self.parse_field()?);
        }
        self.expect_literal(P, "}")?;

        self.expect_literal(P, "}")?;

        Ok(Telemetry {
            telemetry_type,
            event_type,
            fields,
        })
    }

    /// Parse `retry { max_attempts <int> delay <string> backoff_strategy <linear|exponential> }`.
    fn parse_retry(&mut self) -> Result<Retry, ParseError> {
        const P: &str = "retry";

        self.expect_literal(P, "retry")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "max_attempts")?;
        let max_attempts = self.expect_int(P)?;

        self.expect_literal(P, "delay")?;
        let delay = self.expect_string(P)?;

        self.expect_literal(P, "backoff_strategy")?;
        let backoff_strategy = if self.check_literal("linear") {
            self.advance();
            BackoffStrategy::Linear
        } else if self.check_literal("exponential") {
            self.advance();
            BackoffStrategy::Exponential
        } else {
            return Err(self.unexpected(P, "`linear` or `exponential`"));
        };

        self.expect_literal(P, "}")?;

        Ok(Retry {
            max_attempts,
            delay,
            backoff_strategy,
        })
    }

    /// Parse `{ type <ident> structure { field* }? }`.
    ///
    /// Shared by `input`, `output`, and the test section's `expected_output`;
    /// the caller has already consumed the introducing word and passes it as
    /// the production name for diagnostics.
    fn parse_data_spec(&mut self, production: &'static str) -> Result<DataSpec, ParseError> {
        self.expect_literal(production, "{")?;

        self.expect_literal(production, "type")?;
        let data_type = self.expect_identifier(production)?;

        let mut fields = Vec::new();
        if self.check_literal("structure") {
            self.advance();
            self.expect_literal(production, "{")?;
            while !self.check_literal("}") {
                fields.push(self.parse_field()?);
            }
            self.expect_literal(production, "}")?;
        }

        self.expect_literal(production, "}")?;

        Ok(DataSpec { data_type, fields })
    }

    /// Parse `field <name> : <type>`.
    fn parse_field(&mut self) -> Result<DataField, ParseError> {
        const P: &str = "field";

        self.expect_literal(P, "field")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, ":")?;
        let type_name = self.expect_identifier(P)?;

        Ok(DataField { name, type_name })
    }

    /// Parse `connectors { connector* }`.
    fn parse_connectors(&mut self) -> Result<Vec<Connector>, ParseError> {
        const P: &str = "connectors";

        self.expect_literal(P, "connectors")?;
        self.expect_literal(P, "{")?;

        let mut connectors = Vec::new();
        while !self.check_literal("}") {
            connectors.push(self.parse_connector()?);
        }

        self.expect_literal(P, "}")?;
        Ok(connectors)
    }

    /// Parse `connector <Name> { type <string> config { ... } }`.
    fn parse_connector(&mut self) -> Result<Connector, ParseError> {
        const P: &str = "connector";

        self.expect_literal(P, "connector")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "type")?;
        let connector_type = self.expect_string(P)?;

        self.expect_literal(P, "config")?;
        let config = self.parse_kv_block(P)?;

        self.expect_literal(P, "}")?;

        Ok(Connector {
            name,
            connector_type,
            config,
        })
    }

    /// Parse `tools { tool* }`.
    fn parse_tools(&mut self) -> Result<Vec<Tool>, ParseError> {
        const P: &str = "tools";

        self.expect_literal(P, "tools")?;
        self.expect_literal(P, "{")?;

        let mut tools = Vec::new();
        while !self.check_literal("}") {
            tools.push(self.parse_tool()?);
        }

        self.expect_literal(P, "}")?;
        Ok(tools)
    }

    /// Parse `tool <Name> { type <string> actions }`.
    fn parse_tool(&mut self) -> Result<Tool, ParseError> {
        const P: &str = "tool";

        self.expect_literal(P, "tool")?;
        let name = self.expect_identifier(P)?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "type")?;
        let tool_type = self.expect_string(P)?;

        let actions = self.parse_actions()?;

        self.expect_literal(P, "}")?;

        Ok(Tool {
            name,
            tool_type,
            actions,
        })
    }

    /// Parse `limits { max_runtime <string> memory_usage <string> parallel_tasks <int> }`.
    fn parse_limits(&mut self) -> Result<Limits, ParseError> {
        const P: &str = "limits";

        self.expect_literal(P, "limits")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "max_runtime")?;
        let max_runtime = self.expect_string(P)?;

        self.expect_literal(P, "memory_usage")?;
        let memory_usage = self.expect_string(P)?;

        self.expect_literal(P, "parallel_tasks")?;
        let parallel_tasks = self.expect_int(P)?;

        self.expect_literal(P, "}")?;

        Ok(Limits {
            max_runtime,
            memory_usage,
            parallel_tasks,
        })
    }

    /// Parse `llm { provider <string> model <string> settings { max_tokens <int> temperature <float> } }`.
    fn parse_llm(&mut self) -> Result<Llm, ParseError> {
        const P: &str = "llm";

        self.expect_literal(P, "llm")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "provider")?;
        let provider = self.expect_string(P)?;

        self.expect_literal(P, "model")?;
        let model = self.expect_string(P)?;

        self.expect_literal(P, "settings")?;
        self.expect_literal(P, "{")?;
        self.expect_literal(P, "max_tokens")?;
        let max_tokens = self.expect_int(P)?;
        self.expect_literal(P, "temperature")?;
        let temperature = self.expect_float(P)?;
        self.expect_literal(P, "}")?;

        self.expect_literal(P, "}")?;

        Ok(Llm {
            provider,
            model,
            max_tokens,
            temperature,
        })
    }

    /// Parse `test { dryrun { input <data_spec> expected_output <data_spec> } }`.
    fn parse_test(&mut self) -> Result<TestSpec, ParseError> {
        const P: &str = "test";

        self.expect_literal(P, "test")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "dryrun")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "input")?;
        let input = self.parse_data_spec("input")?;

        self.expect_literal(P, "expected_output")?;
        let expected_output = self.parse_data_spec("expected_output")?;

        self.expect_literal(P, "}")?;
        self.expect_literal(P, "}")?;

        Ok(TestSpec {
            input,
            expected_output,
        })
    }

    /// Parse `deployment { target <string> strategy <string> }`.
    fn parse_deployment(&mut self) -> Result<Deployment, ParseError> {
        const P: &str = "deployment";

        self.expect_literal(P, "deployment")?;
        self.expect_literal(P, "{")?;

        self.expect_literal(P, "target")?;
        let target = self.expect_string(P)?;

        self.expect_literal(P, "strategy")?;
        let strategy = self.expect_string(P)?;

        self.expect_literal(P, "}")?;

        Ok(Deployment { target, strategy })
    }

    /// Parse a `{ key: value ... }` body into a [`ConfigMap`].
    ///
    /// Keys are identifiers, values are string, integer, or float literals.
    /// Duplicate keys resolve last-write-wins.
    fn parse_kv_block(&mut self, production: &'static str) -> Result<ConfigMap, ParseError> {
        self.expect_literal(production, "{")?;

        let mut map = ConfigMap::new();
        while !self.check_literal("}") {
            let key = self.expect_identifier(production)?;
            self.expect_literal(production, ":")?;
            let value = self.parse_value(production)?;
            map.insert(key, value);
        }

        self.expect_literal(production, "}")?;
        Ok(map)
    }

    /// Parse a single literal value by the current token's kind.
    fn parse_value(&mut self, production: &'static str) -> Result<Value, ParseError> {
        match self.current().kind {
            TokenKind::String => Ok(Value::String(self.expect_string(production)?)),
            TokenKind::Integer => Ok(Value::Integer(self.expect_int(production)?)),
            TokenKind::Float => Ok(Value::Float(self.expect_float(production)?)),
            _ => Err(self.unexpected(production, "a string, integer, or float value")),
        }
    }

    // ========================================================================
    // Consumption primitives
    // ========================================================================

    /// Succeed only if the current token's literal text equals `text`.
    ///
    /// Used for keywords, unreserved structural words, and symbols. Distinct
    /// from [`Parser::expect_kind`]: this validates fixed text, never a
    /// dynamic value.
    pub fn expect_literal(
        &mut self,
        production: &'static str,
        text: &str,
    ) -> Result<(), ParseError> {
        if self.current().text == text {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(production, format!("`{}`", text)))
        }
    }

    /// Succeed only if the current token's kind matches, returning its text.
    ///
    /// Used to read identifiers, strings, and numbers as dynamic values, so
    /// a token of the wrong class (say, an integer where an identifier name
    /// is required) is actually rejected.
    pub fn expect_kind(
        &mut self,
        production: &'static str,
        kind: TokenKind,
    ) -> Result<String, ParseError> {
        if self.current().kind == kind {
            let text = self.current().text.clone();
            self.advance();
            Ok(text)
        } else {
            Err(self.unexpected(production, describe(kind)))
        }
    }

    fn expect_identifier(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.expect_kind(production, TokenKind::Identifier)
    }

    fn expect_string(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.expect_kind(production, TokenKind::String)
    }

    fn expect_int(&mut self, production: &'static str) -> Result<i64, ParseError> {
        if self.current().kind != TokenKind::Integer {
            return Err(self.unexpected(production, "an integer"));
        }
        match self.current().text.parse::<i64>() {
            Ok(value) => {
                self.advance();
                Ok(value)
            }
            Err(_) => Err(self.unexpected(production, "an integer in range")),
        }
    }

    /// An integer token is accepted where a float is expected, so
    /// `temperature 1` parses.
    fn expect_float(&mut self, production: &'static str) -> Result<f64, ParseError> {
        match self.current().kind {
            TokenKind::Float | TokenKind::Integer => {
                match self.current().text.parse::<f64>() {
                    Ok(value) => {
                        self.advance();
                        Ok(value)
                    }
                    Err(_) => Err(self.unexpected(production, "a numeric value")),
                }
            }
            _ => Err(self.unexpected(production, "a float")),
        }
    }

    /// Require the end-of-input sentinel (no trailing tokens after the root
    /// block).
    fn expect_end(&mut self, production: &'static str) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.unexpected(production, "end of input"))
        }
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::EndOfInput
    }

    /// Peek: does the current token's text equal `text`? Never advances.
    fn check_literal(&self, text: &str) -> bool {
        self.current().text == text
    }

    fn unexpected(&self, production: &'static str, expected: impl Into<String>) -> ParseError {
        let token = self.current();
        let expected = expected.into();
        if token.kind == TokenKind::EndOfInput {
            ParseError::PrematureEndOfInput {
                production,
                expected,
                line: token.span.line,
                column: token.span.column,
            }
        } else {
            ParseError::UnexpectedToken {
                production,
                expected,
                found_kind: token.kind,
                found_text: token.text.clone(),
                line: token.span.line,
                column: token.span.column,
            }
        }
    }
}

fn describe(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "a keyword",
        TokenKind::Identifier => "an identifier",
        TokenKind::String => "a string literal",
        TokenKind::Integer => "an integer",
        TokenKind::Float => "a float",
        TokenKind::Symbol => "a symbol",
        TokenKind::EndOfInput => "end of input",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Lexer Tests
    // ========================================================================

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize()
    }

    #[test]
    fn test_lexer_keywords_and_identifiers() {
        let tokens = lex("agent permissions tasks task my_name _x1");

        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text, "agent");
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
        // `task` is not reserved, only `tasks` is
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].text, "task");
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
        assert_eq!(tokens[5].kind, TokenKind::Identifier);
        assert_eq!(tokens[5].text, "_x1");
    }

    #[test]
    fn test_lexer_keywords_are_case_sensitive() {
        let tokens = lex("Agent AGENT agent");

        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_lexer_symbols() {
        let tokens = lex("{ } : @ /");

        for token in &tokens[..5] {
            assert_eq!(token.kind, TokenKind::Symbol);
        }
        assert_eq!(tokens[0].text, "{");
        assert_eq!(tokens[2].text, ":");
        // No character is a lexical error; unknown characters are symbols.
        assert_eq!(tokens[3].text, "@");
        assert_eq!(tokens[4].text, "/");
    }

    #[test]
    fn test_lexer_numbers() {
        let tokens = lex("42 3.14 7.");

        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].text, "3.14");
        // A dot with no digit after it is not part of the number.
        assert_eq!(tokens[2].kind, TokenKind::Integer);
        assert_eq!(tokens[2].text, "7");
        assert_eq!(tokens[3].kind, TokenKind::Symbol);
        assert_eq!(tokens[3].text, ".");
    }

    #[test]
    fn test_lexer_string_literals_verbatim() {
        let tokens = lex(r#""hello" "a\nb""#);

        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "hello");
        // No escape sequences: backslashes are taken verbatim.
        assert_eq!(tokens[1].text, r"a\nb");
    }

    #[test]
    fn test_lexer_unterminated_string_collects_to_end() {
        let tokens = lex(r#"description "no closing quote"#);

        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "no closing quote");
        assert_eq!(tokens[2].kind, TokenKind::EndOfInput);
    }

    #[test]
    fn test_lexer_always_ends_with_sentinel() {
        for source in ["", "   ", "agent", "\"unterminated", "{}:"] {
            let tokens = lex(source);
            assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfInput);
            assert_eq!(
                tokens
                    .iter()
                    .filter(|t| t.kind == TokenKind::EndOfInput)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn test_lexer_spans_track_lines() {
        let tokens = lex("agent\n  Foo");

        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }

    // ========================================================================
    // Parser Tests
    // ========================================================================

    const MINIMAL: &str = r#"
        agent Minimal {
            description "Smallest accepted specification."
            permissions { }
            tasks { }
            input { type JSON }
            output { type JSON }
            connectors { }
            tools { }
            actions { }
            limits { max_runtime "60s" memory_usage "512MB" parallel_tasks 1 }
            deployment { target "staging" strategy "rolling" }
            documentation "Nothing to see here."
        }
    "#;

    #[test]
    fn test_parse_minimal_spec() -> Result<(), ParseError> {
        let spec = parse(MINIMAL)?;

        assert_eq!(spec.name, "Minimal");
        assert!(spec.permissions.allow.is_empty());
        assert!(spec.permissions.deny.is_empty());
        assert!(spec.tasks.is_empty());
        assert!(spec.telemetry.is_none());
        assert!(spec.retry.is_none());
        assert!(spec.llm.is_none());
        assert!(spec.test.is_none());
        assert_eq!(spec.input.data_type, "JSON");
        assert!(spec.input.fields.is_empty());
        assert_eq!(spec.limits.parallel_tasks, 1);
        assert_eq!(spec.deployment.target, "staging");
        assert_eq!(spec.documentation, "Nothing to see here.");
        Ok(())
    }

    #[test]
    fn test_parse_permissions_preserve_order() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "permissions { }",
            "permissions { allow a deny b allow c }",
        );
        let spec = parse(&source)?;

        assert_eq!(spec.permissions.allow, vec!["a", "c"]);
        assert_eq!(spec.permissions.deny, vec!["b"]);
        Ok(())
    }

    #[test]
    fn test_parse_telemetry_section() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "input { type JSON }",
            "telemetry { emit metrics on task_completed data { field duration: float } } \
             input { type JSON }",
        );
        let spec = parse(&source)?;

        let telemetry = spec.telemetry.expect("telemetry should be present");
        assert_eq!(telemetry.telemetry_type, "metrics");
        assert_eq!(telemetry.event_type, "task_completed");
        assert_eq!(telemetry.fields.len(), 1);
        assert_eq!(telemetry.fields[0].name, "duration");
        assert_eq!(telemetry.fields[0].type_name, "float");
        Ok(())
    }

    #[test]
    fn test_parse_retry_sections() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "input { type JSON }",
            "retry { max_attempts 3 delay \"5s\" backoff_strategy exponential } \
             input { type JSON }",
        );
        let spec = parse(&source)?;

        let retry = spec.retry.expect("retry should be present");
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.delay, "5s");
        assert_eq!(retry.backoff_strategy, BackoffStrategy::Exponential);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown_backoff_strategy() {
        let source = MINIMAL.replace(
            "input { type JSON }",
            "retry { max_attempts 3 delay \"5s\" backoff_strategy quadratic } \
             input { type JSON }",
        );

        let err = parse(&source).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { production: "retry", .. }
        ));
    }

    #[test]
    fn test_parse_task_with_retry() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "tasks { }",
            r#"tasks {
                task Sync {
                    description "Synchronizes state."
                    actions { }
                    retry { max_attempts 2 delay "1s" backoff_strategy linear }
                }
            }"#,
        );
        let spec = parse(&source)?;

        assert_eq!(spec.tasks.len(), 1);
        let task = &spec.tasks[0];
        assert_eq!(task.name, "Sync");
        assert!(task.actions.is_empty());
        let retry = task.retry.as_ref().expect("task retry should be present");
        assert_eq!(retry.backoff_strategy, BackoffStrategy::Linear);
        Ok(())
    }

    #[test]
    fn test_parse_connector_and_tool() -> Result<(), ParseError> {
        let source = MINIMAL
            .replace(
                "connectors { }",
                r#"connectors {
                    connector Database { type "postgres" config { url: "postgres://localhost" pool: 8 } }
                }"#,
            )
            .replace(
                "tools { }",
                r#"tools {
                    tool Files {
                        type "filesystem"
                        actions {
                            action Read { type "read" parameters { path: "/tmp/in" } }
                        }
                    }
                }"#,
            );
        let spec = parse(&source)?;

        assert_eq!(spec.connectors.len(), 1);
        let connector = &spec.connectors[0];
        assert_eq!(connector.name, "Database");
        assert_eq!(connector.connector_type, "postgres");
        assert_eq!(
            connector.config.get("url"),
            Some(&Value::String("postgres://localhost".into()))
        );
        assert_eq!(connector.config.get("pool"), Some(&Value::Integer(8)));

        assert_eq!(spec.tools.len(), 1);
        let tool = &spec.tools[0];
        assert_eq!(tool.tool_type, "filesystem");
        assert_eq!(tool.actions.len(), 1);
        assert_eq!(tool.actions[0].action_type, "read");
        Ok(())
    }

    #[test]
    fn test_parse_llm_section() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "deployment {",
            "llm { provider \"openai\" model \"gpt-4\" settings { max_tokens 2048 temperature 0.7 } } \
             deployment {",
        );
        let spec = parse(&source)?;

        let llm = spec.llm.expect("llm should be present");
        assert_eq!(llm.provider, "openai");
        assert_eq!(llm.model, "gpt-4");
        assert_eq!(llm.max_tokens, 2048);
        assert!((llm.temperature - 0.7).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_parse_test_section() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "deployment {",
            r#"test {
                dryrun {
                    input { type JSON structure { field name: string } }
                    expected_output { type JSON structure { field result: string } }
                }
            }
            deployment {"#,
        );
        let spec = parse(&source)?;

        let test = spec.test.expect("test should be present");
        assert_eq!(test.input.fields[0].name, "name");
        assert_eq!(test.expected_output.fields[0].name, "result");
        Ok(())
    }

    #[test]
    fn test_parse_rejects_number_as_agent_name() {
        let source = MINIMAL.replace("agent Minimal", "agent 42");

        let err = parse(&source).unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                production,
                found_kind,
                found_text,
                ..
            } => {
                assert_eq!(production, "agent");
                assert_eq!(found_kind, TokenKind::Integer);
                assert_eq!(found_text, "42");
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_keyword_as_identifier() {
        // `delay` is reserved, so it cannot name a permission.
        let source = MINIMAL.replace("permissions { }", "permissions { allow delay }");

        let err = parse(&source).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_missing_documentation_fails() {
        let source = MINIMAL.replace(r#"documentation "Nothing to see here.""#, "");

        let err = parse(&source).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_truncated_input_fails() {
        let trimmed = MINIMAL.trim_end();
        let source = &trimmed[..trimmed.len() - 1];

        let err = parse(source).unwrap_err();
        assert!(matches!(err, ParseError::PrematureEndOfInput { .. }));
    }

    #[test]
    fn test_parse_trailing_tokens_rejected() {
        let source = format!("{} extra", MINIMAL.trim_end());

        let err = parse(&source).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_duplicate_parameter_key_last_write_wins() -> Result<(), ParseError> {
        let source = MINIMAL.replace(
            "actions { }",
            r#"actions {
                action Fetch { type "http" parameters { k: "1" mode: "plain" k: "2" } }
            }"#,
        );
        let spec = parse(&source)?;

        let parameters = &spec.actions[0].parameters;
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters.get("k"), Some(&Value::String("2".into())));
        Ok(())
    }

    #[test]
    fn test_parse_error_reports_position() {
        let source = "agent Broken [";
        let err = parse(source).unwrap_err();

        match err {
            ParseError::UnexpectedToken { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 14);
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_input_is_premature_end() {
        let err = parse("").unwrap_err();
        assert!(matches!(
            err,
            ParseError::PrematureEndOfInput { production: "agent", .. }
        ));
    }

    #[test]
    fn test_parser_accepts_token_vector_without_sentinel() {
        // Parser::new appends the sentinel when handed a raw token vector.
        let mut parser = Parser::new(Vec::new());
        assert!(parser.parse().is_err());
    }

    #[test]
    fn test_config_map_equality_ignores_order() {
        let a: ConfigMap = [
            ("x".to_string(), Value::Integer(1)),
            ("y".to_string(), Value::Float(2.5)),
        ]
        .into_iter()
        .collect();
        let b: ConfigMap = [
            ("y".to_string(), Value::Float(2.5)),
            ("x".to_string(), Value::Integer(1)),
        ]
        .into_iter()
        .collect();

        assert_eq!(a, b);
        assert_eq!(a.iter().next(), Some(("x", &Value::Integer(1))));
    }
}
