//! Abstract Syntax Tree types
//!
//! Pure data: nodes are built once, bottom-up, during a single parse pass and
//! never mutated afterward. No node performs parsing or validation.

use serde::{Deserialize, Serialize};

/// The root AST node for an agent specification.
///
/// Field order matches the fixed section order of the source grammar. The
/// four `Option` fields correspond to the optional sections; `None` means the
/// section was absent from the source, never a defaulted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub description: String,
    pub permissions: Permissions,
    pub tasks: Vec<Task>,
    pub telemetry: Option<Telemetry>,
    pub retry: Option<Retry>,
    pub input: DataSpec,
    pub output: DataSpec,
    pub connectors: Vec<Connector>,
    pub tools: Vec<Tool>,
    pub actions: Vec<Action>,
    pub limits: Limits,
    pub llm: Option<Llm>,
    pub test: Option<TestSpec>,
    pub deployment: Deployment,
    pub documentation: String,
}

/// Permission lists in source order. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

/// A named task with its actions and an optional retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub actions: Vec<Action>,
    pub retry: Option<Retry>,
}

/// Telemetry emission: what to emit, on which event, with which fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub telemetry_type: String,
    pub event_type: String,
    pub fields: Vec<DataField>,
}

/// Retry policy, used at the top level and per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retry {
    pub max_attempts: i64,
    pub delay: String,
    pub backoff_strategy: BackoffStrategy,
}

/// Backoff strategies for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackoffStrategy {
    Linear,
    Exponential,
}

/// Data shape for `input`, `output`, and test expectations.
///
/// `fields` is empty when the source has no `structure` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    pub data_type: String,
    pub fields: Vec<DataField>,
}

/// A single `field name: type` entry. The type name is a free-form
/// identifier (`string`, `integer`, `float`, `boolean`, or custom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    pub type_name: String,
}

/// External connector with its configuration mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub name: String,
    pub connector_type: String,
    pub config: ConfigMap,
}

/// A tool grouping a set of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub tool_type: String,
    pub actions: Vec<Action>,
}

/// A single action with its parameter mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub action_type: String,
    pub parameters: ConfigMap,
}

/// Resource limits for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub max_runtime: String,
    pub memory_usage: String,
    pub parallel_tasks: i64,
}

/// LLM provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Llm {
    pub provider: String,
    pub model: String,
    pub max_tokens: i64,
    pub temperature: f64,
}

/// Dry-run test case pairing an input with its expected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    pub input: DataSpec,
    pub expected_output: DataSpec,
}

/// Deployment target and strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub target: String,
    pub strategy: String,
}

/// A literal value in a `config` or `parameters` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    /// The string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Insertion-ordered string-to-value mapping used for `config` and
/// `parameters` bodies.
///
/// Duplicate keys resolve last-write-wins at insert time: the key keeps its
/// original position, the value is replaced. Equality compares the entries as
/// a set of key/value pairs, so two maps built in different orders from the
/// same pairs are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMap {
    entries: Vec<(String, Value)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, overwriting the value of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for ConfigMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(String, Value)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
