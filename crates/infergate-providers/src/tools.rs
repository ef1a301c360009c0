//! Tool sets: capability descriptors with attached handlers, bound per call.
//!
//! A [`ToolSet`] is passed by reference to one `invoke_with_tools` call; the
//! chat client never keeps it. When the model asks for a tool, the caller runs
//! [`ToolSet::execute_calls`] and may append the resulting tool messages to
//! the conversation for a follow-up turn.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use infergate_core::types::ToolDefinition;
use infergate_core::{ChatMessage, ToolError, ToolInvocation};

/// Handler invoked with the decoded tool arguments; returns text for the model.
pub type ToolHandler = Arc<dyn Fn(&Value) -> anyhow::Result<String> + Send + Sync>;

// ─────────────────────────────────────────────
// ToolSpec
// ─────────────────────────────────────────────

/// One callable tool.
#[derive(Clone)]
pub struct ToolSpec {
    name: String,
    description: String,
    input_schema: Value,
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ToolSpec {
    /// `input_schema` must be a JSON Schema object:
    /// `{"type": "object", "properties": {...}, "required": [...]}`.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        ToolSpec {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// The definition sent to the model.
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description, self.input_schema.clone())
    }

    /// Run the handler directly.
    pub fn call(&self, arguments: &Value) -> anyhow::Result<String> {
        (self.handler)(arguments)
    }
}

// ─────────────────────────────────────────────
// ToolSet
// ─────────────────────────────────────────────

/// Tools with unique names, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct ToolSet {
    tools: Vec<ToolSpec>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting duplicate names.
    pub fn from_specs(specs: impl IntoIterator<Item = ToolSpec>) -> Result<Self, ToolError> {
        let mut set = ToolSet::new();
        for spec in specs {
            set.add(spec)?;
        }
        Ok(set)
    }

    /// Add a tool. Names are unique within a set.
    pub fn add(&mut self, spec: ToolSpec) -> Result<(), ToolError> {
        if self.get(spec.name()).is_some() {
            return Err(ToolError::DuplicateName(spec.name));
        }
        debug!(tool = spec.name(), "tool bound");
        self.tools.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolSpec::name).collect()
    }

    /// Model-facing definitions, in insertion order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolSpec::to_definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch one call by name.
    pub fn dispatch(&self, call: &ToolInvocation) -> Result<String, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::Unknown(call.name.clone()))?;
        match tool.call(&call.arguments) {
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                Ok(format!("Error executing {}: {e}", call.name))
            }
        }
    }

    /// Run every call and return the messages to send back to the model:
    /// the assistant turn that requested them, then one tool result per call.
    ///
    /// The model always gets text back, even on failure.
    pub fn execute_calls(&self, calls: &[ToolInvocation]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(calls.len() + 1);
        if calls.is_empty() {
            return messages;
        }
        messages.push(ChatMessage::assistant_tool_calls(calls));
        for call in calls {
            let output = self.dispatch(call).unwrap_or_else(|e| {
                warn!(tool = %call.name, "model requested an unbound tool");
                format!("Error: {e}")
            });
            messages.push(ChatMessage::tool_result(&call.id, output));
        }
        messages
    }
}
