//! Tools the reasoning loop can call by name.
//!
//! Each agent builds a fixed [`Toolset`] for its run. Tools are deterministic
//! functions over data the agent already holds; none of them reach the network.

use serde::Deserialize;
use serde_json::Value;

/// A named function the model may invoke.
pub trait Tool: Send + Sync {
    /// Name the model uses in a `<tool>` block.
    fn name(&self) -> &'static str;

    /// One-line description shown in the system prompt.
    fn description(&self) -> &'static str;

    /// JSON Schema of the `arguments` object.
    fn parameters(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    /// Run the tool. An `Err` is reported back to the model as an observation.
    fn invoke(&self, arguments: &Value) -> Result<Value, String>;
}

/// A tool call parsed from a `<tool>` block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default, alias = "args")]
    pub arguments: Value,
}

/// The fixed set of tools available to one agent.
#[derive(Default)]
pub struct Toolset {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolset {
    /// An empty toolset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A later tool with the same name replaces the earlier one.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Box::new(tool));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Render the tool list for the system prompt.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "No tools available.".to_string();
        }
        self.tools
            .iter()
            .map(|t| {
                format!(
                    "- {}: {}\n  arguments: {}",
                    t.name(),
                    t.description(),
                    t.parameters()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Dispatch a call. Unknown names are an error observation, not a failure.
    pub fn dispatch(&self, call: &ToolCall) -> Result<Value, String> {
        match self.tools.iter().find(|t| t.name() == call.name) {
            Some(tool) => tool.invoke(&call.arguments),
            None => Err(format!(
                "Unknown tool '{}'. Available tools: {}",
                call.name,
                if self.tools.is_empty() {
                    "none".to_string()
                } else {
                    self.names().join(", ")
                }
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the text argument"
        }

        fn invoke(&self, arguments: &Value) -> Result<Value, String> {
            arguments
                .get("text")
                .cloned()
                .ok_or_else(|| "missing 'text'".to_string())
        }
    }

    #[test]
    fn test_dispatch_known_tool() {
        let tools = Toolset::new().with(Echo);
        let call = ToolCall {
            name: "echo".into(),
            arguments: json!({ "text": "hi" }),
        };
        assert_eq!(tools.dispatch(&call), Ok(json!("hi")));
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let tools = Toolset::new().with(Echo);
        let call = ToolCall {
            name: "rm".into(),
            arguments: Value::Null,
        };
        let err = tools.dispatch(&call).unwrap_err();
        assert!(err.contains("Unknown tool 'rm'"));
        assert!(err.contains("echo"));
    }

    #[test]
    fn test_tool_call_accepts_args_alias() {
        let call: ToolCall =
            serde_json::from_str(r#"{"name": "echo", "args": {"text": "x"}}"#).unwrap();
        assert_eq!(call.arguments, json!({ "text": "x" }));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Toolset::new().describe(), "No tools available.");
        let described = Toolset::new().with(Echo).with(Echo).describe();
        assert_eq!(described.matches("- echo").count(), 1);
    }
}
