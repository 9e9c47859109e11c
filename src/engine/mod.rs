//! Bounded, tool-augmented reasoning loop.
//!
//! The loop sends a system prompt and a task to a [`LanguageModel`], then
//! alternates between model replies and tool observations. It ends when the
//! model replies with a `<finish>` block (or bare JSON) that validates against
//! the caller's schema, or fails once the step budget is spent. A step is one
//! model call.

mod config;
mod events;
mod llm;
mod prompt;
mod tool;

pub use config::{DEFAULT_MODEL, LoopConfig};
pub use events::{LoopCallbacks, LoopEvent, tracing_callbacks};
pub use llm::{ChatClient, CompletionRequest, DEFAULT_BASE_URL, LanguageModel, Message, Role};
pub use tool::{Tool, ToolCall, Toolset};

use crate::error::{Error, Result};
use prompt::{DEFAULT_SYSTEM, INVALID_ANSWER_TEMPLATE, SYSTEM_PROMPT_TEMPLATE};
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::{Arc, LazyLock, Mutex};

static TOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<tool>\s*([\s\S]*?)</tool>").expect("valid tool pattern"));

static FINISH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<finish>\s*([\s\S]*?)</finish>").expect("valid finish pattern"));

/// A type the loop can produce as its final answer.
pub trait StructuredOutput: DeserializeOwned + Serialize {
    /// Type name shown to the model.
    const NAME: &'static str;

    /// JSON Schema the answer must satisfy.
    fn schema() -> Value;
}

/// One run of the reasoning loop over a fixed toolset.
pub struct ReasoningLoop {
    model: Arc<dyn LanguageModel>,
    config: LoopConfig,
    tools: Toolset,
    messages: Vec<Message>,
    callbacks: LoopCallbacks,
}

impl ReasoningLoop {
    /// Create a loop with the given model, configuration and tools.
    pub fn new(model: Arc<dyn LanguageModel>, config: LoopConfig, tools: Toolset) -> Self {
        Self {
            model,
            config,
            tools,
            messages: Vec::new(),
            callbacks: LoopCallbacks::default(),
        }
    }

    /// Replace the callbacks.
    pub fn with_callbacks(mut self, callbacks: LoopCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Enable event capture.
    pub fn capture_events(mut self, enabled: bool) -> Self {
        self.callbacks.captured_events = enabled.then(|| Arc::new(Mutex::new(Vec::new())));
        self
    }

    /// Take captured events.
    pub fn take_events(&mut self) -> Vec<LoopEvent> {
        if let Some(ref events) = self.callbacks.captured_events
            && let Ok(mut events) = events.lock()
        {
            return std::mem::take(&mut *events);
        }
        Vec::new()
    }

    /// The conversation of the last run.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn emit(&self, event: LoopEvent) {
        self.callbacks.emit(&event);
    }

    fn system_prompt<T: StructuredOutput>(&self) -> String {
        let system = self.config.system.as_deref().unwrap_or(DEFAULT_SYSTEM);
        let schema = serde_json::to_string_pretty(&T::schema()).unwrap_or_default();
        SYSTEM_PROMPT_TEMPLATE
            .replace("{system}", system)
            .replace("{tools}", &self.tools.describe())
            .replace("{output}", T::NAME)
            .replace("{schema}", &schema)
    }

    fn extract_finish(&self, text: &str) -> Option<String> {
        FINISH_RE
            .captures(text)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn extract_tool_call(&self, text: &str) -> Option<String> {
        TOOL_RE
            .captures(text)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Run a tool call and format the observation for the model.
    fn execute_tool(&self, raw: &str) -> String {
        let call: ToolCall = match serde_json::from_str(strip_code_fences(raw)) {
            Ok(call) => call,
            Err(e) => {
                self.emit(LoopEvent::Error {
                    message: format!("Malformed <tool> block: {}", e),
                });
                return format!("Error: malformed <tool> block: {}", e);
            }
        };

        self.emit(LoopEvent::ToolCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });

        let (output, success) = match self.tools.dispatch(&call) {
            Ok(value) => (render_value(&value), true),
            Err(e) => (format!("Error: {}", e), false),
        };

        self.emit(LoopEvent::ToolResult {
            name: call.name,
            output: output.clone(),
            success,
        });
        output
    }

    async fn call_model(&self) -> Result<String> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: self.messages.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        self.model.complete(&request).await
    }

    /// Run the loop on `task` and return the validated result.
    pub async fn run<T: StructuredOutput>(&mut self, task: &str) -> Result<T> {
        let schema = T::schema();
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::Config(format!("Invalid schema for {}: {}", T::NAME, e)))?;

        self.messages.clear();
        self.messages.push(Message::system(self.system_prompt::<T>()));
        self.messages.push(Message::user(task));

        let max_steps = self.config.max_steps.max(1);

        for step in 1..=max_steps {
            self.emit(LoopEvent::StepStart { step, max_steps });
            self.emit(LoopEvent::ModelRequest {
                message_count: self.messages.len(),
            });

            let text = match self.call_model().await {
                Ok(text) => text,
                Err(e) => {
                    self.emit(LoopEvent::Error { message: e.to_string() });
                    return Err(e);
                }
            };

            self.emit(LoopEvent::ModelResponse { content: text.clone() });
            self.messages.push(Message::assistant(text.clone()));

            // A <finish> block wins over anything else in the same reply
            let answer = match self.extract_finish(&text) {
                Some(answer) => answer,
                None => match self.extract_tool_call(&text) {
                    Some(raw) => {
                        let output = self.execute_tool(&raw);
                        self.messages
                            .push(Message::user(format!("Tool output:\n```\n{}\n```", output)));
                        continue;
                    }
                    None => text.trim().to_string(),
                },
            };

            match parse_answer::<T>(&validator, &answer) {
                Ok((value, result)) => {
                    self.emit(LoopEvent::Finish { value });
                    return Ok(result);
                }
                Err(problem) => {
                    self.emit(LoopEvent::Error {
                        message: format!("Invalid {} answer: {}", T::NAME, problem),
                    });

                    if step >= max_steps {
                        return Err(Error::Deserialization(format!(
                            "Invalid {} answer: {}",
                            T::NAME,
                            problem
                        )));
                    }

                    self.messages.push(Message::user(
                        INVALID_ANSWER_TEMPLATE
                            .replace("{error}", &problem)
                            .replace("{output}", &answer),
                    ));
                }
            }
        }

        self.emit(LoopEvent::Error {
            message: format!("Max steps ({}) reached", max_steps),
        });
        Err(Error::MaxSteps(max_steps))
    }
}

/// Validate `answer` against the schema, then deserialize it.
fn parse_answer<T: StructuredOutput>(
    validator: &jsonschema::Validator,
    answer: &str,
) -> std::result::Result<(Value, T), String> {
    let value: Value = serde_json::from_str(strip_code_fences(answer))
        .map_err(|e| format!("not valid JSON: {}", e))?;

    let problems: Vec<String> = validator
        .iter_errors(&value)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let result = serde_json::from_value::<T>(value.clone()).map_err(|e| e.to_string())?;
    Ok((value, result))
}

/// Remove a surrounding ```json / ``` fence, if any.
pub fn strip_code_fences(s: &str) -> &str {
    let mut s = s.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvaluationResult;
    use crate::testing::ScriptedModel;
    use serde_json::json;

    struct Shout;

    impl Tool for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn description(&self) -> &'static str {
            "Upper-case the text argument"
        }

        fn invoke(&self, arguments: &Value) -> std::result::Result<Value, String> {
            let text = arguments.get("text").and_then(Value::as_str).ok_or("missing 'text'")?;
            Ok(json!(text.to_uppercase()))
        }
    }

    const VERDICT: &str =
        r#"{"complete": true, "relevant": true, "actionable": false, "improvements": ["add owners"]}"#;

    fn new_loop(model: &Arc<ScriptedModel>, max_steps: usize) -> ReasoningLoop {
        let model: Arc<dyn LanguageModel> = model.clone();
        ReasoningLoop::new(
            model,
            LoopConfig::new("test").max_steps(max_steps),
            Toolset::new().with(Shout),
        )
        .capture_events(true)
    }

    #[test]
    fn test_extract_finish_block() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let agent = new_loop(&model, 1);

        let text = "Here it is:\n<finish>\n{\"complete\": true}\n</finish>\nDone.";
        assert_eq!(agent.extract_finish(text), Some("{\"complete\": true}".to_string()));
        assert_eq!(agent.extract_finish("The answer is 42."), None);
    }

    #[test]
    fn test_extract_tool_call() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let agent = new_loop(&model, 1);

        let text = "Let me look.\n<tool>{\"name\": \"shout\", \"arguments\": {\"text\": \"a\"}}</tool>";
        let raw = agent.extract_tool_call(text).unwrap();
        assert!(raw.starts_with("{\"name\""));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_system_prompt_includes_tools_and_schema() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let agent = new_loop(&model, 1);

        let prompt = agent.system_prompt::<EvaluationResult>();
        assert!(prompt.contains("- shout: Upper-case the text argument"));
        assert!(prompt.contains("EvaluationResult"));
        assert!(prompt.contains("\"actionable\""));
        assert!(prompt.starts_with(DEFAULT_SYSTEM));
    }

    #[tokio::test]
    async fn test_finish_on_first_step() {
        let model = ScriptedModel::new([format!("<finish>{}</finish>", VERDICT)]);
        let mut agent = new_loop(&model, 3);

        let result: EvaluationResult = agent.run("judge this").await.unwrap();
        assert!(result.complete && !result.actionable);
        assert_eq!(result.improvements, vec!["add owners"]);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_tool_then_finish() {
        let model = ScriptedModel::new([
            r#"<tool>{"name": "shout", "arguments": {"text": "acme"}}</tool>"#.to_string(),
            format!("<finish>{}</finish>", VERDICT),
        ]);
        let mut agent = new_loop(&model, 3);

        let _: EvaluationResult = agent.run("judge this").await.unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        // system, task, tool call, observation, answer
        assert_eq!(agent.messages().len(), 5);
        assert_eq!(agent.messages()[3].role, Role::User);
        let observation = &requests[1].messages.last().unwrap().content;
        assert!(observation.contains("ACME"));

        let events = agent.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            LoopEvent::ToolResult { name, success: true, .. } if name == "shout"
        )));
        assert!(events.iter().any(|e| matches!(e, LoopEvent::Finish { .. })));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observation() {
        let model = ScriptedModel::new([
            r#"<tool>{"name": "browse", "arguments": {}}</tool>"#.to_string(),
            VERDICT.to_string(),
        ]);
        let mut agent = new_loop(&model, 2);

        let result: EvaluationResult = agent.run("judge").await.unwrap();
        assert!(result.relevant);

        let requests = model.requests();
        let observation = &requests[1].messages.last().unwrap().content;
        assert!(observation.contains("Unknown tool 'browse'"));
    }

    #[tokio::test]
    async fn test_bare_fenced_json_is_accepted() {
        let model = ScriptedModel::new([format!("```json\n{}\n```", VERDICT)]);
        let mut agent = new_loop(&model, 1);

        let result: EvaluationResult = agent.run("judge").await.unwrap();
        assert!(result.complete);
    }

    #[tokio::test]
    async fn test_invalid_answer_gets_feedback_then_succeeds() {
        let model = ScriptedModel::new([
            r#"<finish>{"complete": "yes"}</finish>"#.to_string(),
            format!("<finish>{}</finish>", VERDICT),
        ]);
        let mut agent = new_loop(&model, 2);

        let _: EvaluationResult = agent.run("judge").await.unwrap();
        let requests = model.requests();
        let feedback = &requests[1].messages.last().unwrap().content;
        assert!(feedback.starts_with("Error parsing your answer"));
    }

    #[tokio::test]
    async fn test_invalid_answer_on_last_step_fails() {
        let model = ScriptedModel::new(["I think it is fine.".to_string()]);
        let mut agent = new_loop(&model, 1);

        let err = agent.run::<EvaluationResult>("judge").await.unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_step_budget_exhausted() {
        let call = r#"<tool>{"name": "shout", "arguments": {"text": "again"}}</tool>"#;
        let model = ScriptedModel::new([call, call, call, call].map(String::from));
        let mut agent = new_loop(&model, 3);

        let err = agent.run::<EvaluationResult>("judge").await.unwrap_err();
        assert!(matches!(err, Error::MaxSteps(3)));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let mut agent = new_loop(&model, 3);

        let err = agent.run::<EvaluationResult>("judge").await.unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }
}
