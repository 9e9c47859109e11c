//! Loop events and callbacks for observability.

use crate::text::preview;
use std::sync::{Arc, Mutex};

/// Events emitted while a reasoning loop runs.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// Starting a new step
    StepStart { step: usize, max_steps: usize },
    /// About to call the model
    ModelRequest { message_count: usize },
    /// The model responded
    ModelResponse { content: String },
    /// A tool was called
    ToolCall { name: String, arguments: serde_json::Value },
    /// A tool returned
    ToolResult { name: String, output: String, success: bool },
    /// The loop produced its structured result
    Finish { value: serde_json::Value },
    /// A recoverable or fatal problem in the loop
    Error { message: String },
}

/// Type alias for event callbacks
pub type EventCallback = Arc<dyn Fn(&LoopEvent) + Send + Sync>;

/// Storage for loop callbacks
#[derive(Default, Clone)]
pub struct LoopCallbacks {
    pub on_step_start: Option<EventCallback>,
    pub on_model_request: Option<EventCallback>,
    pub on_model_response: Option<EventCallback>,
    pub on_tool_call: Option<EventCallback>,
    pub on_tool_result: Option<EventCallback>,
    pub on_finish: Option<EventCallback>,
    pub on_error: Option<EventCallback>,
    /// Catch-all callback for any event
    pub on_event: Option<EventCallback>,
    pub(crate) captured_events: Option<Arc<Mutex<Vec<LoopEvent>>>>,
}

impl LoopCallbacks {
    /// Emit an event to the appropriate callback(s)
    pub fn emit(&self, event: &LoopEvent) {
        if let Some(ref events) = self.captured_events
            && let Ok(mut events) = events.lock()
        {
            events.push(event.clone());
        }

        let specific = match event {
            LoopEvent::StepStart { .. } => &self.on_step_start,
            LoopEvent::ModelRequest { .. } => &self.on_model_request,
            LoopEvent::ModelResponse { .. } => &self.on_model_response,
            LoopEvent::ToolCall { .. } => &self.on_tool_call,
            LoopEvent::ToolResult { .. } => &self.on_tool_result,
            LoopEvent::Finish { .. } => &self.on_finish,
            LoopEvent::Error { .. } => &self.on_error,
        };

        if let Some(cb) = specific {
            cb(event);
        }

        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }
}

/// Callbacks that forward loop events to `tracing`, tagged with the agent name.
pub fn tracing_callbacks(agent: &'static str) -> LoopCallbacks {
    LoopCallbacks {
        on_step_start: Some(Arc::new(move |e| {
            if let LoopEvent::StepStart { step, max_steps } = e {
                tracing::debug!("{}: step {}/{}", agent, step, max_steps);
            }
        })),
        on_model_response: Some(Arc::new(move |e| {
            if let LoopEvent::ModelResponse { content } = e {
                tracing::debug!("{}: model: {}", agent, preview(content, 200));
            }
        })),
        on_tool_call: Some(Arc::new(move |e| {
            if let LoopEvent::ToolCall { name, arguments } = e {
                tracing::info!("{}: tool {}({})", agent, name, arguments);
            }
        })),
        on_tool_result: Some(Arc::new(move |e| {
            if let LoopEvent::ToolResult { name, output, success } = e {
                let status = if *success { "ok" } else { "failed" };
                tracing::debug!("{}: tool {} {}: {}", agent, name, status, preview(output, 120));
            }
        })),
        on_error: Some(Arc::new(move |e| {
            if let LoopEvent::Error { message } = e {
                tracing::warn!("{}: {}", agent, message);
            }
        })),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_specific_and_catch_all() {
        let specific = Arc::new(AtomicUsize::new(0));
        let all = Arc::new(AtomicUsize::new(0));

        let s = specific.clone();
        let a = all.clone();
        let callbacks = LoopCallbacks {
            on_finish: Some(Arc::new(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })),
            on_event: Some(Arc::new(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        callbacks.emit(&LoopEvent::StepStart { step: 1, max_steps: 2 });
        callbacks.emit(&LoopEvent::Finish { value: serde_json::Value::Null });

        assert_eq!(specific.load(Ordering::SeqCst), 1);
        assert_eq!(all.load(Ordering::SeqCst), 2);
    }
}
