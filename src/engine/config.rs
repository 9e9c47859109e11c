//! Reasoning loop configuration.

/// Default model name for the chat-completions endpoint.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Configuration for one reasoning loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// The model to use (e.g., "deepseek-chat")
    pub model: String,
    /// Maximum number of model calls before the loop gives up
    pub max_steps: usize,
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Maximum tokens for a single response
    pub max_tokens: Option<u32>,
    /// Role description embedded in the system prompt
    pub system: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_steps: 4,
            temperature: Some(0.2),
            max_tokens: Some(2048),
            system: None,
        }
    }
}

impl LoopConfig {
    /// Create a new config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the step budget. A budget of zero is raised to one.
    pub fn max_steps(mut self, n: usize) -> Self {
        self.max_steps = n.max(1);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Set the role description embedded in the system prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = LoopConfig::new("m").max_steps(0).temperature(0.1).system("judge");
        assert_eq!(config.model, "m");
        assert_eq!(config.max_steps, 1);
        assert_eq!(config.temperature, Some(0.1));
        assert_eq!(config.system.as_deref(), Some("judge"));
    }
}
