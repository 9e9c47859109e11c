//! Evaluator Agent: one-shot quality gate.
//!
//! The verdict is terminal. A failing evaluation is reported, not fed back
//! to the Summarizer.

use crate::engine::{LanguageModel, LoopConfig, ReasoningLoop, Toolset, tracing_callbacks};
use crate::error::Result;
use crate::model::{CompetitiveAnalysis, EvaluationResult};
use std::sync::Arc;
use tracing::{error, info};

const EVALUATOR_SYSTEM: &str = r#"You validate competitive analyses. Judge the analysis against three criteria:

- complete: it covers value proposition, strengths, threats, opportunities and recommendations
- relevant: its content is about the requested company and URL
- actionable: its recommendations translate into concrete next steps

Answer each criterion with true or false, list the strong points and suggest improvements.
Be objective and constructive."#;

/// What the analysis is supposed to be about.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationTarget<'a> {
    pub url: &'a str,
    pub company: &'a str,
}

/// Scores a [`CompetitiveAnalysis`] in a single reasoning pass with no tools.
pub struct EvaluatorAgent {
    model: Arc<dyn LanguageModel>,
    config: LoopConfig,
}

impl EvaluatorAgent {
    pub const NAME: &'static str = "evaluator";

    pub fn new(model: Arc<dyn LanguageModel>, config: LoopConfig) -> Self {
        Self { model, config }
    }

    /// Loop configuration used when none is supplied.
    pub fn default_config(model: &str) -> LoopConfig {
        LoopConfig::new(model)
            .temperature(0.1)
            .max_steps(1)
            .system(EVALUATOR_SYSTEM)
    }

    pub async fn evaluate(&self, analysis: &CompetitiveAnalysis) -> Result<EvaluationResult> {
        self.evaluate_against(analysis, None).await
    }

    /// Evaluate with the requested URL and company available for the relevance check.
    pub async fn evaluate_against(
        &self,
        analysis: &CompetitiveAnalysis,
        target: Option<EvaluationTarget<'_>>,
    ) -> Result<EvaluationResult> {
        info!("evaluator: validating analysis of '{}'", analysis.company);

        let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_default();
        let target = match target {
            Some(t) => format!("Requested company: {}\nRequested URL: {}\n\n", t.company, t.url),
            None => String::new(),
        };
        let task = format!(
            "{target}Competitive analysis to validate:\n```json\n{analysis_json}\n```\n\n\
             Is it complete? Is it relevant? Is it actionable? \
             What are its strong points and what should be improved?"
        );

        let mut run = ReasoningLoop::new(self.model.clone(), self.config.clone(), Toolset::new())
            .with_callbacks(tracing_callbacks(Self::NAME));
        let result: EvaluationResult = run
            .run(&task)
            .await
            .inspect_err(|e| error!("evaluator: validation failed: {}", e))?;

        info!(
            "evaluator: complete={} relevant={} actionable={}",
            result.complete, result.relevant, result.actionable
        );
        Ok(result)
    }
}
