//! Pipeline Coordinator.
//!
//! Runs Scraper → Summarizer → Evaluator for one request. Each stage must
//! finish before the next starts, and the first failure ends the run with no
//! partial report.
//!
//! ```text
//! Start → Validated → Scraped → Summarized → Evaluated → Done
//!   └──────────┴──────────┴──────────┴────────────┴→ Failed(stage)
//! ```

use crate::agents::{EvaluationTarget, EvaluatorAgent, ScraperAgent, SummarizerAgent};
use crate::config::Settings;
use crate::engine::{ChatClient, LanguageModel};
use crate::error::{Error, PipelineError, Stage};
use crate::model::{PipelineRequest, Report, ScrapeMeta};
use crate::scrape::{ScrapeCollaborator, ScrapingAntClient};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Progress of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Validated,
    Scraped,
    Summarized,
    Evaluated,
    Done,
    Failed(Stage),
}

impl PipelineState {
    /// The stage that runs from this state, if any.
    pub fn active_stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Start => Some(Stage::Validate),
            PipelineState::Validated => Some(Stage::Scrape),
            PipelineState::Scraped => Some(Stage::Summarize),
            PipelineState::Summarized => Some(Stage::Evaluate),
            PipelineState::Evaluated | PipelineState::Done | PipelineState::Failed(_) => None,
        }
    }

    /// The next state on success. Terminal states stay where they are.
    pub fn advance(self) -> Self {
        match self {
            PipelineState::Start => PipelineState::Validated,
            PipelineState::Validated => PipelineState::Scraped,
            PipelineState::Scraped => PipelineState::Summarized,
            PipelineState::Summarized => PipelineState::Evaluated,
            PipelineState::Evaluated => PipelineState::Done,
            terminal => terminal,
        }
    }

    /// The failed state for the active stage.
    pub fn fail(self) -> Self {
        match self.active_stage() {
            Some(stage) => PipelineState::Failed(stage),
            None => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

/// Readiness of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
}

/// Agent readiness, built once at process start and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentStatus>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three pipeline agents, all active.
    pub fn standard() -> Self {
        Self::new()
            .with(ScraperAgent::NAME, AgentStatus::Active)
            .with(SummarizerAgent::NAME, AgentStatus::Active)
            .with(EvaluatorAgent::NAME, AgentStatus::Active)
    }

    pub fn with(mut self, name: &str, status: AgentStatus) -> Self {
        self.agents.insert(name.to_string(), status);
        self
    }

    pub fn status(&self, name: &str) -> Option<AgentStatus> {
        self.agents.get(name).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, AgentStatus> {
        self.agents.clone()
    }
}

/// Sequences the three agents for each request.
pub struct Coordinator {
    scraper: ScraperAgent,
    summarizer: SummarizerAgent,
    evaluator: EvaluatorAgent,
    registry: Arc<AgentRegistry>,
    request_timeout: Duration,
}

impl Coordinator {
    /// Build a coordinator over any model and scraping service, with each
    /// agent's default loop configuration.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        model_name: &str,
        collaborator: Arc<dyn ScrapeCollaborator>,
        registry: Arc<AgentRegistry>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            scraper: ScraperAgent::new(
                model.clone(),
                collaborator,
                ScraperAgent::default_config(model_name),
            ),
            summarizer: SummarizerAgent::new(
                model.clone(),
                SummarizerAgent::default_config(model_name),
            ),
            evaluator: EvaluatorAgent::new(model, EvaluatorAgent::default_config(model_name)),
            registry,
            request_timeout,
        }
    }

    /// Build a coordinator backed by DeepSeek and ScrapingAnt.
    pub fn from_settings(settings: &Settings, registry: Arc<AgentRegistry>) -> Self {
        let model: Arc<dyn LanguageModel> = Arc::new(ChatClient::new(
            settings.deepseek_base_url.as_str(),
            settings.deepseek_api_key.as_str(),
            settings.model_timeout,
        ));
        let collaborator: Arc<dyn ScrapeCollaborator> = Arc::new(
            ScrapingAntClient::new(settings.scrapingant_api_key.as_str(), settings.scrape_timeout)
                .render_js(settings.render_js),
        );

        info!("pipeline: agents scraper, summarizer, evaluator using {}", settings.model);
        Self::new(
            model,
            &settings.model,
            collaborator,
            registry,
            settings.request_timeout,
        )
    }

    /// Readiness per agent. No side effects.
    pub fn health(&self) -> BTreeMap<String, AgentStatus> {
        self.registry.snapshot()
    }

    /// Run the whole pipeline for `url`.
    pub async fn analyze(
        &self,
        url: &str,
        company_name: Option<String>,
    ) -> Result<Report, PipelineError> {
        let deadline = Instant::now() + self.request_timeout;
        let mut state = PipelineState::Start;

        info!("pipeline: starting analysis of {}", url);

        let request = PipelineRequest::new(url, company_name)
            .map_err(|e| self.failed(&mut state, e))?;
        self.transition(&mut state);
        info!("pipeline: company: {}", request.company_label());

        let scraped = self
            .within(deadline, self.scraper.scrape(&request.url))
            .await
            .map_err(|e| self.failed(&mut state, e))?;
        self.transition(&mut state);

        let competitive = self
            .within(
                deadline,
                self.summarizer.summarize(&scraped.analysis, &scraped.page.raw_text),
            )
            .await
            .map_err(|e| self.failed(&mut state, e))?;
        self.transition(&mut state);

        let target = EvaluationTarget {
            url: request.url.as_str(),
            company: request.company_label(),
        };
        let evaluation = self
            .within(deadline, self.evaluator.evaluate_against(&competitive, Some(target)))
            .await
            .map_err(|e| self.failed(&mut state, e))?;
        self.transition(&mut state);

        let report = Report {
            url: request.url.to_string(),
            company: request.company_label().to_string(),
            scrape_meta: ScrapeMeta {
                title: scraped.page.title.clone(),
                chars: scraped.page.chars(),
            },
            summary: competitive.render_summary(),
            company_analysis: scraped.analysis,
            competitive_analysis: competitive,
            evaluation_result: evaluation,
            timestamp: chrono::Utc::now(),
        };
        self.transition(&mut state);

        info!("pipeline: analysis of {} completed", report.url);
        Ok(report)
    }

    /// Bound `stage` by the request deadline.
    async fn within<T, F>(&self, deadline: Instant, stage: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout_at(deadline, stage)
            .await
            .map_err(|_| Error::Timeout(self.request_timeout))?
    }

    fn transition(&self, state: &mut PipelineState) {
        let next = state.advance();
        debug!("pipeline: {:?} -> {:?}", state, next);
        *state = next;
    }

    fn failed(&self, state: &mut PipelineState, source: Error) -> PipelineError {
        let stage = state.active_stage().unwrap_or(Stage::Evaluate);
        *state = state.fail();
        error!("pipeline: {} stage failed: {}", stage, source);
        PipelineError::new(stage, source)
    }
}
