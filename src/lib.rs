//! Rivalscope - competitive intelligence from a single URL
//!
//! A request flows through three agents, each handing a structured result to
//! the next:
//!
//! 1. **Scraper** fetches the page through a scraping service and extracts a
//!    [`CompanyAnalysis`]
//! 2. **Summarizer** combines it with the page text and deterministic
//!    contact/pricing extractors into a [`CompetitiveAnalysis`]
//! 3. **Evaluator** scores the analysis into an [`EvaluationResult`]
//!
//! Every agent drives a bounded [`ReasoningLoop`]: the model may call the
//! agent's tools, then must answer with JSON matching the expected schema
//! within a fixed number of steps.
//!
//! # Quick Start
//!
//! ```ignore
//! use rivalscope::{AgentRegistry, Coordinator, Settings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let registry = Arc::new(AgentRegistry::standard());
//!     let pipeline = Coordinator::from_settings(&settings, registry);
//!
//!     let report = pipeline.analyze("https://example.com", None).await?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

pub mod agents;
mod config;
pub mod engine;
mod error;
pub mod extract;
mod model;
mod pipeline;
pub mod scrape;
pub mod text;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use engine::{LanguageModel, LoopConfig, ReasoningLoop, StructuredOutput, Tool, Toolset};
pub use error::{Error, ErrorKind, PipelineError, Result, Stage};
pub use model::{
    CompanyAnalysis, CompetitiveAnalysis, EvaluationResult, PipelineRequest, Report, ScrapeMeta,
    Tactics, UNKNOWN_COMPANY,
};
pub use pipeline::{AgentRegistry, AgentStatus, Coordinator, PipelineState};
pub use scrape::{FetchedPage, ScrapeCollaborator};
