//! Error types for the analysis pipeline.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running the pipeline or one of its agents.
#[derive(Error, Debug)]
pub enum Error {
    /// The request URL is not a well-formed absolute http(s) URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The scraping service was unreachable, blocked the request or timed out
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The reasoning engine could not be reached
    #[error("Reasoning engine error: {0}")]
    Model(String),

    /// The reasoning loop ran out of steps before producing an answer
    #[error("Maximum reasoning steps ({0}) reached")]
    MaxSteps(usize),

    /// The final answer could not be turned into the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A stage did not finish before the request deadline
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The caller-visible failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Error::Fetch(_) => ErrorKind::FetchFailure,
            Error::Model(_) | Error::MaxSteps(_) | Error::Deserialization(_) => {
                ErrorKind::ExtractionFailure
            }
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

/// Failure categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "InvalidURL")]
    InvalidUrl,
    FetchFailure,
    ExtractionFailure,
    Timeout,
    Config,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Scrape,
    Summarize,
    Evaluate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Scrape => "scrape",
            Stage::Summarize => "summarize",
            Stage::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed pipeline run: the stage that failed and why.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PipelineError", 4)?;
        state.serialize_field("success", &false)?;
        state.serialize_field("stage", &self.stage)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.source.to_string())?;
        state.end()
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
