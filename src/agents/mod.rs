//! The three pipeline agents.
//!
//! 1. **Scraper**: fetches the page and extracts a [`CompanyAnalysis`](crate::model::CompanyAnalysis)
//! 2. **Summarizer**: turns it into a SWOT-style [`CompetitiveAnalysis`](crate::model::CompetitiveAnalysis)
//! 3. **Evaluator**: scores the analysis into an [`EvaluationResult`](crate::model::EvaluationResult)

mod evaluator;
mod scraper;
mod summarizer;

pub use evaluator::{EvaluationTarget, EvaluatorAgent};
pub use scraper::{MIN_ANALYZABLE_WORDS, SCRAPER_PROMPT_CHARS, Scraped, ScraperAgent};
pub use summarizer::{SUMMARY_WORDS, SummarizerAgent, merge_tactics};
