//! Scraper Agent: page fetch and company extraction.

use crate::engine::{
    LanguageModel, LoopConfig, ReasoningLoop, Tool, Toolset, tracing_callbacks,
};
use crate::error::Result;
use crate::model::CompanyAnalysis;
use crate::scrape::{FetchedPage, ScrapeCollaborator};
use crate::text::truncate_chars;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Characters of page text given to the reasoning pass.
pub const SCRAPER_PROMPT_CHARS: usize = 5_000;

/// Pages with fewer words than this skip the reasoning pass.
pub const MIN_ANALYZABLE_WORDS: usize = 5;

const SCRAPER_SYSTEM: &str = r#"You are an expert in collecting competitor data.

Tasks:
1. Read the page collected from the given URL
2. Extract commercially relevant information
3. Identify products, services, prices, customer segments and differentiators
4. Return structured data

Only report what the page supports. Be concise and focused on information useful for competitive analysis."#;

/// What the Scraper Agent hands to the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct Scraped {
    pub analysis: CompanyAnalysis,
    pub page: FetchedPage,
}

/// Serves the already-fetched page to the model. Never re-fetches.
struct PageTool {
    url: Url,
    title: String,
    content: String,
}

impl Tool for PageTool {
    fn name(&self) -> &'static str {
        "scrape_page"
    }

    fn description(&self) -> &'static str {
        "Return the title and text content collected from the analyzed URL"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "url": { "type": "string", "description": "The analyzed URL" } }
        })
    }

    fn invoke(&self, arguments: &Value) -> std::result::Result<Value, String> {
        if let Some(requested) = arguments.get("url").and_then(Value::as_str) {
            let same = Url::parse(requested).is_ok_and(|u| u == self.url);
            if !same {
                return Err(format!(
                    "only {} was collected in this session, not {}",
                    self.url, requested
                ));
            }
        }

        Ok(json!({
            "url": self.url.as_str(),
            "title": self.title,
            "content": self.content,
        }))
    }
}

/// Fetches a page once and extracts a [`CompanyAnalysis`] from it.
pub struct ScraperAgent {
    model: Arc<dyn LanguageModel>,
    collaborator: Arc<dyn ScrapeCollaborator>,
    config: LoopConfig,
}

impl ScraperAgent {
    pub const NAME: &'static str = "scraper";

    pub fn new(
        model: Arc<dyn LanguageModel>,
        collaborator: Arc<dyn ScrapeCollaborator>,
        config: LoopConfig,
    ) -> Self {
        Self {
            model,
            collaborator,
            config,
        }
    }

    /// Loop configuration used when none is supplied.
    pub fn default_config(model: &str) -> LoopConfig {
        LoopConfig::new(model)
            .temperature(0.2)
            .max_steps(4)
            .system(SCRAPER_SYSTEM)
    }

    /// Fetch `url` and extract the company behind it.
    pub async fn scrape(&self, url: &Url) -> Result<Scraped> {
        info!("scraper: collecting data from {}", url);

        let page = self
            .collaborator
            .fetch(url.as_str())
            .await
            .inspect_err(|e| error!("scraper: failed to collect {}: {}", url, e))?;

        debug!("scraper: retrieved {} characters, title '{}'", page.chars(), page.title);

        let excerpt = truncate_chars(&page.raw_text, SCRAPER_PROMPT_CHARS);
        if excerpt.split_whitespace().count() < MIN_ANALYZABLE_WORDS {
            warn!("scraper: {} has almost no text, skipping extraction", url);
            return Ok(Scraped {
                analysis: CompanyAnalysis::default(),
                page,
            });
        }

        let tools = Toolset::new().with(PageTool {
            url: url.clone(),
            title: page.title.clone(),
            content: excerpt.to_string(),
        });

        let task = format!(
            "Extract the company information from the page collected from {url}.\n\n\
             Title: {title}\n\n\
             <page>\n{excerpt}\n</page>\n\n\
             Report the company name, its offerings, pricing, customer segments, \
             differentiators, contact information and relevant links.",
            url = url,
            title = if page.title.is_empty() { "(none)" } else { page.title.as_str() },
            excerpt = excerpt,
        );

        let mut run = ReasoningLoop::new(self.model.clone(), self.config.clone(), tools)
            .with_callbacks(tracing_callbacks(Self::NAME));
        let analysis: CompanyAnalysis = run
            .run(&task)
            .await
            .inspect_err(|e| error!("scraper: extraction failed for {}: {}", url, e))?;

        info!(
            "scraper: extracted {} offerings for {}",
            analysis.offerings.len(),
            analysis.name.as_deref().unwrap_or("unnamed company")
        );

        Ok(Scraped { analysis, page })
    }
}
