//! ScrapingAnt client.

use super::{FetchedPage, ScrapeCollaborator, clean_html};
use crate::error::{Error, Result};
use crate::text::truncate_chars;
use futures::future::BoxFuture;
use std::time::Duration;

/// Characters of page text kept from a fetch.
pub const MAX_FETCH_CHARS: usize = 12_000;

const SCRAPINGANT_ENDPOINT: &str = "https://api.scrapingant.com/v2/general";

/// Fetches pages through ScrapingAnt with browser rendering and a US
/// datacenter proxy.
#[derive(Clone)]
pub struct ScrapingAntClient {
    agent: ureq::Agent,
    api_key: String,
    endpoint: String,
    render_js: bool,
}

impl ScrapingAntClient {
    /// Create a client. `timeout` bounds the whole HTTP call.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            api_key: api_key.into(),
            endpoint: SCRAPINGANT_ENDPOINT.to_string(),
            render_js: true,
        }
    }

    /// Enable or disable JavaScript rendering.
    pub fn render_js(mut self, enabled: bool) -> Self {
        self.render_js = enabled;
        self
    }

    fn fetch_blocking(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("url", url)
            .query("browser", if self.render_js { "true" } else { "false" })
            .query("proxy_type", "datacenter")
            .query("proxy_country", "US")
            .header("x-api-key", &self.api_key)
            .call();

        let mut response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(Error::Fetch(format!("HTTP error {} for {}", code, url)));
            }
            Err(e) => return Err(Error::Fetch(format!("Request error for {}: {}", url, e))),
        };

        let html = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::Fetch(format!("Error reading body of {}: {}", url, e)))?;

        if html.trim().is_empty() {
            return Err(Error::Fetch(format!("No content returned for {}", url)));
        }

        Ok(page_from_html(&html))
    }
}

/// Page text led by the meta information the body does not already carry.
fn page_from_html(html: &str) -> FetchedPage {
    let digest = clean_html(html);
    let mut lead: Vec<String> = Vec::new();
    for line in [digest.description, digest.headline].into_iter().flatten() {
        if !digest.text.contains(&line) {
            lead.push(line);
        }
    }
    if let Some(keywords) = digest.keywords {
        lead.push(format!("Keywords: {}", keywords));
    }
    lead.push(digest.text);
    let raw_text = lead.join(" ");

    FetchedPage {
        title: digest.title,
        raw_text: truncate_chars(raw_text.trim(), MAX_FETCH_CHARS).to_string(),
    }
}

impl ScrapeCollaborator for ScrapingAntClient {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchedPage>> {
        let client = self.clone();
        let url = url.to_string();
        Box::pin(async move {
            tracing::debug!("scrapingant: fetching {}", url);
            // A blocking call outlives a cancelled request until the agent's
            // own timeout fires; its result is then dropped.
            tokio::task::spawn_blocking(move || client.fetch_blocking(&url))
                .await
                .map_err(|e| Error::Fetch(format!("Fetch task failed: {}", e)))?
        })
    }
}
