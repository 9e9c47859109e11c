//! The external scraping service.
//!
//! The service handles proxying and JavaScript rendering. The pipeline treats
//! it as an opaque fetch returning a title and the page's visible text.

mod html;
mod scrapingant;

pub use html::{PageDigest, clean_html};
pub use scrapingant::{MAX_FETCH_CHARS, ScrapingAntClient};

use crate::error::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// A fetched page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub title: String,
    pub raw_text: String,
}

impl FetchedPage {
    /// Number of characters retrieved.
    pub fn chars(&self) -> usize {
        self.raw_text.chars().count()
    }
}

/// Fetches a single page. Failures are reported as `Error::Fetch`.
pub trait ScrapeCollaborator: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchedPage>>;
}
