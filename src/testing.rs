//! Test doubles for the model and the scraping service.

use crate::engine::{CompletionRequest, LanguageModel};
use crate::error::{Error, Result};
use crate::scrape::{FetchedPage, ScrapeCollaborator};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replies with a fixed script, one reply per call. Errors once the script
/// runs out.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        Box::pin(async move { reply.ok_or_else(|| Error::Model("script exhausted".to_string())) })
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowModel;

impl LanguageModel for SlowModel {
    fn complete<'a>(&'a self, _request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(Error::Model("too slow".to_string()))
        })
    }
}

/// Returns the same page for every URL and counts fetches.
pub struct StaticScraper {
    page: FetchedPage,
    fetches: AtomicUsize,
}

impl StaticScraper {
    pub fn new(title: &str, raw_text: &str) -> Arc<Self> {
        Arc::new(Self {
            page: FetchedPage {
                title: title.to_string(),
                raw_text: raw_text.to_string(),
            },
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ScrapeCollaborator for StaticScraper {
    fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<FetchedPage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let page = self.page.clone();
        Box::pin(async move { Ok(page) })
    }
}

/// Fails every fetch, as a blocked or unreachable site would.
pub struct FailingScraper {
    fetches: AtomicUsize,
}

impl FailingScraper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ScrapeCollaborator for FailingScraper {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchedPage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Err(Error::Fetch(format!("HTTP error 403 for {}", url))) })
    }
}
