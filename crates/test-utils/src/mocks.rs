//! Scripted stand-ins for the network sources.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use canopy_common::{
    BoundingBox, CanopyError, CanopyResult, FeatureSet, FeatureSource, PageSummary, SummarySource,
};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockResponse<T> {
    Ok(T),
    NetworkError,
    ParseError,
    HttpStatus(u16),
}

impl<T> MockResponse<T> {
    fn into_result(self) -> CanopyResult<T> {
        match self {
            MockResponse::Ok(value) => Ok(value),
            MockResponse::NetworkError => Err(CanopyError::Network("connection reset".into())),
            MockResponse::ParseError => Err(CanopyError::Parse("unexpected token".into())),
            MockResponse::HttpStatus(status) => Err(CanopyError::HttpStatus {
                status,
                url: "http://mock.invalid".into(),
            }),
        }
    }
}

struct Scripted<T> {
    delay: Duration,
    response: MockResponse<T>,
}

/// Feature source answering from a queue of scripted responses.
///
/// When the queue is empty it answers with the fallback (an empty set by
/// default) after the default delay.
pub struct MockFeatureSource {
    script: Mutex<VecDeque<Scripted<FeatureSet>>>,
    fallback: Mutex<FeatureSet>,
    default_delay: Duration,
    calls: AtomicUsize,
    requested: Mutex<Vec<BoundingBox>>,
}

impl MockFeatureSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(FeatureSet::empty()),
            default_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_fallback(self, features: FeatureSet) -> Self {
        *self.fallback.lock().unwrap() = features;
        self
    }

    /// Queue a response returned by the next unanswered call.
    pub fn push(&self, delay: Duration, response: MockResponse<FeatureSet>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted { delay, response });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_bounds(&self) -> Vec<BoundingBox> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockFeatureSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureSource for MockFeatureSource {
    async fn query(&self, bounds: &BoundingBox) -> CanopyResult<FeatureSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(*bounds);

        let next = self.script.lock().unwrap().pop_front();
        let (delay, response) = match next {
            Some(s) => (s.delay, s.response),
            None => (
                self.default_delay,
                MockResponse::Ok(self.fallback.lock().unwrap().clone()),
            ),
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response.into_result()
    }
}

/// Summary source answering per title, with a fixed latency.
pub struct MockSummarySource {
    responses: Mutex<HashMap<String, MockResponse<PageSummary>>>,
    delay: Duration,
    calls: AtomicUsize,
    titles: Mutex<Vec<String>>,
}

impl MockSummarySource {
    pub fn new(delay: Duration) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay,
            calls: AtomicUsize::new(0),
            titles: Mutex::new(Vec::new()),
        }
    }

    /// Script the answer for `title`. Unscripted titles get an empty summary.
    pub fn respond(&self, title: &str, response: MockResponse<PageSummary>) {
        self.responses
            .lock()
            .unwrap()
            .insert(title.to_string(), response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Titles requested so far, in call order.
    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarySource for MockSummarySource {
    async fn fetch_summary(&self, title: &str) -> CanopyResult<PageSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.titles.lock().unwrap().push(title.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(title)
            .cloned()
            .unwrap_or(MockResponse::Ok(PageSummary::default()));
        response.into_result()
    }
}

/// A summary carrying a thumbnail, for tests that need "real" data.
pub fn summary_with_thumbnail(title: &str) -> PageSummary {
    PageSummary {
        title: Some(title.to_string()),
        thumbnail: Some(canopy_common::summary::Thumbnail {
            source: format!("https://upload.example/{}.jpg", title),
        }),
        extract_html: Some(format!("<p>{}</p>", title)),
        content_urls: None,
    }
}
