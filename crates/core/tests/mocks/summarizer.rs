use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tldw_core::{PromptKind, Result, Summarizer, SummaryRequest, TldwError};

/// What the mock does for one request: wait, then answer or fail.
pub type Behavior = dyn Fn(&SummaryRequest) -> (Duration, std::result::Result<String, String>)
    + Send
    + Sync;

#[derive(Clone)]
pub struct MockSummarizer {
    pub requests: Arc<Mutex<Vec<SummaryRequest>>>,
    pub max_in_flight: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    behavior: Arc<Behavior>,
}

/// First word of the chunk, e.g. "bravo" for "\n\nbravo the the".
pub fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

pub fn default_reply(request: &SummaryRequest) -> String {
    match request.prompt_kind {
        PromptKind::Map => format!("summary of {}", first_word(&request.source_text)),
        PromptKind::Combine => format!(
            "combined {} parts",
            request.source_text.split("\n\n").count()
        ),
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::with_behavior(|request| (Duration::ZERO, Ok(default_reply(request))))
    }
}

impl MockSummarizer {
    pub fn with_behavior(
        behavior: impl Fn(&SummaryRequest) -> (Duration, std::result::Result<String, String>)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            behavior: Arc::new(behavior),
        }
    }

    /// Delay map calls whose chunk starts with `word`.
    pub fn delaying(delays: &'static [(&'static str, u64)]) -> Self {
        Self::with_behavior(move |request| {
            let word = first_word(&request.source_text);
            let delay = delays
                .iter()
                .find(|(w, _)| *w == word)
                .map(|(_, ms)| Duration::from_millis(*ms))
                .unwrap_or(Duration::ZERO);
            (delay, Ok(default_reply(request)))
        })
    }

    /// Fail map calls for the chunk starting with `word`.
    pub fn failing_on(word: &'static str) -> Self {
        Self::with_behavior(move |request| {
            if request.prompt_kind == PromptKind::Map && first_word(&request.source_text) == word {
                (Duration::ZERO, Err(format!("backend rejected {}", word)))
            } else {
                (Duration::ZERO, Ok(default_reply(request)))
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_of(&self, kind: PromptKind) -> Vec<SummaryRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.prompt_kind == kind)
            .cloned()
            .collect()
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let (delay, result) = (self.behavior)(request);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result.map_err(|message| TldwError::Api {
            status: 500,
            message,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
