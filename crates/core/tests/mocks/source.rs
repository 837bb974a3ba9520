use std::sync::{Arc, Mutex};

use tldw_core::{Document, Result, TldwError, TranscriptSource, VideoInfo};

#[derive(Clone)]
pub struct MockSource {
    pub transcript: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSource {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl TranscriptSource for MockSource {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoInfo> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(TldwError::source_unavailable(url, msg.as_str()));
        }
        Ok(VideoInfo {
            title: "Mock video".to_string(),
            description: "A video used in tests.".to_string(),
        })
    }

    async fn fetch_transcript(&self, url: &str) -> Result<Document> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(TldwError::source_unavailable(url, msg.as_str()));
        }
        Ok(Document::new(self.transcript.clone()))
    }
}
