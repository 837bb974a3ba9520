use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokenizer::count_tokens;

/// Raw transcript text plus its token estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub estimated_token_count: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let estimated_token_count = count_tokens(&text);
        Self {
            text,
            estimated_token_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A token-bounded slice of a [`Document`].
///
/// Offsets are byte offsets into the document text. `start_offset..fresh_offset`
/// repeats the tail of the previous chunk as context; `fresh_offset..end_offset`
/// is content no earlier chunk covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub start_offset: usize,
    pub fresh_offset: usize,
    pub end_offset: usize,
    pub token_count: usize,
}

impl Chunk {
    /// The part of this chunk not shared with its predecessor.
    pub fn fresh_text(&self) -> &str {
        &self.text[self.fresh_offset - self.start_offset..]
    }

    /// The overlap carried over from the previous chunk.
    pub fn overlap_text(&self) -> &str {
        &self.text[..self.fresh_offset - self.start_offset]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSummary {
    pub text: String,
    pub token_count: usize,
}

impl PartialSummary {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let token_count = count_tokens(&text);
        Self { text, token_count }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub description: String,
}

/// Which phase of the map-reduce a backend call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Map,
    Combine { round: usize },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Map => write!(f, "map"),
            Stage::Combine { round } => write!(f, "combine (round {})", round),
        }
    }
}

/// Token and call accounting for one summarization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub transcript_tokens: usize,
    pub chunk_count: usize,
    pub map_calls: usize,
    pub combine_calls: usize,
    pub reduce_rounds: usize,
    pub summary_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutcome {
    pub summary: String,
    /// Display name of the language `summary` is written in.
    pub language: String,
    pub translated: bool,
    /// Set when translation was requested but failed; `summary` is then untranslated.
    pub warning: Option<String>,
    pub stats: RunStats,
}
