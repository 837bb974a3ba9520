use serde::{Deserialize, Serialize};

use crate::tokenizer::count_tokens;

static MAP_TEMPLATE: &str = "You are a summarization assistant. Summarize the following text in as much detail as possible. Include all the main ideas, key points, and important details. Provide a thorough and complete summary of the content. Text: {text}";

static COMBINE_TEMPLATE: &str = "You now have multiple summaries. Combine all of these summaries into one comprehensive, detailed, and thorough final summary. Include all the main ideas and key points from each chunk. The final summary should provide a detailed and full understanding of the original content. Summaries: {text}";

/// Separator placed between partial summaries in a combine payload.
pub const SUMMARY_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    /// Detailed summary of one chunk.
    Map,
    /// Synthesis of several partial summaries.
    Combine,
}

impl PromptKind {
    fn template(self) -> &'static str {
        match self {
            PromptKind::Map => MAP_TEMPLATE,
            PromptKind::Combine => COMBINE_TEMPLATE,
        }
    }
}

/// Fill the template for `kind` with `payload`.
pub fn render(kind: PromptKind, payload: &str) -> String {
    kind.template().replace("{text}", payload.trim())
}

/// Tokens `kind`'s template adds around its payload.
pub fn template_tokens(kind: PromptKind) -> usize {
    count_tokens(&kind.template().replace("{text}", ""))
}

/// Join partial summaries into a combine payload.
pub fn join_summaries<'a>(summaries: impl IntoIterator<Item = &'a str>) -> String {
    summaries
        .into_iter()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}
