pub mod chunker;
pub mod config;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod source;
pub mod summarizer;
pub mod tokenizer;
pub mod translator;
pub mod types;

pub use config::{Config, LlmConfig, PipelineConfig, SourceConfig, TranslationConfig};
pub use error::{ErrorKind, Result, TldwError};
pub use format::{format_info, format_stats, format_summary_readable};
pub use orchestrator::{MapReduce, MapReduceOutput, Progress, plan_batches};
pub use pipeline::{summarize_video, summarize_video_with_progress};
pub use prompt::{PromptKind, render};
pub use provider::{Provider, ProviderConfig};
pub use source::{TranscriptSource, YtDlp};
pub use summarizer::{ChatCompletionsClient, Summarizer, SummaryRequest};
pub use tokenizer::count_tokens;
pub use translator::{GoogleTranslator, TargetLanguage, Translator};
pub use types::{Chunk, Document, PartialSummary, RunStats, Stage, SummaryOutcome, VideoInfo};
