//! Map-reduce over transcript chunks.
//!
//! Map: one summary per chunk, `concurrency` calls in flight, kept in chunk
//! order. Reduce: consecutive partial summaries are batched under the combine
//! budget and merged round after round until one remains.

use std::{
    ops::Range,
    sync::atomic::{AtomicUsize, Ordering},
};

use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::{
    chunker,
    config::PipelineConfig,
    error::{Result, TldwError},
    prompt::{PromptKind, SUMMARY_SEPARATOR, join_summaries, template_tokens},
    summarizer::{Summarizer, SummaryRequest},
    tokenizer::count_tokens,
    types::{Document, PartialSummary, RunStats, Stage},
};

/// Events emitted while a document is summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    Chunked {
        chunks: usize,
        transcript_tokens: usize,
    },
    MapCompleted {
        completed: usize,
        total: usize,
    },
    CombineRound {
        round: usize,
        inputs: usize,
        calls: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapReduceOutput {
    pub summary: String,
    pub stats: RunStats,
}

pub struct MapReduce<'a, S> {
    summarizer: &'a S,
    config: &'a PipelineConfig,
    cancel: CancellationToken,
    progress: Option<UnboundedSender<Progress>>,
}

impl<'a, S: Summarizer> MapReduce<'a, S> {
    pub fn new(summarizer: &'a S, config: &'a PipelineConfig) -> Self {
        Self {
            summarizer,
            config,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: UnboundedSender<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    #[tracing::instrument(skip_all, fields(
        backend = self.summarizer.name(),
        tokens = document.estimated_token_count,
    ))]
    pub async fn summarize_document(&self, document: &Document) -> Result<MapReduceOutput> {
        self.config.validate()?;
        if document.is_empty() {
            return Err(TldwError::EmptyDocument);
        }

        let chunks = chunker::split(
            &document.text,
            self.config.chunk_size,
            self.config.overlap_size,
        )?;
        if chunks.is_empty() {
            return Err(TldwError::EmptyDocument);
        }

        let mut stats = RunStats {
            transcript_tokens: document.estimated_token_count,
            chunk_count: chunks.len(),
            ..Default::default()
        };
        self.emit(Progress::Chunked {
            chunks: chunks.len(),
            transcript_tokens: document.estimated_token_count,
        });
        tracing::info!(chunks = chunks.len(), "starting map phase");

        let total = chunks.len();
        let completed = AtomicUsize::new(0);
        let completed = &completed;
        let mapped: Vec<(usize, PartialSummary)> = stream::iter(chunks.iter().enumerate())
            .map(|(position, chunk)| async move {
                let text = self
                    .call(Stage::Map, chunk.index, PromptKind::Map, chunk.text.clone())
                    .await?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                self.emit(Progress::MapCompleted {
                    completed: done,
                    total,
                });
                Ok::<_, TldwError>((position, PartialSummary::new(text)))
            })
            .buffer_unordered(self.config.concurrency)
            .try_collect()
            .await?;
        let mut partials = in_order(mapped);
        stats.map_calls = total;

        let budget = self
            .config
            .combine_budget
            .saturating_sub(template_tokens(PromptKind::Combine));
        let separator_tokens = count_tokens(SUMMARY_SEPARATOR);

        let mut round = 0;
        while partials.len() > 1 {
            round += 1;
            let counts: Vec<usize> = partials.iter().map(|p| p.token_count).collect();
            let batches = plan_batches(
                &counts,
                budget,
                self.config.max_combine_batch,
                separator_tokens,
            );
            let calls = batches.iter().filter(|batch| batch.len() > 1).count();
            self.emit(Progress::CombineRound {
                round,
                inputs: partials.len(),
                calls,
            });
            tracing::info!(round, inputs = partials.len(), calls, "combine round");

            let inputs = &partials;
            let combined: Vec<(usize, PartialSummary)> =
                stream::iter(batches.into_iter().enumerate())
                    .map(|(index, batch)| async move {
                        if batch.len() == 1 {
                            return Ok((index, inputs[batch.start].clone()));
                        }
                        let payload =
                            join_summaries(inputs[batch].iter().map(|p| p.text.as_str()));
                        let text = self
                            .call(Stage::Combine { round }, index, PromptKind::Combine, payload)
                            .await?;
                        Ok::<_, TldwError>((index, PartialSummary::new(text)))
                    })
                    .buffer_unordered(self.config.concurrency)
                    .try_collect()
                    .await?;

            stats.combine_calls += calls;
            partials = in_order(combined);
        }
        stats.reduce_rounds = round;

        let summary = partials
            .pop()
            .map(|partial| partial.text)
            .ok_or(TldwError::EmptyDocument)?;
        stats.summary_tokens = count_tokens(&summary);

        tracing::info!(
            map_calls = stats.map_calls,
            combine_calls = stats.combine_calls,
            rounds = stats.reduce_rounds,
            "summary complete"
        );

        Ok(MapReduceOutput { summary, stats })
    }

    async fn call(
        &self,
        stage: Stage,
        index: usize,
        prompt_kind: PromptKind,
        source_text: String,
    ) -> Result<String> {
        let request = SummaryRequest {
            source_text,
            prompt_kind,
            temperature: self.config.temperature,
        };
        let timeout = self.config.request_timeout();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(TldwError::Cancelled),
            result = tokio::time::timeout(timeout, self.summarizer.summarize(&request)) => result,
        };

        let failure = |reason: String| {
            tracing::error!(%stage, index, %reason, "backend call failed");
            TldwError::Backend {
                stage,
                index,
                reason,
            }
        };
        match result {
            Err(_) => Err(failure(format!("timed out after {}ms", timeout.as_millis()))),
            Ok(Err(e)) => Err(failure(e.to_string())),
            Ok(Ok(text)) if text.trim().is_empty() => Err(failure("empty response".to_string())),
            Ok(Ok(text)) => {
                tracing::debug!(%stage, index, "backend call done");
                Ok(text)
            }
        }
    }

    fn emit(&self, event: Progress) {
        if let Some(progress) = &self.progress {
            let _ = progress.send(event);
        }
    }
}

/// Results of an unordered fan-out, put back in submission order.
fn in_order(mut results: Vec<(usize, PartialSummary)>) -> Vec<PartialSummary> {
    results.sort_unstable_by_key(|(position, _)| *position);
    results.into_iter().map(|(_, partial)| partial).collect()
}

/// Group consecutive partial summaries into combine batches.
///
/// A batch always takes two entries when two remain, then grows while its
/// payload fits `budget` and it holds fewer than `max_batch` entries. The
/// payload of a batch is its entries' tokens plus `separator_tokens` between
/// each pair. A lone trailing entry forms a batch of one.
pub fn plan_batches(
    token_counts: &[usize],
    budget: usize,
    max_batch: usize,
    separator_tokens: usize,
) -> Vec<Range<usize>> {
    let max_batch = max_batch.max(2);
    let mut batches = Vec::new();
    let mut start = 0;

    while start < token_counts.len() {
        let mut end = (start + 2).min(token_counts.len());
        let mut used: usize = token_counts[start..end].iter().sum::<usize>()
            + separator_tokens * (end - start - 1);
        while end < token_counts.len()
            && end - start < max_batch
            && used + separator_tokens + token_counts[end] <= budget
        {
            used += separator_tokens + token_counts[end];
            end += 1;
        }
        batches.push(start..end);
        start = end;
    }

    batches
}
