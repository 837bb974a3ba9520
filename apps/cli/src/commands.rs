use std::time::Instant;

use anyhow::Result;
use console::style;
use tldw_core::{
    ChatCompletionsClient, Config, Document, GoogleTranslator, SummaryOutcome, TranscriptSource,
    VideoInfo, YtDlp, summarize_video_with_progress, tokenizer,
};
use tokio_util::sync::CancellationToken;

use crate::ui::{create_spinner, done, report_progress};

pub async fn info(config: &Config, url: &str) -> Result<VideoInfo> {
    let source = YtDlp::from_config(&config.source);
    let started = Instant::now();
    let spinner = create_spinner("Fetching video info...");

    match source.fetch_metadata(url).await {
        Ok(info) => {
            spinner.finish_with_message(done("Fetched video info", started.elapsed()));
            Ok(info)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

pub async fn transcript(config: &Config, url: &str) -> Result<Document> {
    let source = YtDlp::from_config(&config.source);
    let started = Instant::now();
    let spinner = create_spinner("Fetching transcript...");

    match source.fetch_transcript(url).await {
        Ok(document) => {
            spinner.finish_with_message(done(
                &format!(
                    "Transcript: {} tokens {}",
                    document.estimated_token_count,
                    style(format!("({})", tokenizer::ENCODING)).dim()
                ),
                started.elapsed(),
            ));
            Ok(document)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Run the whole request, cancelling in-flight calls on Ctrl-C.
pub async fn summarize(config: &Config, url: &str) -> Result<SummaryOutcome> {
    let summarizer =
        ChatCompletionsClient::from_config(&config.llm, config.pipeline.request_timeout())?;
    let translator = GoogleTranslator::from_config(&config.translation)?;
    let source = YtDlp::from_config(&config.source);

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let started = Instant::now();
    let spinner = create_spinner("Fetching transcript...");
    let (progress, events) = tokio::sync::mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_progress(spinner.clone(), events));

    let result = summarize_video_with_progress(
        &source,
        &summarizer,
        &translator,
        url,
        &config.pipeline,
        cancel,
        Some(progress),
    )
    .await;

    ctrl_c.abort();
    let _ = reporter.await;

    match result {
        Ok(outcome) => {
            spinner.finish_with_message(done(
                &format!(
                    "Summarized with {} ({})",
                    config.llm.provider.name(),
                    summarizer.model()
                ),
                started.elapsed(),
            ));
            Ok(outcome)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}
