use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::PipelineConfig,
    error::{Result, TldwError},
    orchestrator::{MapReduce, Progress},
    source::TranscriptSource,
    summarizer::Summarizer,
    translator::{TargetLanguage, Translator},
    types::SummaryOutcome,
};

/// Fetch, summarize and translate one video.
pub async fn summarize_video<Src, Sum, Tr>(
    source: &Src,
    summarizer: &Sum,
    translator: &Tr,
    url: &str,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> Result<SummaryOutcome>
where
    Src: TranscriptSource,
    Sum: Summarizer,
    Tr: Translator,
{
    summarize_video_with_progress(source, summarizer, translator, url, config, cancel, None).await
}

/// [`summarize_video`] that also reports [`Progress`] events on `progress`.
pub async fn summarize_video_with_progress<Src, Sum, Tr>(
    source: &Src,
    summarizer: &Sum,
    translator: &Tr,
    url: &str,
    config: &PipelineConfig,
    cancel: CancellationToken,
    progress: Option<UnboundedSender<Progress>>,
) -> Result<SummaryOutcome>
where
    Src: TranscriptSource,
    Sum: Summarizer,
    Tr: Translator,
{
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("summarize_video", %request_id, url);

    async move {
        config.validate()?;
        let language = TargetLanguage::parse(&config.target_language)?;

        let document = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TldwError::Cancelled),
            document = source.fetch_transcript(url) => document?,
        };
        tracing::info!(tokens = document.estimated_token_count, "transcript ready");

        let mut map_reduce = MapReduce::new(summarizer, config).with_cancellation(cancel.clone());
        if let Some(progress) = progress {
            map_reduce = map_reduce.with_progress(progress);
        }
        let output = map_reduce.summarize_document(&document).await?;

        let (summary, language, translated, warning) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TldwError::Cancelled),
            result = translate_summary(translator, output.summary, language) => result,
        };

        Ok(SummaryOutcome {
            summary,
            language: language.name.to_string(),
            translated,
            warning,
            stats: output.stats,
        })
    }
    .instrument(span)
    .await
}

/// Best-effort translation: on failure the English summary is kept and a
/// warning describes what went wrong.
async fn translate_summary<Tr: Translator>(
    translator: &Tr,
    summary: String,
    language: TargetLanguage,
) -> (String, TargetLanguage, bool, Option<String>) {
    if language.is_english() {
        return (summary, language, false, None);
    }

    match translator.translate(&summary, &language).await {
        Ok(translated) if !translated.trim().is_empty() => (translated, language, true, None),
        Ok(_) => {
            let warning = format!("Translation to {} returned no text", language.name);
            tracing::warn!(language = language.name, "translation returned no text");
            (summary, TargetLanguage::ENGLISH, false, Some(warning))
        }
        Err(e) => {
            tracing::warn!(language = language.name, error = %e, "translation failed, keeping English summary");
            (summary, TargetLanguage::ENGLISH, false, Some(e.to_string()))
        }
    }
}
