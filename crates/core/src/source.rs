//! Video metadata and transcripts via `yt-dlp`.

use std::{
    future::Future,
    path::{Path, PathBuf},
    process::Output,
    sync::LazyLock,
    time::Duration,
};

use regex::Regex;
use tokio::{fs, process::Command};
use url::Url;

use crate::{
    config::SourceConfig,
    error::{Result, TldwError},
    types::{Document, VideoInfo},
};

pub trait TranscriptSource: Send + Sync {
    fn fetch_metadata(&self, url: &str) -> impl Future<Output = Result<VideoInfo>> + Send;

    fn fetch_transcript(&self, url: &str) -> impl Future<Output = Result<Document>> + Send;
}

pub fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com"
        || host == "youtu.be"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com")
}

/// Extract the video id from a watch, short, embed or youtu.be link.
pub fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if !is_youtube_host(host) {
        return None;
    }

    let mut segments = url.path_segments()?;
    let first = segments.next().unwrap_or("");

    if host.eq_ignore_ascii_case("youtu.be") {
        return non_empty(first);
    }

    match first {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .and_then(|(_, value)| non_empty(&value)),
        "shorts" | "embed" | "live" | "v" => segments.next().and_then(non_empty),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse `input` and make sure it points at a YouTube video.
pub fn validate_url(input: &str) -> Result<String> {
    let parsed = Url::parse(input.trim())
        .map_err(|e| TldwError::source_unavailable(input, format!("invalid URL: {}", e)))?;
    youtube_video_id(&parsed)
        .ok_or_else(|| TldwError::source_unavailable(input, "not a YouTube video URL"))
}

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("inline tag pattern is valid"));

/// Convert WebVTT captions to plain text.
///
/// Timing lines, cue ids, headers and inline tags are dropped. Auto-generated
/// captions repeat the previous line at the top of each cue, so a line equal
/// to the last kept one is skipped. Lines are joined with single spaces.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut skipping_block = false;

    for raw in vtt.lines() {
        let line = raw.trim();
        if line.is_empty() {
            skipping_block = false;
            continue;
        }
        if skipping_block {
            continue;
        }
        if line.starts_with("WEBVTT") || line.starts_with("Kind:") || line.starts_with("Language:")
        {
            continue;
        }
        if line.starts_with("NOTE") || line == "STYLE" || line == "REGION" {
            skipping_block = true;
            continue;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let cleaned = decode_entities(&INLINE_TAG.replace_all(line, ""));
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() || lines.last() == Some(&cleaned) {
            continue;
        }
        lines.push(cleaned);
    }

    lines.join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn parse_metadata(json: &str) -> Result<VideoInfo> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let field = |name: &str| value[name].as_str().unwrap_or_default().trim().to_string();
    Ok(VideoInfo {
        title: field("title"),
        description: field("description"),
    })
}

/// Pick the caption file for the most preferred language.
fn pick_subtitle(files: &[PathBuf], languages: &[String]) -> Option<PathBuf> {
    let language_of = |path: &Path| {
        path.file_stem()
            .and_then(|stem| Path::new(stem).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
    };
    languages
        .iter()
        .find_map(|lang| {
            files
                .iter()
                .find(|path| language_of(path.as_path()).as_deref() == Some(lang.as_str()))
        })
        .or_else(|| files.first())
        .cloned()
}

/// [`TranscriptSource`] backed by the `yt-dlp` binary.
pub struct YtDlp {
    binary: String,
    subtitle_languages: Vec<String>,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

impl YtDlp {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            binary: config.yt_dlp_path.clone(),
            subtitle_languages: config.subtitle_languages.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn run(&self, url: &str, command: &mut Command) -> Result<Output> {
        let output = tokio::time::timeout(self.timeout, command.kill_on_drop(true).output())
            .await
            .map_err(|_| {
                TldwError::source_unavailable(
                    url,
                    format!("yt-dlp timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| {
                TldwError::source_unavailable(url, format!("failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            return Err(TldwError::source_unavailable(
                url,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output)
    }

    async fn subtitle_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("vtt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl TranscriptSource for YtDlp {
    #[tracing::instrument(skip(self))]
    async fn fetch_metadata(&self, url: &str) -> Result<VideoInfo> {
        validate_url(url)?;

        let output = self
            .run(
                url,
                Command::new(&self.binary)
                    .arg("--dump-single-json")
                    .arg("--skip-download")
                    .arg("--no-warnings")
                    .arg(url),
            )
            .await?;

        parse_metadata(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| TldwError::source_unavailable(url, format!("bad metadata: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_transcript(&self, url: &str) -> Result<Document> {
        let video_id = validate_url(url)?;

        let unavailable = |what: &str, e: std::io::Error| {
            TldwError::source_unavailable(url, format!("{}: {}", what, e))
        };

        let dir = tempfile::tempdir().map_err(|e| unavailable("cannot create caption dir", e))?;
        let output_template = dir.path().join("%(id)s.%(ext)s");
        self.run(
            url,
            Command::new(&self.binary)
                .arg("--skip-download")
                .arg("--write-sub")
                .arg("--write-auto-sub")
                .arg("--sub-lang")
                .arg(self.subtitle_languages.join(","))
                .arg("--sub-format")
                .arg("vtt")
                .arg("--no-warnings")
                .arg("-o")
                .arg(&output_template)
                .arg(url),
        )
        .await?;

        let files = self
            .subtitle_files(dir.path())
            .await
            .map_err(|e| unavailable("cannot list captions", e))?;
        let path = pick_subtitle(&files, &self.subtitle_languages)
            .ok_or_else(|| TldwError::source_unavailable(url, "video has no captions"))?;
        let bytes = fs::read(&path)
            .await
            .map_err(|e| unavailable("cannot read captions", e))?;

        let document = Document::new(vtt_to_text(&String::from_utf8_lossy(&bytes)));
        if document.is_empty() {
            return Err(TldwError::source_unavailable(url, "captions are empty"));
        }
        tracing::info!(
            %video_id,
            tokens = document.estimated_token_count,
            "fetched transcript"
        );
        Ok(document)
    }
}
