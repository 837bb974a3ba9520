use crate::types::{RunStats, SummaryOutcome, VideoInfo};

pub fn format_info(info: &VideoInfo) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", info.title));
    if info.description.is_empty() {
        output.push_str("_No description._\n");
    } else {
        output.push_str(&info.description);
        output.push('\n');
    }
    output
}

pub fn format_stats(stats: &RunStats) -> String {
    format!(
        "**Transcript:** {} tokens in {} chunks | **Calls:** {} map, {} combine over {} rounds",
        stats.transcript_tokens,
        stats.chunk_count,
        stats.map_calls,
        stats.combine_calls,
        stats.reduce_rounds
    )
}

/// Markdown rendering of a finished summary, optionally headed by the video title.
pub fn format_summary_readable(outcome: &SummaryOutcome, title: Option<&str>) -> String {
    let mut output = String::new();
    if let Some(title) = title {
        output.push_str(&format!("# {}\n\n", title));
    }
    output.push_str(&format!(
        "{} | **Language:** {}\n\n",
        format_stats(&outcome.stats),
        outcome.language
    ));

    if let Some(warning) = &outcome.warning {
        output.push_str(&format!("> Warning: {}\n\n", warning));
    }

    output.push_str("## Summary\n\n");
    output.push_str(outcome.summary.trim());
    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(warning: Option<&str>) -> SummaryOutcome {
        SummaryOutcome {
            summary: "The speaker explains lifetimes.\n".into(),
            language: "English".into(),
            translated: false,
            warning: warning.map(str::to_string),
            stats: RunStats {
                transcript_tokens: 12_000,
                chunk_count: 3,
                map_calls: 3,
                combine_calls: 1,
                reduce_rounds: 1,
                summary_tokens: 5,
            },
        }
    }

    #[test]
    fn readable_summary_has_stats_and_body() {
        let text = format_summary_readable(&outcome(None), Some("Rust Lifetimes"));
        assert!(text.starts_with("# Rust Lifetimes\n\n"));
        assert!(text.contains("12000 tokens in 3 chunks"));
        assert!(text.contains("**Language:** English"));
        assert!(text.ends_with("## Summary\n\nThe speaker explains lifetimes.\n"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn warning_is_shown() {
        let text = format_summary_readable(&outcome(Some("Translation to French failed")), None);
        assert!(text.contains("> Warning: Translation to French failed"));
    }

    #[test]
    fn info_without_description() {
        let info = VideoInfo {
            title: "Talk".into(),
            description: String::new(),
        };
        assert_eq!(format_info(&info), "# Talk\n\n_No description._\n");
    }
}
