use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tldw_core::{ErrorKind, Progress, TldwError};
use tokio::sync::mpsc::UnboundedReceiver;

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// "✓ <what> [<elapsed>]"
pub fn done(what: &str, elapsed: Duration) -> String {
    format!(
        "{} {} {}",
        style("✓").green().bold(),
        what,
        style(format!("[{}]", format_duration(elapsed))).dim()
    )
}

pub fn rule() -> String {
    style("─".repeat(60)).dim().to_string()
}

/// Print `err` under a heading that names the kind of failure.
pub fn print_error(err: &anyhow::Error) {
    let heading = match err.downcast_ref::<TldwError>().map(TldwError::kind) {
        Some(ErrorKind::Config) => "Configuration error:",
        Some(ErrorKind::SourceUnavailable) => "Video unavailable:",
        Some(ErrorKind::Backend) => "Summarizer failed:",
        Some(ErrorKind::Translation) => "Translation failed:",
        Some(ErrorKind::Cancelled) => "Cancelled:",
        Some(ErrorKind::Other) | None => "Error:",
    };
    eprintln!("{} {}", style(heading).red().bold(), err);
}

pub fn print_warning(warning: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), warning);
}

/// Mirror map-reduce progress on `spinner` until the sender is dropped.
pub async fn report_progress(spinner: ProgressBar, mut events: UnboundedReceiver<Progress>) {
    while let Some(event) = events.recv().await {
        let message = match event {
            Progress::Chunked {
                chunks,
                transcript_tokens,
            } => format!(
                "Summarizing {} chunks ({} tokens)...",
                chunks, transcript_tokens
            ),
            Progress::MapCompleted { completed, total } => {
                format!("Summarized chunk {}/{}...", completed, total)
            }
            Progress::CombineRound {
                round,
                inputs,
                calls,
            } => format!(
                "Combining {} summaries (round {}, {} calls)...",
                inputs, round, calls
            ),
        };
        spinner.set_message(message);
    }
}
