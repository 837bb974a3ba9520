use anyhow::Result;
use console::{Term, style};
use dialoguer::{Input, Select};
use tldw_core::{
    Config, Document, PipelineConfig, SummaryOutcome, TargetLanguage, VideoInfo,
    config::MIN_CHUNK_SIZE, format_info, format_summary_readable,
};

use crate::{
    commands,
    ui::{print_error, print_warning, rule},
};

const ACTIONS: [&str; 6] = [
    "Set URL",
    "Get Info",
    "Get Transcription",
    "Summarize",
    "Clear",
    "Quit",
];

/// Everything the form shows. Clearing resets it to the configured defaults.
struct FormState {
    url: String,
    info: Option<VideoInfo>,
    transcript: Option<Document>,
    summary: Option<SummaryOutcome>,
    params: PipelineConfig,
}

impl FormState {
    fn new(params: PipelineConfig) -> Self {
        Self {
            url: String::new(),
            info: None,
            transcript: None,
            summary: None,
            params,
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    let mut state = FormState::new(config.pipeline.clone());

    println!(
        "\n{}  {}\n",
        style("tldw").cyan().bold(),
        style("YouTube Summarizer").dim()
    );

    loop {
        print_status(&state);
        let action = Select::new()
            .with_prompt("Action")
            .items(&ACTIONS)
            .default(if state.url.is_empty() { 0 } else { 3 })
            .interact()?;

        let result = match action {
            0 => set_url(&mut state),
            1 => get_info(&config, &mut state).await,
            2 => get_transcription(&config, &mut state).await,
            3 => summarize(&config, &mut state).await,
            4 => {
                state = FormState::new(config.pipeline.clone());
                Term::stdout().clear_screen()?;
                Ok(())
            }
            _ => break,
        };

        if let Err(e) = result {
            print_error(&e);
        }
    }

    Ok(())
}

fn print_status(state: &FormState) {
    println!("{}", rule());
    let url = if state.url.is_empty() {
        style("<not set>".to_string()).dim()
    } else {
        style(state.url.clone()).cyan()
    };
    println!("{} {}", style("URL:").bold(), url);
    if let Some(info) = &state.info {
        println!("{} {}", style("Title:").bold(), info.title);
    }
    if let Some(document) = &state.transcript {
        println!(
            "{} {}",
            style("Token Count (est):").bold(),
            document.estimated_token_count
        );
    }
    if let Some(summary) = &state.summary {
        println!(
            "{} {} ({})",
            style("Summary:").bold(),
            summary.stats.summary_tokens,
            summary.language
        );
    }
    println!();
}

fn set_url(state: &mut FormState) -> Result<()> {
    let url: String = Input::new()
        .with_prompt("Enter the YouTube URL")
        .interact_text()?;
    if url.trim() != state.url {
        state.info = None;
        state.transcript = None;
        state.summary = None;
    }
    state.url = url.trim().to_string();
    Ok(())
}

fn require_url(state: &FormState) -> Result<&str> {
    if state.url.is_empty() {
        anyhow::bail!("set a URL first");
    }
    Ok(&state.url)
}

async fn get_info(config: &Config, state: &mut FormState) -> Result<()> {
    let url = require_url(state)?.to_string();
    let info = commands::info(config, &url).await?;
    println!("\n{}", format_info(&info));
    state.info = Some(info);
    Ok(())
}

async fn get_transcription(config: &Config, state: &mut FormState) -> Result<()> {
    let url = require_url(state)?.to_string();
    let document = commands::transcript(config, &url).await?;
    println!("\n{}\n", document.text);
    state.transcript = Some(document);
    Ok(())
}

async fn summarize(config: &Config, state: &mut FormState) -> Result<()> {
    let url = require_url(state)?.to_string();
    state.params = prompt_params(&state.params)?;

    let mut request = config.clone();
    request.pipeline = state.params.clone();
    let outcome = commands::summarize(&request, &url).await?;

    if let Some(warning) = &outcome.warning {
        print_warning(warning);
    }
    let title = state.info.as_ref().map(|info| info.title.as_str());
    println!("\n{}", format_summary_readable(&outcome, title));
    state.summary = Some(outcome);
    Ok(())
}

fn prompt_params(current: &PipelineConfig) -> Result<PipelineConfig> {
    let temperature: f32 = Input::new()
        .with_prompt("Temperature")
        .default(current.temperature)
        .validate_with(|t: &f32| {
            if (0.0..=1.0).contains(t) {
                Ok(())
            } else {
                Err("temperature must be between 0 and 1")
            }
        })
        .interact_text()?;

    let chunk_size: usize = Input::new()
        .with_prompt("Chunk Size")
        .default(current.chunk_size)
        .validate_with(|size: &usize| {
            if *size >= MIN_CHUNK_SIZE {
                Ok(())
            } else {
                Err(format!("chunk size must be at least {}", MIN_CHUNK_SIZE))
            }
        })
        .interact_text()?;

    let overlap_size: usize = Input::new()
        .with_prompt("Overlap Size")
        .default(current.overlap_size.min(chunk_size - 1))
        .validate_with(|size: &usize| {
            if *size < chunk_size {
                Ok(())
            } else {
                Err("overlap must be smaller than the chunk size")
            }
        })
        .interact_text()?;

    let languages = TargetLanguage::all();
    let names: Vec<&str> = languages.iter().map(|l| l.name).collect();
    let current_language = languages
        .iter()
        .position(|l| l.name.eq_ignore_ascii_case(&current.target_language))
        .unwrap_or(0);
    let language = Select::new()
        .with_prompt("Language")
        .items(&names)
        .default(current_language)
        .max_length(12)
        .interact()?;

    Ok(PipelineConfig {
        temperature,
        chunk_size,
        overlap_size,
        target_language: languages[language].name.to_string(),
        ..current.clone()
    })
}
