use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use console::style;
use tldw_core::{Config, Provider, TargetLanguage, format_info, format_summary_readable};
use tracing_subscriber::EnvFilter;

use crate::ui::{print_error, print_warning, rule};

mod commands;
mod form;
mod ui;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Ollama => Provider::Ollama,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "tldw", version)]
#[command(about = "Summarize YouTube videos from their transcripts with an LLM")]
struct Cli {
    /// Config file (defaults to <config dir>/tldw/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the video's title and description
    Info { url: String },

    /// Print the raw transcript and its token count
    Transcript {
        url: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the video's transcript
    Summarize(SummarizeArgs),

    /// List the languages summaries can be translated to
    Languages,

    /// Interactive form
    Form,
}

#[derive(Args)]
struct SummarizeArgs {
    url: String,

    /// Sampling temperature (0 to 1)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Maximum tokens per chunk (at least 200)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Tokens repeated between consecutive chunks
    #[arg(long)]
    overlap_size: Option<usize>,

    /// Summary language, by name or code (e.g. "French", "de")
    #[arg(short, long)]
    lang: Option<String>,

    /// LLM provider
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Model name, overriding the provider's default
    #[arg(short, long)]
    model: Option<String>,

    /// Backend calls in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl SummarizeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone().into();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(temperature) = self.temperature {
            config.pipeline.temperature = temperature;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.pipeline.chunk_size = chunk_size;
        }
        if let Some(overlap_size) = self.overlap_size {
            config.pipeline.overlap_size = overlap_size;
        }
        if let Some(lang) = &self.lang {
            config.pipeline.target_language = lang.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.pipeline.concurrency = concurrency;
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Info { url } => {
            let info = commands::info(&config, &url).await?;
            println!("\n{}", format_info(&info));
        }
        Command::Transcript { url, output } => {
            let document = commands::transcript(&config, &url).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &document.text)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
                }
                None => println!("{}", document.text),
            }
        }
        Command::Summarize(args) => {
            args.apply(&mut config);
            let outcome = commands::summarize(&config, &args.url).await?;
            if let Some(warning) = &outcome.warning {
                print_warning(warning);
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                eprintln!("{}", rule());
                println!("{}", format_summary_readable(&outcome, None));
            }
        }
        Command::Languages => {
            for language in TargetLanguage::all() {
                println!("{:<22} {}", language.name, style(language.code).dim());
            }
        }
        Command::Form => form::run(config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn summarize_flags_override_config() {
        let cli = Cli::parse_from([
            "tldw",
            "summarize",
            "https://youtu.be/dQw4w9WgXcQ",
            "--temperature",
            "0.5",
            "--chunk-size",
            "1200",
            "--overlap-size",
            "50",
            "--lang",
            "German",
            "--provider",
            "openai",
        ]);
        let Command::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.pipeline.temperature, 0.5);
        assert_eq!(config.pipeline.chunk_size, 1200);
        assert_eq!(config.pipeline.overlap_size, 50);
        assert_eq!(config.pipeline.target_language, "German");
        assert_eq!(config.llm.provider, Provider::Openai);
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["tldw", "languages", "--config", "/tmp/tldw.toml", "-vv"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tldw.toml")));
        assert_eq!(cli.verbose, 2);
    }
}
