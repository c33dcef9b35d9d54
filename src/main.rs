//! pagegist is a CLI tool that turns a URL (webpage, Wikipedia article or
//! YouTube video) into plain text and summarizes it or chats about it with an
//! LLM model.
//!
//! The tool has four commands:
//! 1. `resolve` - Prints the plain text extracted from a URL
//! 2. `summarize` - Summarizes the text of a URL, optionally saving it to a file
//! 3. `chat` - Loads a URL and answers questions about it interactively
//! 4. `models` - Lists suggested LLM models

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};

use pagegist::{
    ResolverContext, SummaryLength, SummaryStyle, TextBy, YoutubeMode,
    browser::HeadlessBrowser,
    config::ResolverConfig,
    constants::{
        BROWSER_USER_AGENT, DEFAULT_MODEL, MAX_MODEL_INPUT_CHARS, MIN_WEBPAGE_CHARS,
        SUGGESTED_MODELS, TRANSCRIPTION_ENDPOINT, TRANSCRIPTION_MODEL, WIKIPEDIA_MAX_CHARS,
    },
    export::export_summary,
    model::{api_key_from_env, llm_builder},
    resolve,
    retry::RetryPolicy,
    session::{ChatSession, SessionState},
    summarize::{SummarizeContext, summarize_url},
    transcribe::GroqTranscriber,
    validate_url,
    webpage::HttpPageFetcher,
    wikipedia::WikipediaClient,
    youtube::{YoutubeCaptions, YtDlpDownloader},
};

/// Turns webpages, Wikipedia articles and YouTube videos into text, summaries and chats
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute (resolve, summarize, chat or models)
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print the plain text extracted from a URL
    Resolve {
        /// The URL to read
        url: String,
        #[command(flatten)]
        resolver: ResolverArgs,
    },
    /// Summarize the content of a URL using an LLM model
    Summarize {
        /// The URL to summarize
        url: String,
        /// Summary style: "normal" (default), "bullets" or "hindi"
        #[arg(long, short = 's', default_value = "normal")]
        style: SummaryStyle,
        /// Summary length: "short", "medium" (default) or "long"
        #[arg(long, short = 'l', default_value = "medium")]
        length: SummaryLength,
        /// Path to the file with a prompt template
        #[arg(long, short = 'p')]
        prompt_file: Option<String>,
        /// Save the summary to this text file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[command(flatten)]
        resolver: ResolverArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Chat about the content of a URL; type /load <url>, /reset or /quit
    Chat {
        /// The URL to load before the first question
        url: Option<String>,
        #[command(flatten)]
        resolver: ResolverArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// List suggested LLM models
    Models,
}

#[derive(Args)]
struct ResolverArgs {
    /// How YouTube videos are read: "captions" (default) or "audio"
    #[arg(long, default_value = "captions")]
    youtube_mode: YoutubeMode,
    /// Text extraction method: "dom_smoothie" (default) or "fast_html2md"
    #[arg(long, default_value = "dom_smoothie")]
    text_by: TextBy,
    /// Webpages with less text than this are rendered in a headless browser
    #[arg(long, default_value_t = MIN_WEBPAGE_CHARS)]
    min_webpage_chars: usize,
    /// Maximum characters read from a Wikipedia article
    #[arg(long, default_value_t = WIKIPEDIA_MAX_CHARS)]
    wikipedia_max_chars: usize,
    /// Caption languages in priority order
    #[arg(long, value_delimiter = ',', default_value = "en,hi")]
    caption_languages: Vec<String>,
    /// User agent sent with webpage requests
    #[arg(long, default_value = BROWSER_USER_AGENT)]
    user_agent: String,
    /// Chromium-compatible browser binary used for rendering
    #[arg(long, default_value = "chromium")]
    browser: PathBuf,
    /// yt-dlp binary used to download audio
    #[arg(long, default_value = "yt-dlp")]
    yt_dlp: PathBuf,
    /// Speech-to-text model
    #[arg(long, default_value = TRANSCRIPTION_MODEL)]
    transcription_model: String,
    /// Speech-to-text endpoint (OpenAI-compatible)
    #[arg(long, default_value = TRANSCRIPTION_ENDPOINT)]
    transcription_endpoint: String,
    /// Timeout for each request, in seconds (1 to 3600)
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=3600))]
    timeout: u64,
}

#[derive(Args)]
struct ModelArgs {
    /// URL of the LLM model to use, e.g. groq://llama-3.3-70b-versatile
    #[arg(long, short = 'm', default_value = DEFAULT_MODEL)]
    model: String,
    /// Maximum characters of content sent to the model
    #[arg(long, default_value_t = MAX_MODEL_INPUT_CHARS)]
    max_input_chars: usize,
    /// Attempts per request, including the first one
    #[arg(long, default_value_t = 3)]
    attempts: u32,
    /// Delay between attempts in milliseconds
    #[arg(long, default_value_t = 2000)]
    retry_delay: u64,
    /// Delay after a rate limit response in milliseconds
    #[arg(long, default_value_t = 10_000)]
    rate_limit_delay: u64,
}

impl ModelArgs {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.attempts,
            delay: Duration::from_millis(self.retry_delay),
            rate_limit_delay: Duration::from_millis(self.rate_limit_delay),
        }
    }
}

/// Real collaborators behind the resolver.
struct Services {
    config: ResolverConfig,
    fetcher: HttpPageFetcher,
    renderer: HeadlessBrowser,
    wikipedia: WikipediaClient,
    captions: YoutubeCaptions,
    downloader: YtDlpDownloader,
    transcriber: GroqTranscriber,
}

impl Services {
    fn new(args: ResolverArgs, api_key: Option<&str>) -> Result<Self> {
        let timeout = Duration::from_secs(args.timeout);
        let config = ResolverConfig {
            min_webpage_chars: args.min_webpage_chars,
            wikipedia_max_chars: args.wikipedia_max_chars,
            caption_languages: args.caption_languages,
            youtube_mode: args.youtube_mode,
            text_by: args.text_by,
        };

        Ok(Self {
            fetcher: HttpPageFetcher::new(&args.user_agent, timeout, config.text_by.clone())?,
            renderer: HeadlessBrowser::new(
                args.browser,
                args.user_agent.clone(),
                timeout,
                config.text_by.clone(),
            ),
            wikipedia: WikipediaClient::new(&args.user_agent, timeout)?,
            captions: YoutubeCaptions::new(&args.user_agent, timeout)?,
            downloader: YtDlpDownloader::new(args.yt_dlp, timeout.saturating_mul(10)),
            transcriber: GroqTranscriber::new(
                args.transcription_endpoint,
                api_key.unwrap_or_default(),
                args.transcription_model,
                timeout.saturating_mul(5),
            )?,
            config,
        })
    }

    fn context(&self) -> ResolverContext<'_> {
        ResolverContext {
            config: &self.config,
            fetcher: &self.fetcher,
            renderer: &self.renderer,
            wikipedia: &self.wikipedia,
            captions: &self.captions,
            downloader: &self.downloader,
            transcriber: &self.transcriber,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Resolve { url, resolver } => handle_resolve_command(&url, resolver).await,
        Command::Summarize {
            url,
            style,
            length,
            prompt_file,
            output,
            resolver,
            model,
        } => {
            handle_summarize_command(&url, style, length, prompt_file, output, resolver, model)
                .await
        }
        Command::Chat {
            url,
            resolver,
            model,
        } => handle_chat_command(url, resolver, model).await,
        Command::Models => {
            for model in SUGGESTED_MODELS {
                let marker = if model == DEFAULT_MODEL {
                    " (default)"
                } else {
                    ""
                };
                println!("{model}{marker}");
            }
            Ok(())
        }
    }
}

async fn handle_resolve_command(url: &str, resolver: ResolverArgs) -> Result<()> {
    let url = validate_url(url)?;
    let api_key = api_key_from_env();
    let services = Services::new(resolver, api_key.as_deref())?;

    let content = resolve(&url, &services.context()).await?;
    println!("{}", content.text);
    Ok(())
}

async fn handle_summarize_command(
    url: &str,
    style: SummaryStyle,
    length: SummaryLength,
    prompt_file: Option<String>,
    output: Option<PathBuf>,
    resolver: ResolverArgs,
    model_args: ModelArgs,
) -> Result<()> {
    let url = validate_url(url)?;
    let api_key = api_key_from_env();
    let services = Services::new(resolver, api_key.as_deref())?;
    let model = llm_builder(&model_args.model, api_key)?
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))?;

    let prompt_template = match prompt_file {
        Some(file) => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read prompt file: {file}"))?;
            Some(content)
        }
        None => None,
    };

    let ctx = SummarizeContext {
        model: model.as_ref(),
        prompt_template: prompt_template.as_deref(),
        style,
        length,
        max_input_chars: model_args.max_input_chars,
    };

    let retry = model_args.retry_policy();
    let summary = summarize_url(&url, &services.context(), &ctx, &retry).await?;
    println!("{}", summary.text);

    if let Some(output) = output {
        export_summary(&output, &summary.text)?;
    }
    Ok(())
}

async fn handle_chat_command(
    url: Option<String>,
    resolver: ResolverArgs,
    model_args: ModelArgs,
) -> Result<()> {
    let api_key = api_key_from_env();
    let services = Services::new(resolver, api_key.as_deref())?;
    let model = llm_builder(&model_args.model, api_key)?
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))?;
    let retry = model_args.retry_policy();
    let mut session = ChatSession::new(model_args.max_input_chars);

    if let Some(url) = url {
        load_into_session(&mut session, &url, &services).await?;
    } else {
        println!("Type /load <url> to start chatting about a website.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" || line == "/exit" {
            break;
        } else if line == "/reset" {
            session.reset();
            println!("Session cleared.");
        } else if let Some(url) = line.strip_prefix("/load ") {
            load_into_session(&mut session, url, &services).await?;
        } else if !line.is_empty() {
            match session.ask(line, model.as_ref(), &retry).await {
                Ok(answer) => println!("{answer}\n"),
                Err(err) => eprintln!("{err}"),
            }
        }
        print_prompt()?;
    }

    Ok(())
}

async fn load_into_session(
    session: &mut ChatSession,
    input: &str,
    services: &Services,
) -> Result<()> {
    let url = match validate_url(input) {
        Ok(url) => url,
        Err(err) => {
            eprintln!("{err}");
            return Ok(());
        }
    };

    session.begin_load(url.clone())?;
    let outcome = resolve(&url, &services.context()).await;
    session.finish_load(outcome)?;

    if let SessionState::Failed { reason, .. } = session.state() {
        eprintln!("{reason}");
    } else {
        println!("Loaded {url}. Ask anything about it.");
    }
    Ok(())
}

fn print_prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}
