//! The resolver module turns a URL into one block of plain text, trying the
//! strategies that apply to the URL's classification until one yields usable
//! content.

use std::fmt::{self, Display};
use std::path::Path;

use log::{debug, info, warn};
use url::Url;

use crate::YoutubeMode;
use crate::config::ResolverConfig;
use crate::error::{Error, Result, ServiceError};
use crate::fetch::{
    AudioDownloader, CaptionSegment, CaptionSource, PageFetcher, PageRenderer, Transcriber,
    WikipediaLookup,
};
use crate::source::{Source, classify};
use crate::text::join_blocks;

/// Collaborators and settings the resolver reads from.
pub struct ResolverContext<'a> {
    pub config: &'a ResolverConfig,
    pub fetcher: &'a dyn PageFetcher,
    pub renderer: &'a dyn PageRenderer,
    pub wikipedia: &'a dyn WikipediaLookup,
    pub captions: &'a dyn CaptionSource,
    pub downloader: &'a dyn AudioDownloader,
    pub transcriber: &'a dyn Transcriber,
}

/// Text extracted from a source. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedContent {
    pub source: Source,
    pub text: String,
}

#[derive(Clone, Copy, Debug)]
enum Strategy {
    Fetch,
    Render,
    Wikipedia,
    Captions,
    Transcription,
}

enum Outcome {
    Text { chars: usize },
    Empty,
    Failed(String),
}

struct Attempt {
    strategy: Strategy,
    outcome: Outcome,
}

impl Display for Attempt {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Text { chars } => write!(formatter, "{:?}: {chars} chars", self.strategy),
            Outcome::Empty => write!(formatter, "{:?}: empty", self.strategy),
            Outcome::Failed(reason) => write!(formatter, "{:?}: failed ({reason})", self.strategy),
        }
    }
}

/// Strategies tried during one resolution, kept only for logging.
#[derive(Default)]
struct Attempts(Vec<Attempt>);

impl Attempts {
    fn record<E: Display>(&mut self, strategy: Strategy, result: &std::result::Result<String, E>) {
        let outcome = match result {
            Ok(text) if text.is_empty() => Outcome::Empty,
            Ok(text) => Outcome::Text {
                chars: text.chars().count(),
            },
            Err(e) => Outcome::Failed(e.to_string()),
        };
        self.0.push(Attempt { strategy, outcome });
    }
}

impl Display for Attempts {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, attempt) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{attempt}")?;
        }
        Ok(())
    }
}

/// Resolves a validated URL into plain text.
///
/// The full extracted text is returned; capping it for a model is up to the caller.
///
/// # Errors
///
/// * [`Error::InvalidInput`] when the URL cannot be classified (e.g. a YouTube
///   URL without a video id).
/// * [`Error::NoContent`] when every strategy succeeded but yielded nothing.
/// * [`Error::CaptionsDisabled`], [`Error::NoCaptionTrack`] and
///   [`Error::VideoUnavailable`] for the corresponding caption failures.
/// * [`Error::Service`] when a collaborator failed.
pub async fn resolve(url: &Url, ctx: &ResolverContext<'_>) -> Result<ResolvedContent> {
    let source = classify(url)?;
    info!("Resolving {source}");

    let mut attempts = Attempts::default();
    let result = match &source {
        Source::Webpage(page_url) => resolve_webpage(page_url, ctx, &mut attempts).await,
        Source::Wikipedia { lang, query } => {
            resolve_wikipedia(lang, query, ctx, &mut attempts).await
        }
        Source::Youtube { video_id } => match ctx.config.youtube_mode {
            YoutubeMode::Captions => resolve_captions(video_id, ctx, &mut attempts).await,
            YoutubeMode::Audio => resolve_audio(video_id, ctx, &mut attempts).await,
        },
    };
    debug!("Attempts for {url}: {attempts}");

    let text = result?;
    info!("Resolved {source} to {} chars", text.chars().count());
    Ok(ResolvedContent { source, text })
}

async fn resolve_webpage(
    url: &Url,
    ctx: &ResolverContext<'_>,
    attempts: &mut Attempts,
) -> Result<String> {
    let primary = ctx.fetcher.fetch_documents(url).await.map(join_blocks);
    attempts.record(Strategy::Fetch, &primary);

    let primary_chars = primary.as_ref().map_or(0, |text| text.chars().count());
    if primary.is_ok() && primary_chars > 0 && primary_chars >= ctx.config.min_webpage_chars {
        return primary.map_err(Error::from);
    }
    info!(
        "Fetched {primary_chars} chars from {url}, below {}; rendering in a browser",
        ctx.config.min_webpage_chars
    );

    let rendered = ctx.renderer.render_documents(url).await.map(join_blocks);
    attempts.record(Strategy::Render, &rendered);

    match (primary, rendered) {
        (Ok(text), Ok(rendered)) if text.chars().count() > rendered.chars().count() => {
            warn!("Browser rendering of {url} gave less text, keeping the fetched text");
            Ok(text)
        }
        (_, Ok(text)) if !text.is_empty() => Ok(text),
        (Ok(text), _) if !text.is_empty() => {
            warn!("Browser rendering of {url} failed, keeping the short text");
            Ok(text)
        }
        (Err(primary_err), _) => Err(primary_err.into()),
        (Ok(_), Err(render_err)) => Err(render_err.into()),
        (Ok(_), Ok(_)) => Err(Error::NoContent(format!("{url} has no readable text"))),
    }
}

async fn resolve_wikipedia(
    lang: &str,
    query: &str,
    ctx: &ResolverContext<'_>,
    attempts: &mut Attempts,
) -> Result<String> {
    let article = ctx
        .wikipedia
        .lookup(lang, query, ctx.config.wikipedia_max_chars)
        .await
        .map(|found| found.map(|text| text.trim().to_owned()))
        .map(Option::unwrap_or_default);
    attempts.record(Strategy::Wikipedia, &article);

    let text = article?;
    if text.is_empty() {
        return Err(Error::NoContent(format!("no Wikipedia article found for \"{query}\"")));
    }
    Ok(text)
}

async fn resolve_captions(
    video_id: &str,
    ctx: &ResolverContext<'_>,
    attempts: &mut Attempts,
) -> Result<String> {
    let languages = &ctx.config.caption_languages;
    let transcript = ctx
        .captions
        .captions(video_id, languages)
        .await
        .map(|segments| caption_text(&segments));
    attempts.record(Strategy::Captions, &transcript);

    let text = transcript.map_err(|e| e.into_error(video_id, languages))?;
    if text.is_empty() {
        return Err(Error::NoContent(format!("captions of {video_id} are empty")));
    }
    Ok(text)
}

fn caption_text(segments: &[CaptionSegment]) -> String {
    join_blocks(segments.iter().map(|segment| segment.text.as_str()))
}

/// Downloads the audio into a fresh temporary directory that is removed on every exit path.
async fn resolve_audio(
    video_id: &str,
    ctx: &ResolverContext<'_>,
    attempts: &mut Attempts,
) -> Result<String> {
    let workdir = tempfile::Builder::new()
        .prefix("pagegist-audio-")
        .tempdir()
        .map_err(ServiceError::from)?;

    let transcript = download_and_transcribe(video_id, workdir.path(), ctx).await;
    attempts.record(Strategy::Transcription, &transcript);

    let removal = workdir.path().display().to_string();
    if let Err(e) = workdir.close() {
        warn!("Failed to remove temporary audio in {removal}: {e}");
    }

    let text = transcript?;
    if text.is_empty() {
        return Err(Error::NoContent(format!("transcript of {video_id} is empty")));
    }
    Ok(text)
}

async fn download_and_transcribe(
    video_id: &str,
    dir: &Path,
    ctx: &ResolverContext<'_>,
) -> std::result::Result<String, ServiceError> {
    let audio = ctx
        .downloader
        .download_audio(&Source::youtube_watch_url(video_id), dir)
        .await?;
    let transcript = ctx.transcriber.transcribe(&audio).await?;
    Ok(transcript.trim().to_owned())
}
