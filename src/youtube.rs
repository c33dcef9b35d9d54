//! YouTube collaborators: caption tracks read from the watch page and audio
//! downloads through yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue};
use scraper::{Html, Selector as ScraperSelector};
use serde::Deserialize;
use tokio::process::Command;
use url::Url;

use crate::error::{CaptionError, ServiceError};
use crate::fetch::{AudioDownloader, CaptionSegment, CaptionSource};
use crate::source::Source;
use crate::text::collapse_whitespace;

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<Tracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// `asr` for auto-generated tracks.
    kind: Option<String>,
}

/// Reads caption tracks the same way the web player does.
pub struct YoutubeCaptions {
    client: Client,
}

impl YoutubeCaptions {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+cb"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, ServiceError> {
        let response = self.client.get(url).send().await?;
        let response = ServiceError::check_response(response).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    async fn captions(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        info!("Looking up captions for {video_id}");
        let html = self
            .get_text(&format!("{}&hl=en", Source::youtube_watch_url(video_id)))
            .await?;

        let player = parse_player_response(&html)?;
        let tracks = playable_caption_tracks(player)?;
        let track = select_track(&tracks, languages).ok_or(CaptionError::NotFound)?;
        let origin = if track.kind.as_deref() == Some("asr") {
            " (auto-generated)"
        } else {
            ""
        };
        debug!(
            "Using {} caption track{origin} for {video_id}",
            track.language_code
        );

        let xml = self.get_text(&timedtext_url(&track.base_url)).await?;
        Ok(parse_timedtext(&xml))
    }
}

fn parse_player_response(html: &str) -> Result<PlayerResponse, CaptionError> {
    let Some(json) = html
        .find(PLAYER_RESPONSE_MARKER)
        .and_then(|position| html.get(position + PLAYER_RESPONSE_MARKER.len()..))
    else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(ServiceError::rate_limited("YouTube is asking for a captcha").into());
        }
        return Err(CaptionError::Unavailable("watch page carries no player data".to_owned()));
    };

    // The object is followed by more script, so only the first JSON value is read.
    match serde_json::Deserializer::from_str(json)
        .into_iter::<PlayerResponse>()
        .next()
    {
        Some(Ok(player)) => Ok(player),
        Some(Err(e)) => {
            Err(ServiceError::permanent(format!("Malformed player response: {e}")).into())
        }
        None => Err(ServiceError::permanent("Empty player response").into()),
    }
}

fn playable_caption_tracks(player: PlayerResponse) -> Result<Vec<CaptionTrack>, CaptionError> {
    if let Some(playability) = &player.playability_status
        && playability.status != "OK"
    {
        return Err(CaptionError::Unavailable(
            playability
                .reason
                .clone()
                .unwrap_or_else(|| playability.status.clone()),
        ));
    }

    let tracks = player
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer)
        .map(|tracklist| tracklist.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(CaptionError::Disabled);
    }
    Ok(tracks)
}

/// Picks the first language with a track, preferring manual over generated captions.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|track| &track.language_code == lang);
        let manual = candidates
            .clone()
            .find(|track| track.kind.as_deref() != Some("asr"));
        manual.or_else(|| candidates.next())
    })
}

/// The plain `<text start dur>` format is requested by dropping any `fmt` override.
fn timedtext_url(base_url: &str) -> String {
    let Ok(mut url) = Url::parse(base_url) else {
        return base_url.to_owned();
    };

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Parses a timedtext document into chronologically ordered segments.
///
/// Caption bodies are entity-escaped twice and may carry inline markup, so the
/// element text is parsed a second time.
fn parse_timedtext(xml: &str) -> Vec<CaptionSegment> {
    let Ok(selector) = ScraperSelector::parse("text") else {
        return Vec::new();
    };
    let document = Html::parse_fragment(xml);

    let attr_secs = |value: Option<&str>| {
        value
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    let mut segments: Vec<CaptionSegment> = document
        .select(&selector)
        .filter_map(|element| {
            let raw = element.text().collect::<String>();
            let decoded = Html::parse_fragment(&raw)
                .root_element()
                .text()
                .collect::<String>();
            let text = collapse_whitespace(&decoded);

            (!text.is_empty()).then(|| CaptionSegment {
                start: attr_secs(element.value().attr("start")),
                duration: attr_secs(element.value().attr("dur")),
                text,
            })
        })
        .collect();

    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    segments
}

/// Downloads audio with the `yt-dlp` command line tool.
pub struct YtDlpDownloader {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

fn classify_ytdlp_failure(stderr: &str) -> ServiceError {
    let message = format!("yt-dlp failed: {}", stderr.trim());
    let lowered = stderr.to_lowercase();

    if lowered.contains("http error 429") {
        ServiceError::rate_limited(message)
    } else if lowered.contains("private video")
        || lowered.contains("video unavailable")
        || lowered.contains("members-only")
        || lowered.contains("not available in your country")
    {
        ServiceError::permanent(message)
    } else {
        ServiceError::unknown(message)
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    async fn download_audio(&self, video_url: &str, dir: &Path) -> Result<PathBuf, ServiceError> {
        info!("Downloading audio of {video_url}");
        let mut command = Command::new(&self.binary);
        command
            .args(["-f", "bestaudio/best"])
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .arg("-o")
            .arg(dir.join("audio.%(ext)s"))
            .arg(video_url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            ServiceError::permanent(format!("Unable to start {}: {e}", self.binary.display()))
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                ServiceError::network(format!("Audio download of {video_url} timed out"))
            })??;

        if !output.status.success() {
            return Err(classify_ytdlp_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && path.file_stem().is_some_and(|stem| stem == "audio")
            {
                debug!("Audio written to {}", path.display());
                return Ok(path);
            }
        }

        Err(ServiceError::unknown("yt-dlp finished without writing an audio file"))
    }
}
