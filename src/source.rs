//! The source module validates user supplied URLs and decides which extraction
//! strategy applies to them.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// A classified input URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Any page that is neither Wikipedia nor YouTube.
    Webpage(Url),
    /// A Wikipedia article, looked up by title in the given language edition.
    Wikipedia { lang: String, query: String },
    /// A YouTube video.
    Youtube { video_id: String },
}

impl Source {
    /// Canonical watch URL for YouTube sources.
    pub fn youtube_watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webpage(url) => write!(formatter, "webpage {url}"),
            Self::Wikipedia { lang, query } => {
                write!(formatter, "wikipedia article \"{query}\" ({lang})")
            }
            Self::Youtube { video_id } => write!(formatter, "youtube video {video_id}"),
        }
    }
}

/// Checks that the input is a syntactically valid http(s) URL with a host.
///
/// Reachability is not checked.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for empty input, unparsable URLs, non-http
/// schemes and URLs without a host.
pub fn validate_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("Please enter a URL.".to_owned()));
    }

    let url =
        Url::parse(input).map_err(|e| Error::InvalidInput(format!("Invalid URL format: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!("Unsupported URL scheme: {}", url.scheme())));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidInput("URL has no host.".to_owned()));
    }

    Ok(url)
}

/// Classifies a URL. Wikipedia wins over YouTube, everything else is a webpage.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when a Wikipedia URL carries no title or a
/// YouTube URL carries no video id.
pub fn classify(url: &Url) -> Result<Source> {
    let host = url.host_str().unwrap_or_default().to_lowercase();

    if host.contains("wikipedia.org") {
        let query = wikipedia_query(url).ok_or_else(|| {
            Error::InvalidInput(format!("No article title found in Wikipedia URL {url}"))
        })?;
        return Ok(Source::Wikipedia {
            lang: wikipedia_lang(&host),
            query,
        });
    }

    if is_youtube_host(&host) {
        let video_id = youtube_video_id(url)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid YouTube URL: {url}")))?;
        return Ok(Source::Youtube { video_id });
    }

    Ok(Source::Webpage(url.clone()))
}

pub fn is_youtube_host(host: &str) -> bool {
    let host = host.to_lowercase();
    host == "youtu.be"
        || host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com")
}

/// Extracts the article title from a Wikipedia URL.
///
/// A `search` query parameter takes precedence over the path. Path titles are
/// percent-decoded and underscores become spaces.
pub fn wikipedia_query(url: &Url) -> Option<String> {
    if let Some((_, search)) = url.query_pairs().find(|(key, _)| key == "search") {
        let search = search.trim().to_owned();
        if !search.is_empty() {
            return Some(search);
        }
    }

    let path = url.path();
    let raw_title = match path.find("/wiki/") {
        Some(position) => path.get(position + "/wiki/".len()..)?,
        None => path.rsplit('/').find(|segment| !segment.is_empty())?,
    };
    let raw_title = raw_title.trim_end_matches('/');

    let decoded = urlencoding::decode(raw_title)
        .map(|title| title.into_owned())
        .unwrap_or_else(|_| raw_title.to_owned());
    let title = decoded.replace('_', " ").trim().to_owned();

    (!title.is_empty()).then_some(title)
}

fn wikipedia_lang(host: &str) -> String {
    host.strip_suffix("wikipedia.org")
        .and_then(|prefix| prefix.trim_end_matches('.').split('.').next())
        .filter(|lang| !lang.is_empty() && *lang != "www" && *lang != "m")
        .unwrap_or("en")
        .to_owned()
}

/// Extracts the video id from any of the common YouTube URL shapes.
pub fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());

    let candidate = if host == "youtu.be" {
        segments.next().map(str::to_owned)
    } else {
        match segments.next() {
            Some("watch") | None => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("shorts" | "embed" | "live" | "v") => segments.next().map(str::to_owned),
            Some(_) => None,
        }
    };

    candidate
        .map(|id| id.trim().to_owned())
        .filter(|id| is_plausible_video_id(id))
}

fn is_plausible_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
