//! Seams between the resolver and the external services it reads from.
//!
//! Every collaborator is an object-safe async trait so the resolver can be
//! driven by stubs in tests and by the HTTP/subprocess implementations in the
//! binary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::error::{CaptionError, ServiceError};

/// Lightweight fetch + extract of a webpage. Returns one text block per document.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the page cannot be fetched.
    async fn fetch_documents(&self, url: &Url) -> Result<Vec<String>, ServiceError>;
}

/// Browser-rendering fetch used when the lightweight fetch yields too little text.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the page cannot be rendered.
    async fn render_documents(&self, url: &Url) -> Result<Vec<String>, ServiceError>;
}

/// Title based article lookup returning at most one document of at most `max_chars` characters.
#[async_trait]
pub trait WikipediaLookup: Send + Sync {
    /// Returns `None` when no article matches.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the lookup service fails.
    async fn lookup(
        &self,
        lang: &str,
        query: &str,
        max_chars: usize,
    ) -> Result<Option<String>, ServiceError>;
}

/// One timed caption line.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionSegment {
    /// Offset from the start of the video, in seconds.
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Caption track lookup for a video, trying `languages` in priority order.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CaptionError`] telling disabled captions, missing languages and
    /// unavailable videos apart from service failures.
    async fn captions(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError>;
}

/// Downloads the best audio stream of a video into `dir` and returns the written file.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the download fails.
    async fn download_audio(&self, video_url: &str, dir: &Path) -> Result<PathBuf, ServiceError>;
}

/// Speech-to-text for a local audio file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the file cannot be read or transcribed.
    async fn transcribe(&self, audio: &Path) -> Result<String, ServiceError>;
}
