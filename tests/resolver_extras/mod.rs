use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use pagegist::{
    ResolverContext, ServiceError, ServiceErrorKind,
    config::ResolverConfig,
    error::CaptionError,
    fetch::{
        AudioDownloader, CaptionSegment, CaptionSource, PageFetcher, PageRenderer, Transcriber,
        WikipediaLookup,
    },
    text::truncate_chars,
};
use url::Url;

pub(crate) fn fail(kind: ServiceErrorKind) -> ServiceError {
    ServiceError::new(kind, format!("stub failure ({kind:?})"))
}

/// Scripted reply of a page fetcher or renderer.
#[derive(Clone)]
pub(crate) enum Pages {
    Documents(Vec<String>),
    Fail(ServiceErrorKind),
}

pub(crate) struct StubPages {
    reply: Pages,
    calls: AtomicUsize,
}

impl StubPages {
    pub fn new(reply: Pages) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Pages::Documents(vec![text.into()]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply(&self) -> Result<Vec<String>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Pages::Documents(documents) => Ok(documents.clone()),
            Pages::Fail(kind) => Err(fail(*kind)),
        }
    }
}

#[async_trait]
impl PageFetcher for StubPages {
    async fn fetch_documents(&self, _url: &Url) -> Result<Vec<String>, ServiceError> {
        self.reply()
    }
}

#[async_trait]
impl PageRenderer for StubPages {
    async fn render_documents(&self, _url: &Url) -> Result<Vec<String>, ServiceError> {
        self.reply()
    }
}

/// Returns the configured article, bounded like the real lookup.
pub(crate) struct StubWikipedia {
    article: Option<String>,
    pub requests: Mutex<Vec<(String, String, usize)>>,
}

impl StubWikipedia {
    pub fn new(article: Option<String>) -> Self {
        Self {
            article,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WikipediaLookup for StubWikipedia {
    async fn lookup(
        &self,
        lang: &str,
        query: &str,
        max_chars: usize,
    ) -> Result<Option<String>, ServiceError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push((lang.to_owned(), query.to_owned(), max_chars));
        Ok(self
            .article
            .as_deref()
            .map(|article| truncate_chars(article, max_chars).to_owned()))
    }
}

#[derive(Clone)]
pub(crate) enum Captions {
    Segments(Vec<CaptionSegment>),
    Disabled,
    NotFound,
    Unavailable,
}

pub(crate) struct StubCaptions {
    reply: Captions,
    pub requests: Mutex<Vec<(String, Vec<String>)>>,
}

impl StubCaptions {
    pub fn new(reply: Captions) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(lines: &[&str]) -> Self {
        Self::new(Captions::Segments(
            lines
                .iter()
                .enumerate()
                .map(|(index, line)| CaptionSegment {
                    start: index as f64 * 2.0,
                    duration: 2.0,
                    text: (*line).to_owned(),
                })
                .collect(),
        ))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests mutex poisoned").len()
    }
}

#[async_trait]
impl CaptionSource for StubCaptions {
    async fn captions(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push((video_id.to_owned(), languages.to_vec()));
        match &self.reply {
            Captions::Segments(segments) => Ok(segments.clone()),
            Captions::Disabled => Err(CaptionError::Disabled),
            Captions::NotFound => Err(CaptionError::NotFound),
            Captions::Unavailable => Err(CaptionError::Unavailable("Private video".to_owned())),
        }
    }
}

/// Writes a small file into the given directory, like a real download would.
pub(crate) struct StubDownloader {
    fail: Option<ServiceErrorKind>,
    pub written: Mutex<Option<PathBuf>>,
    pub video_url: Mutex<Option<String>>,
}

impl StubDownloader {
    pub fn new(fail: Option<ServiceErrorKind>) -> Self {
        Self {
            fail,
            written: Mutex::new(None),
            video_url: Mutex::new(None),
        }
    }

    pub fn written(&self) -> Option<PathBuf> {
        self.written.lock().expect("written mutex poisoned").clone()
    }
}

#[async_trait]
impl AudioDownloader for StubDownloader {
    async fn download_audio(&self, video_url: &str, dir: &Path) -> Result<PathBuf, ServiceError> {
        *self.video_url.lock().expect("video_url mutex poisoned") = Some(video_url.to_owned());
        if let Some(kind) = self.fail {
            return Err(fail(kind));
        }

        let path = dir.join("audio.webm");
        std::fs::write(&path, b"not really audio")?;
        *self.written.lock().expect("written mutex poisoned") = Some(path.clone());
        Ok(path)
    }
}

pub(crate) struct StubTranscriber {
    reply: Result<String, ServiceErrorKind>,
    pub saw_file: AtomicBool,
}

impl StubTranscriber {
    pub fn new(reply: Result<String, ServiceErrorKind>) -> Self {
        Self {
            reply,
            saw_file: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, ServiceError> {
        self.saw_file.store(audio.is_file(), Ordering::SeqCst);
        self.reply.clone().map_err(fail)
    }
}

/// All collaborators of one resolution, stubbed.
pub(crate) struct Fixture {
    pub config: ResolverConfig,
    pub fetcher: StubPages,
    pub renderer: StubPages,
    pub wikipedia: StubWikipedia,
    pub captions: StubCaptions,
    pub downloader: StubDownloader,
    pub transcriber: StubTranscriber,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            config: ResolverConfig::default(),
            fetcher: StubPages::new(Pages::Documents(Vec::new())),
            renderer: StubPages::new(Pages::Documents(Vec::new())),
            wikipedia: StubWikipedia::new(None),
            captions: StubCaptions::new(Captions::NotFound),
            downloader: StubDownloader::new(None),
            transcriber: StubTranscriber::new(Ok(String::new())),
        }
    }
}

impl Fixture {
    pub fn context(&self) -> ResolverContext<'_> {
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

pub(crate) fn url(input: &str) -> Url {
    Url::parse(input).expect("test URL should parse")
}
