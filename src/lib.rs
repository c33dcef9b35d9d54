//! The pagegist library turns webpages, Wikipedia articles and YouTube videos
//! into plain text, and summarizes or chats about that text with an LLM model.

pub mod browser;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod parse;
pub mod resolver;
pub mod retry;
pub mod session;
pub mod source;
pub mod summarize;
pub mod text;
pub mod transcribe;
pub mod webpage;
pub mod wikipedia;
pub mod youtube;

use crate::constants::{BULLETS_PROMPT_TEMPLATE, HINDI_PROMPT_TEMPLATE, NORMAL_PROMPT_TEMPLATE};

/// Enum representing the text extraction method.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum TextBy {
    /// Use dom_smoothie for text extraction
    #[default]
    DomSmoothie,
    /// Use fast_html2md for text extraction
    FastHtml2Md,
}

impl std::str::FromStr for TextBy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "dom_smoothie" => Ok(TextBy::DomSmoothie),
            "fast_html2md" => Ok(TextBy::FastHtml2Md),
            _ => Err(format!("Invalid text extraction method: {}", input)),
        }
    }
}

/// How YouTube videos are turned into text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum YoutubeMode {
    /// Read the published caption track.
    #[default]
    Captions,
    /// Download the audio and run it through speech-to-text.
    Audio,
}

impl std::str::FromStr for YoutubeMode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "captions" => Ok(YoutubeMode::Captions),
            "audio" => Ok(YoutubeMode::Audio),
            _ => Err(format!("Invalid YouTube mode: {}", input)),
        }
    }
}

/// Enum representing the kind of summary to write.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SummaryStyle {
    /// Flowing prose.
    #[default]
    Normal,
    /// 10-15 bullet points.
    Bullets,
    /// Prose in Hindi, Devanagari script only.
    Hindi,
}

impl SummaryStyle {
    pub(crate) fn prompt_template(self) -> &'static str {
        match self {
            Self::Normal => NORMAL_PROMPT_TEMPLATE,
            Self::Bullets => BULLETS_PROMPT_TEMPLATE,
            Self::Hindi => HINDI_PROMPT_TEMPLATE,
        }
    }
}

impl std::str::FromStr for SummaryStyle {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "normal" => Ok(SummaryStyle::Normal),
            "bullets" | "bullet_points" => Ok(SummaryStyle::Bullets),
            "hindi" => Ok(SummaryStyle::Hindi),
            _ => Err(format!("Invalid summary style: {}", input)),
        }
    }
}

/// Enum representing the target summary length.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SummaryLength {
    /// 120-150 words.
    Short,
    /// 250-300 words.
    #[default]
    Medium,
    /// 400-500 words.
    Long,
}

impl SummaryLength {
    pub fn word_range(self) -> &'static str {
        match self {
            Self::Short => "120-150",
            Self::Medium => "250-300",
            Self::Long => "400-500",
        }
    }
}

impl std::str::FromStr for SummaryLength {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            _ => Err(format!("Invalid summary length: {}", input)),
        }
    }
}

pub use error::{Error, ErrorKind, ServiceError, ServiceErrorKind};
pub use resolver::{ResolvedContent, ResolverContext, resolve};
pub use source::{Source, classify, validate_url};
pub use summarize::{summarize_page, summarize_url};
