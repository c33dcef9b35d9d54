//! Tunables of the content resolver.

use crate::constants::{CAPTION_LANGUAGES, MIN_WEBPAGE_CHARS, WIKIPEDIA_MAX_CHARS};
use crate::{TextBy, YoutubeMode};

/// Settings shared by every resolution.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Webpage text shorter than this triggers the browser fallback.
    pub min_webpage_chars: usize,
    /// Upper bound on characters fetched for a Wikipedia article.
    pub wikipedia_max_chars: usize,
    /// Caption languages in priority order.
    pub caption_languages: Vec<String>,
    /// Whether YouTube videos are read through captions or transcribed audio.
    pub youtube_mode: YoutubeMode,
    /// Text extraction method for HTML pages.
    pub text_by: TextBy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_webpage_chars: MIN_WEBPAGE_CHARS,
            wikipedia_max_chars: WIKIPEDIA_MAX_CHARS,
            caption_languages: CAPTION_LANGUAGES
                .iter()
                .map(|lang| (*lang).to_owned())
                .collect(),
            youtube_mode: YoutubeMode::default(),
            text_by: TextBy::default(),
        }
    }
}
