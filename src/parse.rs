use crate::TextBy;
use crate::text::collapse_whitespace;

use dom_smoothie::{CandidateSelectMode, Config, Readability, TextMode};
use log::{debug, warn};
use scraper::{Html, Selector as ScraperSelector};

/// Elements that never carry readable content.
pub const BOILERPLATE_SELECTORS: [&str; 5] = ["script", "style", "noscript", "template", "iframe"];

/// Represents an article extracted from a webpage.
///
/// This struct contains the title and text content of the article.
#[derive(Debug)]
pub struct PageArticle {
    /// The title of the article, if available.
    pub title: Option<String>,
    /// The text content of the article.
    pub text: String,
}

/// Extracts an article from the given HTML content.
///
/// Boilerplate elements and every element matching `remove_selectors` are
/// detached from the document first, then the remaining HTML goes through the
/// chosen text extraction method. When readability cannot find an article
/// candidate, the whitespace-normalized text of the whole body is used.
///
/// # Arguments
///
/// * `html` - A string slice that holds the HTML content of the webpage.
/// * `text_by` - The method to use for text extraction (dom_smoothie or fast_html2md).
/// * `remove_selectors` - CSS selectors of regions to drop before extraction.
pub fn extract_article(html: &str, text_by: &TextBy, remove_selectors: &[&str]) -> PageArticle {
    let mut document = Html::parse_document(html);
    let title = parse_title(&document);

    strip_regions(&mut document, &BOILERPLATE_SELECTORS);
    strip_regions(&mut document, remove_selectors);
    let cleaned_html = document.html();

    let text = match text_by {
        TextBy::DomSmoothie => readability_text(&cleaned_html, &document),
        TextBy::FastHtml2Md => html2md::parse_html(&cleaned_html, false),
    };

    PageArticle {
        title,
        text: text.trim().to_owned(),
    }
}

/// Detaches every element matching any of the selectors.
fn strip_regions(document: &mut Html, selectors: &[&str]) {
    for query in selectors {
        let selector = match ScraperSelector::parse(query) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Skipping invalid selector {query}: {e}");
                continue;
            }
        };

        let ids: Vec<_> = document.select(&selector).map(|node| node.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Readability text of `html`, or the body text of `document` when no article is found.
fn readability_text(html: &str, document: &Html) -> String {
    let config = Config {
        text_mode: TextMode::Formatted,
        candidate_select_mode: CandidateSelectMode::DomSmoothie,
        ..Default::default()
    };

    let parsed = Readability::new(html, None, Some(config))
        .and_then(|mut readability| readability.parse());

    match parsed {
        Ok(article) if !article.text_content.trim().is_empty() => {
            article.text_content.to_string()
        }
        Ok(_) => body_text(document),
        Err(e) => {
            debug!("Readability found no article: {e}");
            body_text(document)
        }
    }
}

fn body_text(document: &Html) -> String {
    let body = ScraperSelector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = body.unwrap_or_else(|| document.root_element());

    collapse_whitespace(&root.text().collect::<Vec<_>>().join(" "))
}

/// Parses the title from HTML content
fn parse_title(document: &Html) -> Option<String> {
    for tag in ["title", "h1", "h2"] {
        if let Ok(tag_selector) = ScraperSelector::parse(tag)
            && let Some(tag_element) = document.select(&tag_selector).next()
        {
            let tag_text = tag_element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if !tag_text.is_empty() {
                return Some(tag_text);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Cats</title><script>var tracking = 1;</script></head>
<body><nav>Home | About</nav><p>Cats sleep most of the day.</p><footer>Copyright</footer></body></html>"#;

    #[test]
    fn requested_regions_are_dropped() {
        let article = extract_article(PAGE, &TextBy::FastHtml2Md, &["nav", "footer"]);

        assert_eq!(article.title.as_deref(), Some("Cats"));
        assert!(article.text.contains("Cats sleep most of the day."));
        assert!(!article.text.contains("Home | About"));
        assert!(!article.text.contains("Copyright"));
        assert!(!article.text.contains("tracking"));
    }

    #[test]
    fn only_boilerplate_is_dropped_by_default() {
        let article = extract_article(PAGE, &TextBy::FastHtml2Md, &[]);

        assert!(article.text.contains("Copyright"));
        assert!(!article.text.contains("tracking"));
    }

    #[test]
    fn invalid_selector_is_skipped() {
        let article = extract_article(PAGE, &TextBy::FastHtml2Md, &["<<nav"]);

        assert!(article.text.contains("Cats sleep most of the day."));
    }
}
