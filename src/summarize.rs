//! The summarize module turns resolved text into a summary using an LLM model,
//! and drives the resolve-then-summarize pipeline under a retry policy.

use llm::chat::{ChatMessage, ChatMessageBuilder, ChatProvider};
use log::{debug, info};
use url::Url;

use crate::error::{Error, Result, ServiceError};
use crate::resolver::{ResolverContext, resolve};
use crate::retry::RetryPolicy;
use crate::source::Source;
use crate::text::{strip_thinking, truncate_chars};
use crate::{SummaryLength, SummaryStyle};

/// Configuration containing shared data for summarization operations
pub struct SummarizeContext<'a> {
    /// LLM model to use for summarization
    pub model: &'a dyn ChatProvider,
    /// Prompt template replacing the built-in one for `style`
    pub prompt_template: Option<&'a str>,
    pub style: SummaryStyle,
    pub length: SummaryLength,
    /// Input text beyond this many characters is not sent to the model
    pub max_input_chars: usize,
}

/// A summary together with the source it was produced from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub source: Source,
    pub text: String,
}

/// Summarises text from `url` using an LLM model.
///
/// The text is capped at `ctx.max_input_chars` characters. The template
/// placeholders `{url}`, `{range}` and `{text}` are substituted; a template
/// without `{text}` gets the text as a separate message.
///
/// # Arguments
///
/// * `url` - The URL the text was read from
/// * `text` - The text to summarize
/// * `ctx` - Context containing model, prompt settings and the input cap
///
/// # Returns
///
/// Returns the summary with any `<think>` section removed
///
/// # Errors
///
/// Returns an error if the LLM chat operation fails
pub async fn summarize_page(
    url: &str,
    text: &str,
    ctx: &SummarizeContext<'_>,
) -> std::result::Result<String, ServiceError> {
    let text = truncate_chars(text, ctx.max_input_chars);
    let prompt_template = ctx
        .prompt_template
        .unwrap_or_else(|| ctx.style.prompt_template());
    let prompt = prompt_template
        .replace("{url}", url)
        .replace("{range}", ctx.length.word_range())
        .replace("{text}", text);

    let mut messages: Vec<ChatMessageBuilder> = vec![ChatMessage::user().content(prompt)];

    if !prompt_template.contains("{text}") {
        messages.push(ChatMessage::user().content(text));
    }

    let messages: Vec<ChatMessage> = messages
        .into_iter()
        .map(|message| message.build())
        .collect();

    let response = ctx.model.chat(&messages).await?.to_string();

    Ok(strip_thinking(&response))
}

/// Resolves `url` to text and summarizes it, retrying the whole pipeline
/// according to `retry`.
///
/// # Errors
///
/// Returns the last resolution or model error once retrying stops, or
/// [`Error::NoContent`] if the model answered with an empty summary.
pub async fn summarize_url(
    url: &Url,
    resolver: &ResolverContext<'_>,
    ctx: &SummarizeContext<'_>,
    retry: &RetryPolicy,
) -> Result<Summary> {
    let summary = retry
        .run(move |attempt| async move {
            debug!("Summarizing {url}, attempt {attempt}");
            let content = resolve(url, resolver).await?;
            let text = summarize_page(url.as_str(), &content.text, ctx).await?;

            if text.is_empty() {
                return Err(Error::NoContent(format!(
                    "the model returned an empty summary for {url}"
                )));
            }

            Ok(Summary {
                source: content.source,
                text,
            })
        })
        .await?;

    info!(
        "Summarized {} into {} words",
        summary.source,
        summary.text.split_whitespace().count()
    );
    Ok(summary)
}
