use std::collections::VecDeque;
use std::sync::Mutex;

use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, Tool},
    error::LLMError,
};

#[macro_export]
macro_rules! assert_responses {
    (
        $(
            $test_name:ident : response => $response:expr, result => $result:expr
        ),+ $(,)?
    ) => {
        $(
            #[tokio::test]
            async fn $test_name() {
                let context = pagegist::summarize::SummarizeContext {
                    model: &StubLlmProvider::answering($response),
                    prompt_template: None,
                    style: pagegist::SummaryStyle::default(),
                    length: pagegist::SummaryLength::default(),
                    max_input_chars: 100,
                };
                let result = pagegist::summarize::summarize_page("", "", &context)
                    .await
                    .expect("Expected successful processing.");

                assert_that(&result).is_equal_to($result.to_owned());
            }
        )+
    }
}

/// One scripted model reply.
#[derive(Clone, Debug)]
pub(crate) enum Reply {
    Text(String),
    RateLimited,
    Unauthorized,
    Network,
}

impl Reply {
    fn into_result(self) -> Result<String, LLMError> {
        match self {
            Reply::Text(text) => Ok(text),
            Reply::RateLimited => Err(LLMError::ProviderError(
                "429 Too Many Requests: rate limit reached".to_owned(),
            )),
            Reply::Unauthorized => Err(LLMError::AuthError("Invalid API Key".to_owned())),
            Reply::Network => Err(LLMError::HttpError("connection reset".to_owned())),
        }
    }
}

/// A message as the model received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Seen {
    pub from_user: bool,
    pub content: String,
}

/// Replays scripted replies in order and records every request. The last
/// reply repeats once the script runs out.
pub(crate) struct StubLlmProvider {
    replies: Mutex<VecDeque<Reply>>,
    last: Reply,
    pub requests: Mutex<Vec<Vec<Seen>>>,
}

impl StubLlmProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or_else(|| Reply::Text(String::new()));
        StubLlmProvider {
            replies: Mutex::new(replies.into()),
            last,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(vec![Reply::Text(text.to_owned())])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests mutex poisoned").len()
    }

    /// Messages of the `index`-th request.
    pub fn request(&self, index: usize) -> Vec<Seen> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        self.requests.lock().expect("requests mutex poisoned").push(
            messages
                .iter()
                .map(|message| Seen {
                    from_user: matches!(message.role, ChatRole::User),
                    content: message.content.clone(),
                })
                .collect(),
        );
        let reply = self
            .replies
            .lock()
            .expect("replies mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        reply.into_result()
    }
}

#[derive(Debug)]
struct StringResponse(String);

impl ChatResponse for StringResponse {
    fn text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
        panic!()
    }

    fn thinking(&self) -> Option<String> {
        None
    }

    fn usage(&self) -> Option<llm::chat::Usage> {
        None
    }
}

impl std::fmt::Display for StringResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let reply = self.next_reply(messages);
        Box::pin(async move {
            reply.map(|text| Box::new(StringResponse(text)) as Box<dyn ChatResponse>)
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}
