//! Conversational Q&A over content loaded from a URL.
//!
//! The session is owned by the UI layer. Transitions:
//!
//! | From                     | Event                     | To                           |
//! |--------------------------|---------------------------|------------------------------|
//! | `Idle`/`Loaded`/`Failed` | `begin_load`              | `Loading`                    |
//! | `Loading`                | `finish_load(Ok(..))`     | `Loaded` (history cleared)   |
//! | `Loading`                | `finish_load(Err(..))`    | `Failed`                     |
//! | any                      | `reset`                   | `Idle` (history cleared)     |
//!
//! Any other event is rejected with [`Error::Session`] and leaves the state untouched.

use llm::chat::{ChatMessage, ChatProvider};
use log::{debug, info};
use url::Url;

use crate::constants::{CHAT_ACKNOWLEDGEMENT, CHAT_SYSTEM_PROMPT, MAX_MODEL_INPUT_CHARS};
use crate::error::{Error, Result, ServiceError};
use crate::resolver::ResolvedContent;
use crate::retry::RetryPolicy;
use crate::text::{strip_thinking, truncate_chars};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Loading { url: Url },
    Loaded { url: Url, content: ResolvedContent },
    Failed { url: Url, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message of the conversation history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug)]
pub struct ChatSession {
    state: SessionState,
    history: Vec<Turn>,
    max_context_chars: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(MAX_MODEL_INPUT_CHARS)
    }
}

impl ChatSession {
    /// Creates an idle session that embeds at most `max_context_chars` of the
    /// loaded content in every request.
    pub fn new(max_context_chars: usize) -> Self {
        Self {
            state: SessionState::Idle,
            history: Vec::new(),
            max_context_chars,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Marks the start of loading `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if another load is already in progress.
    pub fn begin_load(&mut self, url: Url) -> Result<()> {
        if let SessionState::Loading { url: pending } = &self.state {
            return Err(Error::Session(format!("{pending} is still loading")));
        }

        debug!("Session loading {url}");
        self.state = SessionState::Loading { url };
        Ok(())
    }

    /// Completes the pending load with the resolver's outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if no load is in progress.
    pub fn finish_load(&mut self, outcome: Result<ResolvedContent>) -> Result<()> {
        let SessionState::Loading { url } = &self.state else {
            return Err(Error::Session("no load in progress".to_owned()));
        };
        let url = url.clone();

        self.state = match outcome {
            Ok(content) => {
                info!("Loaded {} chars from {url}", content.text.chars().count());
                self.history.clear();
                SessionState::Loaded { url, content }
            }
            Err(err) => {
                info!("Loading {url} failed: {err}");
                SessionState::Failed {
                    url,
                    reason: err.to_string(),
                }
            }
        };
        Ok(())
    }

    /// Forgets the loaded content and the conversation.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.history.clear();
    }

    /// Answers `question` about the loaded content and records both turns.
    ///
    /// The history is only extended when the model answers.
    ///
    /// # Errors
    ///
    /// * [`Error::Session`] when no content is loaded.
    /// * [`Error::InvalidInput`] for a blank question.
    /// * The model error once `retry` gives up.
    pub async fn ask(
        &mut self,
        question: &str,
        model: &dyn ChatProvider,
        retry: &RetryPolicy,
    ) -> Result<String> {
        let SessionState::Loaded { url, content } = &self.state else {
            return Err(Error::Session("no website loaded yet".to_owned()));
        };
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("the question is empty".to_owned()));
        }

        let messages = self.build_messages(url, &content.text, question);
        let messages = &messages;
        let response = retry
            .run(move |attempt| async move {
                debug!("Asking model, attempt {attempt}");
                let response = model.chat(messages).await.map_err(ServiceError::from)?;
                Ok(response.to_string())
            })
            .await?;
        let answer = strip_thinking(&response);

        self.history.push(Turn {
            role: Role::User,
            content: question.to_owned(),
        });
        self.history.push(Turn {
            role: Role::Assistant,
            content: answer.clone(),
        });

        Ok(answer)
    }

    fn build_messages(&self, url: &Url, content: &str, question: &str) -> Vec<ChatMessage> {
        let instructions = CHAT_SYSTEM_PROMPT
            .replace("{url}", url.as_str())
            .replace("{text}", truncate_chars(content, self.max_context_chars));

        let mut messages = vec![
            ChatMessage::user().content(instructions).build(),
            ChatMessage::assistant().content(CHAT_ACKNOWLEDGEMENT).build(),
        ];

        messages.extend(self.history.iter().map(turn_message));
        messages.push(ChatMessage::user().content(question).build());

        messages
    }
}

fn turn_message(turn: &Turn) -> ChatMessage {
    let builder = match turn.role {
        Role::User => ChatMessage::user(),
        Role::Assistant => ChatMessage::assistant(),
    };
    builder.content(turn.content.clone()).build()
}
