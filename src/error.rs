//! Error types shared by the resolver, its collaborators and the summarizer.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for pagegist library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How a failed call to an external service should be treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The service asked us to slow down (HTTP 429 or equivalent).
    RateLimited,
    /// Credentials were missing or rejected.
    Unauthorized,
    /// Connection failures, timeouts and server-side errors.
    Network,
    /// The request can never succeed as issued.
    Permanent,
    /// Anything that could not be classified.
    Unknown,
}

/// Failure reported by an external collaborator (HTTP endpoint, subprocess, model).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::RateLimited, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unauthorized, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Permanent, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unknown, message)
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {}", body.trim())
        };

        let kind = match status {
            StatusCode::TOO_MANY_REQUESTS => ServiceErrorKind::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceErrorKind::Unauthorized,
            StatusCode::REQUEST_TIMEOUT => ServiceErrorKind::Network,
            status if status.is_server_error() => ServiceErrorKind::Network,
            status if status.is_client_error() => ServiceErrorKind::Permanent,
            _ => ServiceErrorKind::Unknown,
        };

        Self::new(kind, message)
    }

    /// Turns a non-success response into an error, passing successful ones through.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`] when the response status is not 2xx.
    pub async fn check_response(
        response: reqwest::Response,
    ) -> std::result::Result<reqwest::Response, Self> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::from_status(status, &body))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, &err.to_string());
        }

        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::network(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::permanent(format!("Malformed response: {err}"))
        } else {
            Self::unknown(err.to_string())
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::unknown(format!("I/O error: {err}"))
    }
}

impl From<llm::error::LLMError> for ServiceError {
    fn from(err: llm::error::LLMError) -> Self {
        use llm::error::LLMError;

        match err {
            LLMError::AuthError(message) => Self::unauthorized(message),
            LLMError::HttpError(message) => Self::network(message),
            LLMError::InvalidRequest(message) => Self::permanent(message),
            other => {
                // Providers report rate limits only through the message text.
                let message = other.to_string();
                let lowered = message.to_lowercase();
                if lowered.contains("429") || lowered.contains("rate limit") {
                    Self::rate_limited(message)
                } else if lowered.contains("401") || lowered.contains("invalid api key") {
                    Self::unauthorized(message)
                } else {
                    Self::unknown(message)
                }
            }
        }
    }
}

/// Coarse taxonomy driving retry decisions and user-facing reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NoContent,
    RateLimited,
    Transient,
    Permanent,
    Unknown,
}

/// Why a URL could not be turned into text, or why a model call failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsupported input URL.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The source was reachable but yielded nothing usable.
    #[error("No readable content found: {0}")]
    NoContent(String),

    #[error("Captions are disabled for video {0}.")]
    CaptionsDisabled(String),

    #[error("No captions found for video {video_id} in languages: {}.", languages.join(", "))]
    NoCaptionTrack {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Video {video_id} is private, members-only, or region-blocked: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    /// An operation was attempted in the wrong chat session state.
    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Session(_) => ErrorKind::InvalidInput,
            Self::NoContent(_) => ErrorKind::NoContent,
            Self::CaptionsDisabled(_)
            | Self::NoCaptionTrack { .. }
            | Self::VideoUnavailable { .. } => ErrorKind::Permanent,
            Self::Service(err) => match err.kind {
                ServiceErrorKind::RateLimited => ErrorKind::RateLimited,
                ServiceErrorKind::Network => ErrorKind::Transient,
                ServiceErrorKind::Unauthorized | ServiceErrorKind::Permanent => {
                    ErrorKind::Permanent
                }
                ServiceErrorKind::Unknown => ErrorKind::Unknown,
            },
        }
    }
}

/// Failure of a caption-track lookup.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("captions disabled")]
    Disabled,
    #[error("no caption track in the requested languages")]
    NotFound,
    #[error("video unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CaptionError {
    /// Attaches the video context the lookup itself does not carry.
    pub fn into_error(self, video_id: &str, languages: &[String]) -> Error {
        match self {
            Self::Disabled => Error::CaptionsDisabled(video_id.to_owned()),
            Self::NotFound => Error::NoCaptionTrack {
                video_id: video_id.to_owned(),
                languages: languages.to_vec(),
            },
            Self::Unavailable(reason) => Error::VideoUnavailable {
                video_id: video_id.to_owned(),
                reason,
            },
            Self::Service(err) => Error::Service(err),
        }
    }
}

impl From<reqwest::Error> for CaptionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Service(err.into())
    }
}
