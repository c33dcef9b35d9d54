//! Speech-to-text through an OpenAI-compatible `/audio/transcriptions` endpoint.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::fetch::Transcriber;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct GroqTranscriber {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GroqTranscriber {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Transcriber for GroqTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::unauthorized("No API key configured for transcription"));
        }

        let bytes = tokio::fs::read(audio).await?;
        info!(
            "Transcribing {} ({} bytes) with {}",
            audio.display(),
            bytes.len(),
            self.model
        );

        let file_name = audio
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_owned());
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = ServiceError::check_response(response).await?;
        let transcription: TranscriptionResponse = response.json().await?;

        let chars = transcription.text.chars().count();
        debug!("Transcript has {chars} chars");
        Ok(transcription.text.trim().to_owned())
    }
}
