//! Builds the chat model from a `backend://model-name` URL.

use std::str::FromStr;

use anyhow::{Context, Result};
use llm::builder::{LLMBackend, LLMBuilder};
use log::info;
use url::Url;

use crate::constants::{FALLBACK_API_KEY_ENV_NAME, MODEL_API_KEY_ENV_NAME, MODEL_TEMPERATURE};

/// Model name encoded in the URL: the host, plus the path for names
/// containing `/`, plus `:username` when a user part is present.
pub fn model_name(model_url: &Url) -> Option<String> {
    let host = model_url.host_str().filter(|host| !host.is_empty())?;
    let path = model_url.path().trim_matches('/');
    let name = if path.is_empty() {
        host.to_owned()
    } else {
        format!("{host}/{path}")
    };

    Some(
        [name.as_str(), model_url.username()]
            .iter()
            .filter(|x| !x.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(":"),
    )
}

/// Reads the API key from the environment.
pub fn api_key_from_env() -> Option<String> {
    [MODEL_API_KEY_ENV_NAME, FALLBACK_API_KEY_ENV_NAME]
        .iter()
        .find_map(|name| match std::env::var(name) {
            Ok(key) if !key.trim().is_empty() => {
                info!("API key is provided by {name}");
                Some(key.trim().to_owned())
            }
            _ => None,
        })
}

/// Creates an LLM builder for the model described by `model`.
///
/// # Errors
///
/// Returns an error if the URL does not parse, names an unknown backend, or
/// carries no model name.
pub fn llm_builder(model: &str, api_key: Option<String>) -> Result<LLMBuilder> {
    let model_url = Url::parse(model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(model_name(&model_url).context("Specify model name as host URL.")?)
        .temperature(MODEL_TEMPERATURE);

    Ok(match api_key {
        Some(key) => llm_builder.api_key(key),
        None => llm_builder,
    })
}
