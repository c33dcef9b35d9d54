//! Browser-rendering fallback. Runs a headless Chromium to execute the page's
//! scripts and dumps the resulting DOM.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;
use url::Url;

use crate::TextBy;
use crate::constants::FALLBACK_REMOVE_SELECTORS;
use crate::error::ServiceError;
use crate::fetch::PageRenderer;
use crate::parse::extract_article;

pub struct HeadlessBrowser {
    binary: PathBuf,
    user_agent: String,
    timeout: Duration,
    text_by: TextBy,
}

impl HeadlessBrowser {
    pub fn new(
        binary: impl Into<PathBuf>,
        user_agent: impl Into<String>,
        timeout: Duration,
        text_by: TextBy,
    ) -> Self {
        Self {
            binary: binary.into(),
            user_agent: user_agent.into(),
            timeout,
            text_by,
        }
    }

    async fn dump_dom(&self, url: &Url) -> Result<String, ServiceError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--hide-scrollbars")
            .arg(format!("--user-agent={}", self.user_agent))
            .arg(format!(
                "--virtual-time-budget={}",
                self.timeout.as_millis().min(u128::from(u32::MAX))
            ))
            .arg("--dump-dom")
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            ServiceError::permanent(format!(
                "Unable to start browser {}: {e}",
                self.binary.display()
            ))
        })?;

        // Virtual time only bounds page scripts; the process itself gets twice the budget.
        let output = tokio::time::timeout(self.timeout.saturating_mul(2), child.wait_with_output())
            .await
            .map_err(|_| ServiceError::network(format!("Browser timed out rendering {url}")))??;

        if !output.status.success() {
            return Err(ServiceError::unknown(format!(
                "Browser exited with {} rendering {url}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl PageRenderer for HeadlessBrowser {
    async fn render_documents(&self, url: &Url) -> Result<Vec<String>, ServiceError> {
        info!("Rendering {url} with {}", self.binary.display());
        let html = self.dump_dom(url).await?;

        let article = extract_article(&html, &self.text_by, &FALLBACK_REMOVE_SELECTORS);
        debug!("Rendered {} chars from {url}", article.text.chars().count());

        if article.text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![article.text])
    }
}
