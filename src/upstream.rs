//! Client for the generative-text provider.
//!
//! One call per enhancement, no retries. The model is pinned so the
//! rewriting style does not drift between deployments.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{GeminiContent, GeminiError, GeminiPart, GeminiRequest, GeminiResponse};

pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream credential is not configured")]
    MissingCredential,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upstream model returned no text")]
    EmptyContent,
}

// Instruction wrapped around the user's draft. Czech, like the board itself
pub fn build_prompt(text: &str) -> String {
    format!(
        "Vylepši a profesionálně přeformuluj následující text inzerátu. \
         Zachovej původní smysl, ale udělej ho atraktivnější a stručnější. \
         Odpověz pouze vylepšeným textem, bez jakéhokoliv dalšího komentáře. \
         Původní text: \"{}\"",
        text
    )
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            // a blank key is as good as none
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, MODEL)
    }

    pub async fn enhance(&self, text: &str) -> Result<String, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::MissingCredential)?;

        let prompt = build_prompt(text);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: &prompt }],
            }],
        };

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let raw = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            warn!(status = status.as_u16(), "upstream model returned an error");
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&raw)?;
        let enhanced = parsed.text().ok_or(UpstreamError::EmptyContent)?;
        debug!(chars = enhanced.chars().count(), "upstream model answered");
        Ok(enhanced)
    }
}
