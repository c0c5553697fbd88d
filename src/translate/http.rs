//! LibreTranslate HTTP client

use super::{TranslationReadiness, Translator};
use crate::error::{Error, Result};
use crate::types::Lang;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    #[serde(default)]
    targets: Vec<String>,
}

/// Client for a LibreTranslate-compatible service
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Send an API key with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service which ru/en pairs it can translate
    pub async fn probe_readiness(&self) -> Result<TranslationReadiness> {
        let url = format!("{}/languages", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }

        let languages: Vec<LanguageEntry> = response.json().await?;
        let mut readiness = TranslationReadiness::new();
        for (src, tgt) in [(Lang::Ru, Lang::En), (Lang::En, Lang::Ru)] {
            let supported = languages
                .iter()
                .any(|entry| entry.code == src.code() && entry.targets.iter().any(|t| t == tgt.code()));
            if supported {
                readiness.mark_ready(src, tgt);
            }
        }

        tracing::debug!(url = %url, ready_pairs = readiness.len(), "translation readiness probed");
        Ok(readiness)
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, src: Lang, tgt: Lang) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: src.code(),
            target: tgt.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response.json().await?;
        Ok(parsed.translated_text)
    }
}
