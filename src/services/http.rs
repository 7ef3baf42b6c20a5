//! Reqwest-backed collaborator services.
//!
//! Each client performs exactly one request per call with a bounded
//! timeout; retry policy belongs to the embedding system, not here.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::services::{BlobStore, CompletionClient, TemplateFetcher};
use log::error;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;

/// Chat-completions client for an OpenAI-style API surface.
#[derive(Clone)]
pub struct HttpCompletionClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpCompletionClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()
            .map_err(|e| Error::Completion(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.completion_base_url.trim_end_matches('/').to_string(),
            model: config.completion_model.clone(),
            api_key: config.completion_api_key.clone(),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
            client,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a helpful assistant that answers precisely and follows output format instructions."},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                error!("completion request failed: {e}");
                Error::Completion(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Completion(format!("completion service returned {status}")));
        }

        let payload: Value =
            response.json().map_err(|e| Error::Completion(e.to_string()))?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Completion("response carried no message content".to_string()))
    }
}

/// Fetches template bytes from a URL reference.
#[derive(Debug, Clone)]
pub struct HttpTemplateFetcher {
    client: Client,
}

impl HttpTemplateFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::TemplateFetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl TemplateFetcher for HttpTemplateFetcher {
    fn fetch(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }
        if !reference.starts_with("http://") && !reference.starts_with("https://") {
            return Ok(None);
        }

        let response = self
            .client
            .get(reference)
            .send()
            .map_err(|e| Error::TemplateFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::TemplateFetch(format!(
                "template fetch returned {}",
                response.status()
            )));
        }
        let bytes = response.bytes().map_err(|e| Error::TemplateFetch(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// Uploads artifacts with a PUT to `{base}/{key}` and hands back the
/// resulting public URL.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    base_url: String,
    client: Client,
}

impl HttpBlobStore {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()
            .map_err(|e| Error::Upload(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url: config.blob_base_url.trim_end_matches('/').to_string(), client })
    }
}

impl BlobStore for HttpBlobStore {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let url = format!("{}/{key}", self.base_url);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .map_err(|e| Error::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Upload(format!("upload returned {}", response.status())));
        }
        Ok(url)
    }
}
