//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the generation engine and its HTTP collaborators.
///
/// All fields have usable defaults; `from_env` overlays `PITAYA_*`
/// environment variables on top of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the completion service (OpenAI-style API surface).
    pub completion_base_url: String,
    /// Model identifier sent with completion requests.
    pub completion_model: String,
    /// Bearer key for the completion service.
    pub completion_api_key: String,
    /// Timeout for the single completion attempt, in seconds.
    pub completion_timeout_secs: u64,
    /// Sampling temperature for completion requests.
    pub completion_temperature: f32,
    /// Token ceiling for completion responses.
    pub completion_max_tokens: u32,
    /// Base URL blobs are uploaded under.
    pub blob_base_url: String,
    /// Object-key prefix for generated artifacts.
    pub object_prefix: String,
    /// Slide count used when the request leaves it unspecified.
    pub default_slide_count: u32,
    /// Hard ceiling on planned slides.
    pub max_slide_count: u32,
    /// Page size used when no template supplies one, in pixels.
    pub default_page_size: (u32, u32),
    /// Failure messages are truncated to this many characters before being
    /// surfaced in a job outcome.
    pub error_message_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_base_url: "https://api.siliconflow.cn/v1".to_string(),
            completion_model: "Qwen/Qwen2.5-72B-Instruct".to_string(),
            completion_api_key: String::new(),
            completion_timeout_secs: 60,
            completion_temperature: 0.7,
            completion_max_tokens: 4096,
            blob_base_url: String::new(),
            object_prefix: "ppt".to_string(),
            default_slide_count: 10,
            max_slide_count: 30,
            default_page_size: (1280, 720),
            error_message_limit: 500,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from defaults overlaid with `PITAYA_*`
    /// environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("PITAYA_COMPLETION_BASE_URL") {
            config.completion_base_url = v;
        }
        if let Ok(v) = std::env::var("PITAYA_COMPLETION_MODEL") {
            config.completion_model = v;
        }
        if let Ok(v) = std::env::var("PITAYA_COMPLETION_API_KEY") {
            config.completion_api_key = v;
        }
        if let Ok(v) = std::env::var("PITAYA_COMPLETION_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.completion_timeout_secs = n;
        }
        if let Ok(v) = std::env::var("PITAYA_BLOB_BASE_URL") {
            config.blob_base_url = v;
        }
        if let Ok(v) = std::env::var("PITAYA_OBJECT_PREFIX") {
            config.object_prefix = v;
        }
        config
    }

    /// Clamp a requested slide count into the configured window.
    pub fn clamp_slide_count(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|&n| n > 0)
            .unwrap_or(self.default_slide_count)
            .min(self.max_slide_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_slide_count() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_slide_count(None), 10);
        assert_eq!(config.clamp_slide_count(Some(0)), 10);
        assert_eq!(config.clamp_slide_count(Some(5)), 5);
        assert_eq!(config.clamp_slide_count(Some(99)), 30);
    }
}
