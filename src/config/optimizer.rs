use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Environment variable consulted when `optimizer.api_key` is not set in `config.toml`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub static DEFAULT_CHAT_COMPLETIONS_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.openai.com/v1/chat/completions")
        .expect("default chat completions url must be valid")
});

/// Remote optimizer (chat completion) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Chat completions endpoint. Any OpenAI-compatible gateway works.
    /// TOML: `optimizer.api_url`. Default: `https://api.openai.com/v1/chat/completions`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Bearer credential for the endpoint.
    /// TOML: `optimizer.api_key`. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    /// TOML: `optimizer.model`. Default: `gpt-4`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; kept low so rewrites stay close to deterministic.
    /// TOML: `optimizer.temperature`. Default: `0.2`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `optimizer.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TCP connect timeout in seconds.
    /// TOML: `optimizer.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds (completions can be slow).
    /// TOML: `optimizer.timeout_secs`. Default: `120`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a retryable failure (transport error, 429, 5xx). `0` disables retry.
    /// TOML: `optimizer.retry_max_times`. Default: `0`.
    #[serde(default)]
    pub retry_max_times: usize,
}

/// Optimizer settings with the environment fallback applied.
#[derive(Debug, Clone)]
pub struct OptimizerResolvedConfig {
    pub api_url: Url,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub proxy: Option<Url>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub retry_max_times: usize,
}

impl OptimizerConfig {
    /// Resolve the credential: a non-blank `api_key` wins, otherwise `env_key` (blank counts as unset).
    pub fn resolve(&self, env_key: Option<String>) -> OptimizerResolvedConfig {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_key.filter(|k| !k.trim().is_empty()));

        OptimizerResolvedConfig {
            api_url: self.api_url.clone(),
            api_key,
            model: self.model.clone(),
            temperature: self.temperature,
            proxy: self.proxy.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            timeout_secs: self.timeout_secs,
            retry_max_times: self.retry_max_times,
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            proxy: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            retry_max_times: 0,
        }
    }
}

fn default_api_url() -> Url {
    DEFAULT_CHAT_COMPLETIONS_URL.clone()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_wins_over_env() {
        let cfg = OptimizerConfig {
            api_key: Some("from-toml".to_string()),
            ..Default::default()
        };
        let resolved = cfg.resolve(Some("from-env".to_string()));
        assert_eq!(resolved.api_key.as_deref(), Some("from-toml"));
    }

    #[test]
    fn blank_config_key_falls_back_to_env() {
        let cfg = OptimizerConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cfg.resolve(Some("from-env".to_string())).api_key.as_deref(),
            Some("from-env")
        );
        assert_eq!(cfg.resolve(Some(String::new())).api_key, None);
        assert_eq!(cfg.resolve(None).api_key, None);
    }
}
