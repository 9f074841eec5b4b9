use crate::config::OptimizerResolvedConfig;
use crate::error::{IsRetryable, OptimizerError};
use crate::optimizer::api::ChatApi;
use crate::optimizer::prompt::build_messages;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use sqlpilot_schema::ChatCompletionRequest;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

/// Source of rewritten SQL. The session orchestrator only depends on this seam.
#[async_trait]
pub trait Optimizer: Send + Sync {
    /// Ask for an optimized version of `original_sql` and return the completion text verbatim.
    async fn optimize(&self, original_sql: &str) -> Result<String, OptimizerError>;
}

/// Chat-completions backed optimizer.
///
/// Notes:
/// - Timeouts come from config and are enforced by the reqwest client.
/// - Retries happen only for retryable errors and only when `retry_max_times > 0`.
pub struct OpenaiChatClient {
    client: reqwest::Client,
    api_url: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    retry_policy: ExponentialBuilder,
}

impl OpenaiChatClient {
    pub fn new(cfg: &OptimizerResolvedConfig) -> Result<Self, OptimizerError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("sqlpilot/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs));

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| OptimizerError::InvalidProxy(format!("{proxy_url}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        Ok(Self::with_client(cfg, client))
    }

    pub fn with_client(cfg: &OptimizerResolvedConfig, client: reqwest::Client) -> Self {
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(300))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            retry_policy,
        }
    }

    pub fn request_body(&self, original_sql: &str) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.model.clone(), build_messages(original_sql))
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl Optimizer for OpenaiChatClient {
    async fn optimize(&self, original_sql: &str) -> Result<String, OptimizerError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(OptimizerError::MissingApiKey)?;
        let body = self.request_body(original_sql);

        let start = Instant::now();
        let op = || ChatApi::post_chat(&self.client, &self.api_url, api_key, &body);
        let resp = op
            .retry(self.retry_policy)
            .when(|err: &OptimizerError| err.is_retryable())
            .notify(|err, dur: Duration| {
                warn!("Optimizer retrying after error {} in {:?}", err, dur);
            })
            .await?;

        info!(
            model = %self.model,
            took_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            choices = resp.choices.len(),
            total_tokens = resp.usage.map(|u| u.total_tokens),
            "Completion received"
        );

        resp.first_content()
            .map(str::to_string)
            .ok_or(OptimizerError::EmptyCompletion)
    }
}
