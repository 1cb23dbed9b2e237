use crate::config::ModelConfig;
use crate::model::ModelReply;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<ModelReply>;
    fn provider_name(&self) -> &'static str;
}

pub mod anthropic;
pub mod openai;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Build a client for one configured model, resolving its credential from
/// the environment variable named in the config.
pub fn build_client(cfg: &ModelConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    let api_key = std::env::var(&cfg.api_key_env)
        .map_err(|_| anyhow::anyhow!("{} not set for model {}", cfg.api_key_env, cfg.name))?;

    match cfg.provider.as_str() {
        "openai" => Ok(Arc::new(openai::OpenAIClient::new(
            cfg.model_id.clone(),
            api_key,
            DEFAULT_TEMPERATURE,
            DEFAULT_MAX_TOKENS,
        ))),
        "anthropic" => Ok(Arc::new(anthropic::AnthropicClient::new(
            cfg.model_id.clone(),
            api_key,
            DEFAULT_TEMPERATURE,
            DEFAULT_MAX_TOKENS,
        ))),
        other => anyhow::bail!("unsupported provider '{}' for model {}", other, cfg.name),
    }
}
