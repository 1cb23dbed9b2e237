use super::LlmClient;
use crate::model::ModelReply;
use async_trait::async_trait;
use serde_json::json;

pub struct AnthropicClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<ModelReply> {
        let url = "https://api.anthropic.com/v1/messages";

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let resp = self
            .client
            .post(url)
            .header("x-api-key", self.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic messages API error: {}", error_text);
        }

        let json: serde_json::Value = resp.json().await?;

        let text = json
            .pointer("/content/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Anthropic API response missing content"))?
            .to_string();

        let meta = json!({
            "prompt_tokens": json.pointer("/usage/input_tokens"),
            "completion_tokens": json.pointer("/usage/output_tokens"),
        });

        Ok(ModelReply {
            text,
            provider: "anthropic".to_string(),
            model: self.model.clone(),
            meta,
        })
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}
