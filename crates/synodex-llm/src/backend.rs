//! Oracle backend trait and the OpenAI chat-completions implementation.
//!
//! The oracle is a plain prompt-in / free-text-out collaborator. Extracting
//! the structured verdict list from its raw output is the pipeline's concern
//! (see `verdict`), not the backend's.

use async_trait::async_trait;
use synodex_common::{Result, RetryClient, SynodexError};
use tracing::{debug, instrument};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The external text-classification collaborator.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn model_id(&self) -> &str;
}

pub struct OpenAiOracle {
    model: String,
    api_key: String,
    client: RetryClient,
}

impl OpenAiOracle {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, client: RetryClient) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                { "role": "user", "content": [{ "type": "text", "text": prompt }] }
            ],
        });
        let resp = self
            .client
            .execute(
                self.client
                    .post(OPENAI_CHAT_URL)
                    .bearer_auth(&self.api_key)
                    .json(&body),
            )
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SynodexError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let json: serde_json::Value = resp.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        debug!(completion_len = content.len(), "oracle completion received");
        Ok(content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
