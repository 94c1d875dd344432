use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::providers::traits::CompletionProvider;
use crate::providers::utils::{build_http_client, classify_reqwest_error, status_error};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const SERVICE: &str = "deepseek";
const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Completion-only provider for DeepSeek's OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct DeepSeekProvider {
    api_key: String,
    system_message: String,
    client: Client,
    model: String,
    temperature: f32,
}

impl DeepSeekProvider {
    pub fn new(config: &RagConfig) -> Result<Self> {
        let api_key = config.deepseek_api_key.as_ref().ok_or_else(|| {
            RagError::config("DEEPSEEK_API_KEY must be set to use the deepseek provider")
        })?;

        Ok(Self {
            api_key: api_key.expose().to_string(),
            system_message: config.system_prompt.clone(),
            client: build_http_client(config.request_timeout())?,
            model: config.chat_model.clone(),
            temperature: config.temperature,
        })
    }
}

/// Pulls the first choice's message out of a chat completion response body.
fn extract_completion(response_json: &Value) -> Result<String> {
    if let Some(error) = response_json.get("error") {
        return Err(RagError::external(SERVICE, format!("API returned error: {}", error)));
    }

    response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let debug_json = serde_json::to_string(response_json).unwrap_or_default();
            RagError::external(SERVICE, format!("invalid response format: {}", debug_json))
        })
}

#[async_trait]
impl CompletionProvider for DeepSeekProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(DEEPSEEK_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": self.system_message
                    },
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": self.temperature
            }))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(SERVICE, status, &error_text));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| RagError::external(SERVICE, e))?;

        extract_completion(&response_json)
    }

    fn get_system_message(&self) -> &str {
        &self.system_message
    }

    fn get_model_info(&self) -> &str {
        &self.model
    }
}
