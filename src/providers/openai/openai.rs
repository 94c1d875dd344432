use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::providers::traits::{CompletionProvider, EmbeddingProvider};
use crate::providers::utils::build_http_client;
use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, EmbeddingInput,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use log::debug;
use std::time::Duration;

const SERVICE: &str = "openai";

/// OpenAI embeddings and chat completions through `async-openai`.
#[derive(Clone)]
pub struct OpenAIProvider {
    system_message: String,
    client: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAIProvider {
    pub fn new(config: &RagConfig) -> Result<Self> {
        let api_key = config.api_key.as_ref().ok_or_else(|| {
            RagError::config("OpenAI API key must be provided via --api-key or OPENAI_API_KEY")
        })?;

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key.expose());
        if let Some(base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
        }
        let http = build_http_client(config.request_timeout())?;
        // Retries are owned by EmbeddingsManager; the client gives up after one attempt.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(openai_config)
            .with_http_client(http)
            .with_backoff(no_retry);

        Ok(Self {
            system_message: config.system_prompt.clone(),
            client,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        })
    }
}

fn map_openai_error(err: OpenAIError) -> RagError {
    match err {
        OpenAIError::Reqwest(e) => RagError::transient(SERVICE, e),
        OpenAIError::ApiError(api) if is_transient_api_error(&api) => {
            RagError::transient(SERVICE, api.message)
        }
        OpenAIError::ApiError(api) => RagError::external(SERVICE, api.message),
        other => RagError::external(SERVICE, other),
    }
}

/// The client drops the HTTP status, so rate limits and server errors are
/// recognised from the error body. An exhausted quota is not transient.
fn is_transient_api_error(err: &ApiError) -> bool {
    let code = err.code.as_ref().and_then(|c| c.as_str());
    if code == Some("insufficient_quota") || err.r#type.as_deref() == Some("insufficient_quota") {
        return false;
    }
    code == Some("rate_limit_exceeded")
        || matches!(
            err.r#type.as_deref(),
            Some("server_error") | Some("requests") | Some("tokens") | Some("rate_limit_exceeded")
        )
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(RagError::external(
                SERVICE,
                format!("returned {} embeddings for {} inputs", data.len(), texts.len()),
            ));
        }
        data.sort_by_key(|entry| entry.index);
        debug!("Received {} embeddings from {}", data.len(), self.embedding_model);

        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_message.as_str())
            .build()
            .map_err(map_openai_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(map_openai_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(self.temperature)
            .messages(vec![
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RagError::external(SERVICE, "no response content"))
    }

    fn get_system_message(&self) -> &str {
        &self.system_message
    }

    fn get_model_info(&self) -> &str {
        &self.chat_model
    }
}
