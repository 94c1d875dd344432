pub mod deepseek;
pub mod openai;
pub mod traits;
pub mod utils;

use crate::config::{CompletionBackend, RagConfig};
use crate::error::Result;
use std::sync::Arc;

pub use deepseek::DeepSeekProvider;
pub use openai::OpenAIProvider;
pub use traits::{CompletionProvider, EmbeddingProvider};

/// The embedding and completion backends selected by the configuration.
#[derive(Clone)]
pub struct ProviderSet {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub completion: Arc<dyn CompletionProvider>,
}

impl ProviderSet {
    /// Embeddings always come from OpenAI; completions from the configured backend.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let openai = Arc::new(OpenAIProvider::new(config)?);

        let completion: Arc<dyn CompletionProvider> = match config.completion_provider {
            CompletionBackend::OpenAI => openai.clone() as Arc<dyn CompletionProvider>,
            CompletionBackend::DeepSeek => Arc::new(DeepSeekProvider::new(config)?),
        };

        log::info!(
            "Using embedding model {} and {} completion model {}",
            openai.embedding_model(),
            config.completion_provider,
            completion.get_model_info()
        );

        Ok(Self {
            embedder: openai,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    #[test]
    fn test_selects_deepseek_for_completions() {
        let config = RagConfig {
            api_key: Some(ApiKey::new("sk-openai")),
            deepseek_api_key: Some(ApiKey::new("sk-deepseek")),
            ..RagConfig::default()
        }
        .with_completion_provider(CompletionBackend::DeepSeek);

        let providers = ProviderSet::from_config(&config).unwrap();
        assert_eq!(providers.completion.get_model_info(), "deepseek-chat");
        assert_eq!(providers.embedder.embedding_model(), "text-embedding-ada-002");
    }

    #[test]
    fn test_deepseek_without_key_fails() {
        let config = RagConfig {
            api_key: Some(ApiKey::new("sk-openai")),
            ..RagConfig::default()
        }
        .with_completion_provider(CompletionBackend::DeepSeek);

        assert!(ProviderSet::from_config(&config).is_err());
    }
}
