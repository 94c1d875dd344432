use crate::error::Result;
use async_trait::async_trait;

/// Turns text into vectors. One output vector per input string, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embedding_model(&self) -> &str;
}

/// Generates an answer for a prompt under the provider's system message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn get_system_message(&self) -> &str;

    fn get_model_info(&self) -> &str;
}
