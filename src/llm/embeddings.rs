use crate::error::{RagError, Result};
use crate::providers::traits::EmbeddingProvider;
use indicatif::ProgressBar;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

pub type Embedding = Vec<f32>;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Sequentially embeds texts through an [`EmbeddingProvider`].
///
/// Requests are never issued concurrently. With a batch size above one,
/// several texts share a request; the output always has one vector per input
/// in input order, all of the same dimension.
pub struct EmbeddingsManager {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    max_retries: usize,
    retry_delay: Duration,
    progress: ProgressBar,
}

impl EmbeddingsManager {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: 1,
            max_retries: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Retries transient failures up to `max_retries` times, doubling the
    /// delay between attempts.
    pub fn with_retries(mut self, max_retries: usize, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.embedding_model()
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        let mut dimension: Option<usize> = None;

        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embed_batch_with_retry(batch).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::external(
                    self.model(),
                    format!("returned {} embeddings for {} inputs", vectors.len(), batch.len()),
                ));
            }

            for vector in vectors {
                if vector.is_empty() {
                    return Err(RagError::external(self.model(), "returned an empty embedding"));
                }
                match dimension {
                    None => dimension = Some(vector.len()),
                    Some(expected) if expected != vector.len() => {
                        return Err(RagError::DimensionMismatch {
                            expected,
                            actual: vector.len(),
                        });
                    }
                    Some(_) => {}
                }
                embeddings.push(vector);
            }
            self.progress.inc(batch.len() as u64);
        }

        debug!("Created {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    pub async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::external(self.model(), "no embedding returned"))
    }

    async fn embed_batch_with_retry(&self, batch: &[String]) -> Result<Vec<Embedding>> {
        let mut attempt = 0usize;
        loop {
            match self.provider.embed(batch).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff(attempt);
                    warn!(
                        "Embedding request failed ({}), retrying in {:?} (attempt {}/{})",
                        e, delay, attempt, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.saturating_sub(1).min(5) as u32;
        self.retry_delay * (1 << capped)
    }
}
