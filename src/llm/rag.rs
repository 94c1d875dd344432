use crate::config::RagConfig;
use crate::document::{DocumentLoader, TextProcessor};
use crate::error::{RagError, Result};
use crate::llm::embeddings::EmbeddingsManager;
use crate::llm::retrieval::{RetrievalSystem, SearchResult};
use crate::providers::traits::{CompletionProvider, EmbeddingProvider};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SearchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: Option<usize>,
}

/// Retrieval-augmented question answering over a directory of text files.
///
/// Construction runs the whole build phase (load, chunk, embed, index) and
/// fails as a unit. After that the index is read-only, so a `RagSystem` can be
/// shared behind an `Arc` without locking.
pub struct RagSystem {
    embeddings: EmbeddingsManager,
    retrieval: RetrievalSystem,
    completion: Arc<dyn CompletionProvider>,
    top_k: usize,
    document_count: usize,
}

impl RagSystem {
    pub async fn build(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        Self::build_with_progress(config, embedder, completion, ProgressBar::hidden()).await
    }

    /// Like [`RagSystem::build`], advancing `progress` once per embedded chunk.
    pub async fn build_with_progress(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        completion: Arc<dyn CompletionProvider>,
        progress: ProgressBar,
    ) -> Result<Self> {
        config.check()?;

        let loader = DocumentLoader::new(&config.documents_dir).with_extensions(&config.extensions);
        let processor = TextProcessor::new(config.chunk_size, config.chunk_overlap)?;

        let documents = loader.load_documents().await?;
        let document_count = documents.len();

        let mut chunks = Vec::new();
        for document in &documents {
            if document.content.is_empty() {
                warn!("Skipping empty document {}", document.id);
                continue;
            }
            chunks.extend(processor.chunk_document(document)?);
        }
        drop(documents);
        info!("Split {} documents into {} chunks", document_count, chunks.len());

        progress.set_length(chunks.len() as u64);
        let embeddings = EmbeddingsManager::new(embedder)
            .with_batch_size(config.embedding_batch_size)
            .with_retries(config.max_retries, RETRY_BASE_DELAY)
            .with_progress(progress.clone());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embeddings.embed(&texts).await?;

        let mut retrieval = RetrievalSystem::new();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            retrieval.add(chunk, vector)?;
        }
        progress.finish_and_clear();
        let embeddings = embeddings.with_progress(ProgressBar::hidden());

        info!(
            "Indexed {} chunks (dimension {}) with {}",
            retrieval.len(),
            retrieval.dimension().unwrap_or(0),
            embeddings.model()
        );

        Ok(Self {
            embeddings,
            retrieval,
            completion,
            top_k: config.top_k,
            document_count,
        })
    }

    /// Answers using the configured number of context chunks.
    pub async fn answer_question(&self, question: &str) -> Result<String> {
        Ok(self.answer_with_sources(question, None).await?.answer)
    }

    /// Answers and returns the ranked chunks that were given to the model.
    pub async fn answer_with_sources(&self, question: &str, top_k: Option<usize>) -> Result<Answer> {
        let top_k = top_k.unwrap_or(self.top_k);
        if top_k == 0 {
            return Err(RagError::config("top_k must be at least 1"));
        }
        let sources = self.retrieve(question, top_k).await?;
        let prompt = format_prompt(question, &sources);
        debug!("Sending prompt of {} chars to {}", prompt.len(), self.completion.get_model_info());

        let answer = self.completion.complete(&prompt).await?;
        Ok(Answer { answer, sources })
    }

    /// Embeds the question and returns the `k` most similar chunks.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::config("question must not be empty"));
        }
        if self.retrieval.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let query = self.embeddings.embed_one(question).await?;
        let results = self.retrieval.search(&query, k)?;
        debug!("Retrieved {} chunks for question", results.len());
        Ok(results)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.document_count,
            chunks: self.retrieval.len(),
            dimension: self.retrieval.dimension(),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn retrieval(&self) -> &RetrievalSystem {
        &self.retrieval
    }

    pub fn completion_model(&self) -> &str {
        self.completion.get_model_info()
    }
}

pub fn format_prompt(question: &str, sources: &[SearchResult]) -> String {
    let context = sources
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!("Context: {}\n\nQuestion: {}\n\nAnswer:", context, question.trim())
}
