#![allow(dead_code)]

use async_trait::async_trait;
use rag_pipeline::{CompletionProvider, EmbeddingProvider, RagConfig, RagError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const DIMENSION: usize = 27;

/// Deterministic bag-of-letters embedding: counts of a..z plus a constant
/// bias so that no text maps to the zero vector.
pub fn letter_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMENSION];
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v[DIMENSION - 1] = 0.1;
    v
}

/// Letter-count embedder that can be told to fail on a given input.
#[derive(Default)]
pub struct MockEmbedder {
    pub fail_on: Option<String>,
    pub calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fail_on) = &self.fail_on {
            if texts.iter().any(|t| t == fail_on) {
                return Err(RagError::transient("mock-embedder", "simulated network error"));
            }
        }
        Ok(texts.iter().map(|t| letter_vector(t)).collect())
    }

    fn embedding_model(&self) -> &str {
        "mock-embedder"
    }
}

/// Completion provider that records prompts and replies with a fixed answer,
/// or fails every call when `fail` is set.
pub struct MockCompletion {
    pub answer: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: String::new(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(RagError::external("mock-llm", "rate limit exceeded"));
        }
        Ok(self.answer.clone())
    }

    fn get_system_message(&self) -> &str {
        "You are a helpful assistant."
    }

    fn get_model_info(&self) -> &str {
        "mock-llm"
    }
}

pub fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

pub fn test_config(dir: &Path, chunk_size: usize, overlap: usize, top_k: usize) -> RagConfig {
    RagConfig {
        documents_dir: dir.to_path_buf(),
        chunk_size,
        chunk_overlap: overlap,
        top_k,
        max_retries: 0,
        ..RagConfig::default()
    }
}
