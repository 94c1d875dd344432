pub mod api;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod providers;

// Re-export commonly used items
pub use config::RagConfig;
pub use error::{RagError, Result};
pub use llm::{Answer, RagSystem, SearchResult};
pub use providers::{CompletionProvider, EmbeddingProvider, ProviderSet};
