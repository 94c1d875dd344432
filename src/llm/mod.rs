pub mod embeddings;
pub mod rag;
pub mod retrieval;

pub use embeddings::{Embedding, EmbeddingsManager};
pub use rag::{format_prompt, Answer, IndexStats, RagSystem};
pub use retrieval::{cosine_similarity, IndexEntry, RetrievalSystem, SearchResult};
