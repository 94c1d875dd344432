mod loader;
mod processor;

pub use loader::DocumentLoader;
pub use processor::{reassemble, TextProcessor};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A loaded text file. Discarded once it has been chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name relative to the documents directory.
    pub id: String,
    pub path: PathBuf,
    pub content: String,
}

/// A slice of a document used as a retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Id of the document this chunk was cut from.
    pub source: String,
    /// Position of the chunk within its document.
    pub index: usize,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            index,
        }
    }
}
