use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use log::debug;

/// Splits text into fixed-size, overlapping character windows.
///
/// Sizes are counted in `char`s, so multi-byte text is never cut inside a
/// code point. Consecutive chunks share exactly `overlap` characters and only
/// the final chunk may be shorter than `chunk_size`.
#[derive(Debug, Clone, Copy)]
pub struct TextProcessor {
    chunk_size: usize,
    overlap: usize,
}

impl TextProcessor {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::config("chunk size must be at least 1"));
        }
        if overlap >= chunk_size {
            return Err(RagError::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn split_into_chunks(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Err(RagError::config("cannot chunk empty text"));
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::with_capacity(total / step + 1);
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(total);
            chunks.push(chars[start..end].iter().collect());
            if end == total {
                break;
            }
            start += step;
        }
        Ok(chunks)
    }

    pub fn chunk_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        let chunks: Vec<Chunk> = self
            .split_into_chunks(&document.content)?
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(text, document.id.clone(), index))
            .collect();
        debug!("Split {} into {} chunks", document.id, chunks.len());
        Ok(chunks)
    }
}

/// Rebuilds the original text from chunks produced with the given overlap.
pub fn reassemble<S: AsRef<str>>(chunks: &[S], overlap: usize) -> String {
    let mut text = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk = chunk.as_ref();
        if i == 0 {
            text.push_str(chunk);
        } else {
            text.extend(chunk.chars().skip(overlap));
        }
    }
    text
}
