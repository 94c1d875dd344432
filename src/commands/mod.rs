use colored::Colorize;
use std::sync::Arc;

use crate::llm::{RagSystem, SearchResult};

mod system;

pub use system::help_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Reply(String),
    Exit,
    Nothing,
}

/// Interprets one line of interactive input against a built [`RagSystem`].
pub struct CommandHandler {
    rag: Arc<RagSystem>,
}

impl CommandHandler {
    pub fn new(rag: Arc<RagSystem>) -> Self {
        Self { rag }
    }

    pub async fn handle_command(&self, input: &str) -> Result<CommandResult, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(CommandResult::Nothing);
        }

        match input.to_lowercase().as_str() {
            "help" => return Ok(CommandResult::Reply(help_text())),
            "exit" | "quit" => return Ok(CommandResult::Exit),
            "stats" => return Ok(CommandResult::Reply(self.stats())),
            "sources" => return Err("Usage: sources <question>".to_string()),
            _ => {}
        }

        if let Some(question) = input.strip_prefix("sources ") {
            return self.show_sources(question).await;
        }

        self.rag
            .answer_question(input)
            .await
            .map(CommandResult::Reply)
            .map_err(|e| format!("Failed to answer question: {}", e))
    }

    fn stats(&self) -> String {
        let stats = self.rag.stats();
        format!(
            "Documents: {}\nChunks: {}\nEmbedding dimension: {}\nCompletion model: {}",
            stats.documents,
            stats.chunks,
            stats
                .dimension
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.rag.completion_model()
        )
    }

    async fn show_sources(&self, question: &str) -> Result<CommandResult, String> {
        let results = self
            .rag
            .retrieve(question, self.rag.top_k())
            .await
            .map_err(|e| format!("Failed to retrieve sources: {}", e))?;
        Ok(CommandResult::Reply(format_results(&results)))
    }
}

pub fn format_results(results: &[SearchResult]) -> String {
    let mut formatted = String::new();
    for (i, result) in results.iter().enumerate() {
        formatted.push_str(&format!(
            "{}. [Score: {:.2}] {} (Source: {} #{})\n",
            i + 1,
            result.score,
            result.text.trim(),
            result.source.bright_yellow(),
            result.chunk_index
        ));
    }
    formatted
}
