use colored::Colorize;

pub fn help_text() -> String {
    let mut help = String::new();
    help.push_str(&format!("\n{}\n", "📚 Document Q&A Commands:".bold()));
    help.push_str("  Just type your question about the loaded documents\n");
    help.push_str("  Example: What was the answer to the guardian's riddle?\n\n");

    help.push_str(&format!("{}\n", "🔎 Retrieval Commands:".bold()));
    help.push_str("  sources <question>  - Show the chunks that would be used as context\n");
    help.push_str("  stats               - Show documents, chunks and embedding dimension\n\n");

    help.push_str(&format!("{}\n", "⚙️ System Commands:".bold()));
    help.push_str("  help  - Show this help menu\n");
    help.push_str("  exit  - Exit the program\n");
    help
}
