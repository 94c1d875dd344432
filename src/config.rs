use crate::error::{RagError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the provided context to answer the question.";

/// API key wrapper that keeps secrets out of `Debug` output and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        let key: String = key.into();
        Self(key.trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionBackend {
    OpenAI,
    DeepSeek,
}

impl FromStr for CompletionBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(CompletionBackend::OpenAI),
            "deepseek" => Ok(CompletionBackend::DeepSeek),
            other => Err(RagError::config(format!(
                "unknown completion provider '{}' (expected openai or deepseek)",
                other
            ))),
        }
    }
}

impl fmt::Display for CompletionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionBackend::OpenAI => f.write_str("openai"),
            CompletionBackend::DeepSeek => f.write_str("deepseek"),
        }
    }
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_chunking", skip_on_field_errors = false))]
pub struct RagConfig {
    pub documents_dir: PathBuf,
    #[validate(length(min = 1))]
    pub extensions: Vec<String>,
    #[validate(range(min = 1))]
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    #[validate(range(min = 1))]
    pub top_k: usize,

    pub api_key: Option<ApiKey>,
    pub openai_api_base: Option<String>,
    #[validate(length(min = 1))]
    pub embedding_model: String,
    #[validate(range(min = 1))]
    pub embedding_batch_size: usize,

    pub completion_provider: CompletionBackend,
    #[validate(length(min = 1))]
    pub chat_model: String,
    pub deepseek_api_key: Option<ApiKey>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    pub system_prompt: String,

    pub max_retries: usize,
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

fn validate_chunking(config: &RagConfig) -> std::result::Result<(), ValidationError> {
    if config.chunk_overlap >= config.chunk_size {
        let mut err = ValidationError::new("chunk_overlap");
        err.message = Some(
            format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                config.chunk_overlap, config.chunk_size
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("data/documents"),
            extensions: vec!["txt".to_string()],
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            api_key: None,
            openai_api_base: None,
            embedding_model: "text-embedding-ada-002".to_string(),
            embedding_batch_size: 1,
            completion_provider: CompletionBackend::OpenAI,
            chat_model: default_chat_model(CompletionBackend::OpenAI).to_string(),
            deepseek_api_key: None,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_retries: 2,
            request_timeout_secs: 60,
        }
    }
}

fn default_chat_model(backend: CompletionBackend) -> &'static str {
    match backend {
        CompletionBackend::OpenAI => "gpt-4-turbo-preview",
        CompletionBackend::DeepSeek => "deepseek-chat",
    }
}

impl RagConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup, falling back to
    /// defaults for unset keys. Set but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let completion_provider = match get("RAG_COMPLETION_PROVIDER") {
            Some(p) => p.parse()?,
            None => defaults.completion_provider,
        };

        let chat_model_var = match completion_provider {
            CompletionBackend::OpenAI => "OPENAI_CHAT_MODEL",
            CompletionBackend::DeepSeek => "DEEPSEEK_MODEL",
        };

        let extensions = get("RAG_EXTENSIONS")
            .map(|e| {
                e.split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.extensions);

        Ok(Self {
            documents_dir: get("RAG_DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_dir),
            extensions,
            chunk_size: parse_var(&get, "RAG_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_var(&get, "RAG_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: parse_var(&get, "RAG_TOP_K", defaults.top_k)?,
            api_key: get("OPENAI_API_KEY").or_else(|| get("API_KEY")).map(ApiKey::new),
            openai_api_base: get("OPENAI_API_BASE"),
            embedding_model: get("OPENAI_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_batch_size: parse_var(
                &get,
                "RAG_EMBEDDING_BATCH_SIZE",
                defaults.embedding_batch_size,
            )?,
            completion_provider,
            chat_model: get(chat_model_var)
                .unwrap_or_else(|| default_chat_model(completion_provider).to_string()),
            deepseek_api_key: get("DEEPSEEK_API_KEY").map(ApiKey::new),
            temperature: parse_var(&get, "RAG_TEMPERATURE", defaults.temperature)?,
            system_prompt: get("RAG_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            max_retries: parse_var(&get, "RAG_MAX_RETRIES", defaults.max_retries)?,
            request_timeout_secs: parse_var(
                &get,
                "RAG_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    /// Switches the completion backend and resets the chat model to that
    /// backend's default.
    pub fn with_completion_provider(mut self, backend: CompletionBackend) -> Self {
        if self.completion_provider != backend {
            self.completion_provider = backend;
            self.chat_model = default_chat_model(backend).to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Runs field and cross-field validation, reporting every problem at once.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| RagError::Configuration(format_validation_errors(&errors)))
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| RagError::config(format!("invalid value '{}' for {}: {}", raw, key, e))),
        None => Ok(default),
    }
}

pub(crate) fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
