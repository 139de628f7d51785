//! Application configuration from environment variables

/// OpenAI settings. Constructed once in main and passed down; handlers
/// never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key means plan generation and /ask are unavailable.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "gpt-5-mini".to_string()),
        }
    }

    /// A config without credentials (offline tests and CLI dry runs).
    pub fn without_key() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-5-mini".to_string(),
        }
    }
}
