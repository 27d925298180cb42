use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing::warn;

use crate::constants;

/// Everything the completion client needs, gathered once at startup.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f64,
}

impl CompletionConfig {
    /// Builds the config from an optional key. A missing or blank key is
    /// replaced by a placeholder that never passes `has_valid_credential`.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        let api_key = match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => key,
            None => {
                warn!("GROQ_API_KEY not set. Requests will fail until a key is configured.");
                constants::PLACEHOLDER_API_KEY.to_string()
            }
        };

        Self {
            api_key,
            api_url: constants::GROQ_API_URL.to_string(),
            model: constants::MODEL_NAME.to_string(),
            temperature: constants::TEMPERATURE,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_valid_credential(&self) -> bool {
        self.api_key.starts_with(constants::API_KEY_PREFIX)
    }
}

// Hand-written so the key never ends up in a log line.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Where the web UI listens and where it finds its templates and assets.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), constants::DEFAULT_PORT),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_uses_placeholder() {
        let config = CompletionConfig::from_api_key(None);
        assert_eq!(config.api_key, constants::PLACEHOLDER_API_KEY);
        assert!(!config.has_valid_credential());
    }

    #[test]
    fn test_blank_key_uses_placeholder() {
        let config = CompletionConfig::from_api_key(Some("   ".to_string()));
        assert_eq!(config.api_key, constants::PLACEHOLDER_API_KEY);
    }

    #[test]
    fn test_key_is_kept_verbatim() {
        let config = CompletionConfig::from_api_key(Some("  gsk_abc\n".to_string()));
        assert_eq!(config.api_key, "  gsk_abc\n");
        assert!(!config.has_valid_credential());
    }

    #[test]
    fn test_key_prefix_check() {
        assert!(CompletionConfig::from_api_key(Some("gsk_abc".to_string())).has_valid_credential());
        assert!(!CompletionConfig::from_api_key(Some("sk-abc".to_string())).has_valid_credential());
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = CompletionConfig::from_api_key(Some("gsk_abc".to_string()))
            .with_api_url("http://localhost:9999/v1/chat/completions")
            .with_model("llama3-70b-8192");
        assert_eq!(config.api_url, "http://localhost:9999/v1/chat/completions");
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = CompletionConfig::from_api_key(Some("gsk_secret".to_string()));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
