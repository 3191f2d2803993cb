//! Provider selection: builds the configured LLM provider.
//!
//! Every supported backend speaks the OpenAI wire format, so selection is a
//! matter of picking the base URL and credential.

use std::sync::Arc;
use std::time::Duration;

use crate::openai_compat::OpenAiCompatProvider;
use stellar_config::{AppConfig, ConfigError};
use stellar_core::provider::Provider;

/// Build the chat provider named by `config.provider`.
///
/// A missing API key is the fatal configuration error; local backends
/// (`ollama`, `vllm`, `llamacpp`) run without one.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let name = config.provider.as_str();
    let overrides = config.providers.get(name);

    let override_key = overrides
        .and_then(|p| p.api_key.as_deref())
        .filter(|key| !key.trim().is_empty());

    let api_key = match override_key.map_or_else(|| config.require_api_key(), Ok) {
        Ok(key) => key.to_string(),
        Err(_) if is_local(name) => name.to_string(),
        Err(e) => return Err(e),
    };

    let base_url = match overrides.and_then(|p| p.api_url.clone()).or_else(|| default_base_url(name)) {
        Some(url) => url,
        None => {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{name}': set providers.{name}.api_url"
            )));
        }
    };

    // Transport timeout sits above the generator's own bound so the
    // generator reports the timeout.
    let transport_timeout = Duration::from_secs(config.request_timeout_secs.saturating_add(5));

    Ok(Arc::new(
        OpenAiCompatProvider::new(name, base_url, api_key).with_timeout(transport_timeout),
    ))
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "groq" => "https://api.groq.com/openai/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_config::ProviderConfig;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("groq").unwrap().contains("api.groq.com"));
        assert!(default_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(default_base_url("ollama").unwrap().contains("localhost:11434"));
        assert!(default_base_url("mystery").is_none());
    }

    #[test]
    fn build_requires_api_key() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }

    #[test]
    fn blank_api_key_is_missing() {
        let mut config = AppConfig {
            api_key: Some("".into()),
            ..AppConfig::default()
        };
        assert!(matches!(
            build_from_config(&config),
            Err(ConfigError::MissingApiKey(_))
        ));

        config.providers.insert(
            "groq".into(),
            ProviderConfig {
                api_url: None,
                api_key: Some("  ".into()),
            },
        );
        assert!(matches!(
            build_from_config(&config),
            Err(ConfigError::MissingApiKey(_))
        ));
    }

    #[test]
    fn provider_override_key_wins() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "groq".into(),
            ProviderConfig {
                api_url: None,
                api_key: Some("gsk_override".into()),
            },
        );
        assert_eq!(build_from_config(&config).unwrap().name(), "groq");
    }

    #[test]
    fn build_from_configured_key() {
        let config = AppConfig {
            api_key: Some("gsk_test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn local_backend_needs_no_key() {
        let config = AppConfig {
            provider: "ollama".into(),
            ..AppConfig::default()
        };
        assert_eq!(build_from_config(&config).unwrap().name(), "ollama");
    }

    #[test]
    fn unknown_provider_needs_url() {
        let mut config = AppConfig {
            provider: "acme".into(),
            api_key: Some("k".into()),
            ..AppConfig::default()
        };
        assert!(matches!(
            build_from_config(&config),
            Err(ConfigError::ValidationError(_))
        ));

        config.providers.insert(
            "acme".into(),
            ProviderConfig {
                api_url: Some("https://llm.acme.test/v1".into()),
                api_key: None,
            },
        );
        assert_eq!(build_from_config(&config).unwrap().name(), "acme");
    }
}
