//! Configuration assembly for the deliberation engine.
//!
//! Mirrors `backend/config.py`'s role: a single entry point
//! ([`Config::load`]) that reads environment variables (falling back to the
//! user's `~/.bash_secrets` convenience file for API keys), and hands back a
//! fully-resolved, immutable configuration value consumed by the rest of the
//! workspace.

pub mod aliases;
pub mod provider;
pub mod secrets;
pub mod server;

use std::path::PathBuf;

use provider::ProviderSecrets;
use server::ServerConfig;

/// Default council panel, in the order responses are displayed
/// (`backend/config.py::DEFAULT_COUNCIL_MODELS`).
pub const DEFAULT_COUNCIL_MODELS: &[&str] = &[
    "anthropic/claude-opus-4.5",
    "google/gemini-3-flash",
    "x-ai/grok-4",
    "zai-glm-4.7",
    "moonshot/kimi-k2.5",
];

/// Default chairman model, synthesizing the final answer
/// (`backend/config.py::DEFAULT_CHAIRMAN_MODEL`).
pub const DEFAULT_CHAIRMAN_MODEL: &str = "anthropic/claude-opus-4.5";

#[derive(Debug, Clone)]
pub struct Config {
    pub providers: ProviderSecrets,
    pub server: ServerConfig,
    pub council_models: Vec<String>,
    pub chairman_model: String,
    /// Where the Anthropic OAuth token cache and similar local state live.
    pub cache_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from the process environment, falling back to
    /// the secrets file for any provider key not already set.
    pub fn load() -> Self {
        let file_secrets = secrets::default_path()
            .map(|path| secrets::load(&path))
            .unwrap_or_default();

        let resolve = |key: &str| secrets::resolve(key, &file_secrets);

        let providers = ProviderSecrets {
            anthropic_api_key: resolve("ANTHROPIC_API_KEY").map(Into::into),
            gemini_api_key: resolve("GEMINI_API_KEY")
                .or_else(|| resolve("GOOGLE_AI_API_KEY"))
                .map(Into::into),
            openrouter_api_key: resolve("OPENROUTER_API_KEY").map(Into::into),
            fireworks_api_key: resolve("FIREWORKS_API_KEY").map(Into::into),
            cerebras_api_key: resolve("CEREBRAS_API_KEY").map(Into::into),
            moonshot_api_key: resolve("MOONSHOT_API_KEY").map(Into::into),
            grok_api_key: resolve("GROK_API_KEY").map(Into::into),
            base_url_overrides: [
                (provider::ProviderKind::OpenRouter, "COUNCIL_OPENROUTER_BASE_URL"),
                (provider::ProviderKind::Fireworks, "COUNCIL_FIREWORKS_BASE_URL"),
                (provider::ProviderKind::Cerebras, "COUNCIL_CEREBRAS_BASE_URL"),
                (provider::ProviderKind::Moonshot, "COUNCIL_MOONSHOT_BASE_URL"),
                (provider::ProviderKind::Xai, "COUNCIL_XAI_BASE_URL"),
            ]
            .into_iter()
            .filter_map(|(kind, var)| std::env::var(var).ok().map(|url| (kind, url)))
            .collect(),
        };

        let council_models = std::env::var("COUNCIL_MODELS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(aliases::resolve_model_alias)
                    .collect::<Vec<_>>()
            })
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNCIL_MODELS.iter().map(|s| s.to_string()).collect());

        let chairman_model = std::env::var("COUNCIL_CHAIRMAN_MODEL")
            .ok()
            .map(|raw| aliases::resolve_model_alias(raw.trim()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAIRMAN_MODEL.to_string());

        let cache_dir = std::env::var_os("COUNCIL_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache/llm-council")))
            .unwrap_or_else(|| PathBuf::from(".llm-council-cache"));

        let server = ServerConfig::from_env(resolve("COUNCIL_API_KEY"));

        Self {
            providers,
            server,
            council_models,
            chairman_model,
            cache_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_nonempty() {
        assert!(!DEFAULT_COUNCIL_MODELS.is_empty());
        assert!(!DEFAULT_CHAIRMAN_MODEL.is_empty());
    }
}
