//! Static provider routing data: which canonical model ids go to which
//! provider, and how canonical ids map to each provider's native model ids.
//!
//! This table is data, not code (per spec §4.2): the [`Router`](../../council)
//! consults it through the classification helpers below rather than
//! hand-rolling per-provider string checks at each call site.

use std::collections::HashMap;

use secrecy::SecretString;

/// The concrete providers this deployment can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    Google,
    OpenRouter,
    Fireworks,
    Cerebras,
    Moonshot,
    Xai,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Google => "gemini",
            Self::OpenRouter => "openrouter",
            Self::Fireworks => "fireworks",
            Self::Cerebras => "cerebras",
            Self::Moonshot => "moonshot",
            Self::Xai => "xai",
        }
    }
}

/// Cerebras routes by plain membership, not by prefix — these are the exact
/// ids Cerebras serves directly (`backend/config.py::CEREBRAS_MODEL_IDS`).
pub const CEREBRAS_MODEL_IDS: &[&str] = &[
    "zai-glm-4.6",
    "zai-glm-4.7",
    "llama3.1-8b",
    "llama-3.3-70b",
    "qwen-3-32b",
    "gpt-oss-120b",
];

/// Canonical id → native id mapping for the Anthropic adapter
/// (`backend/anthropic_client.py::ANTHROPIC_MODEL_MAP`).
pub fn anthropic_model_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("anthropic/claude-opus-4.5", "claude-opus-4-20250514"),
        ("anthropic/claude-sonnet-4.5", "claude-sonnet-4-20250514"),
        ("anthropic/claude-3.5-sonnet", "claude-3-5-sonnet-20241022"),
        ("anthropic/claude-3.5-haiku", "claude-3-5-haiku-20241022"),
        ("claude-opus-4.5", "claude-opus-4-20250514"),
        ("claude-sonnet-4.5", "claude-sonnet-4-20250514"),
    ])
}

/// `backend/gemini_client.py::GEMINI_MODEL_MAP`.
pub fn gemini_model_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("google/gemini-3-flash", "gemini-2.0-flash"),
        ("google/gemini-3-flash-preview", "gemini-2.0-flash"),
        ("google/gemini-3-pro-preview", "gemini-2.0-flash"),
        ("google/gemini-3.1-pro-preview", "gemini-2.0-flash"),
        ("google/gemini-2.0-flash", "gemini-2.0-flash"),
    ])
}

/// `backend/moonshot_client.py::MOONSHOT_MODEL_MAP`.
pub fn moonshot_model_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([("moonshot/kimi-k2.5", "kimi-k2.5"), ("kimi-k2.5", "kimi-k2.5")])
}

/// `backend/xai_client.py::XAI_MODEL_MAP`.
pub fn xai_model_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("x-ai/grok-4", "grok-4"),
        ("x-ai/grok-4-fast", "grok-4-fast"),
        ("x-ai/grok-4.1-fast", "grok-4.1-fast"),
        ("grok-4", "grok-4"),
    ])
}

/// `backend/fireworks_client.py::FIREWORKS_MODEL_MAP`.
pub fn fireworks_model_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("fireworks/kimi-k2.5", "accounts/fireworks/models/kimi-k2p5"),
        ("fireworks/glm-5", "accounts/fireworks/models/glm-5"),
        (
            "accounts/fireworks/models/kimi-k2p5",
            "accounts/fireworks/models/kimi-k2p5",
        ),
        ("accounts/fireworks/models/glm-5", "accounts/fireworks/models/glm-5"),
    ])
}

/// Static canonical-id → fallback-canonical-id map consulted by the Router
/// when the primary adapter returns absence (spec §4.2). Grounded on
/// `fireworks_client.py`'s module docstring ("Fallback: OpenRouter").
pub fn fallback_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("fireworks/glm-5", "z-ai/glm-5"),
        ("fireworks/kimi-k2.5", "moonshotai/kimi-k2.5"),
    ])
}

/// Classify a canonical model id to its primary provider, by ordered
/// predicates exactly as `council.py` does (`is_cerebras_model`,
/// `is_anthropic_model`, then prefix checks, falling through to OpenRouter).
pub fn classify(model_id: &str) -> ProviderKind {
    if CEREBRAS_MODEL_IDS.contains(&model_id) {
        return ProviderKind::Cerebras;
    }

    if model_id.starts_with("anthropic/") || model_id.starts_with("claude-") || anthropic_model_map().contains_key(model_id)
    {
        return ProviderKind::Anthropic;
    }

    if model_id.starts_with("google/") || gemini_model_map().contains_key(model_id) {
        return ProviderKind::Google;
    }

    if model_id.starts_with("moonshot/") || moonshot_model_map().contains_key(model_id) {
        return ProviderKind::Moonshot;
    }

    if model_id.starts_with("x-ai/") || xai_model_map().contains_key(model_id) {
        return ProviderKind::Xai;
    }

    if model_id.starts_with("fireworks/") || fireworks_model_map().contains_key(model_id) {
        return ProviderKind::Fireworks;
    }

    ProviderKind::OpenRouter
}

/// Per-provider runtime configuration: API key plus base URL override.
#[derive(Debug, Clone, Default)]
pub struct ProviderSecrets {
    pub anthropic_api_key: Option<SecretString>,
    pub gemini_api_key: Option<SecretString>,
    pub openrouter_api_key: Option<SecretString>,
    pub fireworks_api_key: Option<SecretString>,
    pub cerebras_api_key: Option<SecretString>,
    pub moonshot_api_key: Option<SecretString>,
    pub grok_api_key: Option<SecretString>,
    /// Overrides the hardcoded base URL for one of the five OpenAI-style
    /// providers, keyed by [`ProviderKind`]. Empty in production; tests set
    /// one to point a provider at a local mock server.
    pub base_url_overrides: HashMap<ProviderKind, String>,
}

impl ProviderSecrets {
    pub fn key_for(&self, kind: ProviderKind) -> Option<&SecretString> {
        match kind {
            ProviderKind::Anthropic => self.anthropic_api_key.as_ref(),
            ProviderKind::Google => self.gemini_api_key.as_ref(),
            ProviderKind::OpenRouter => self.openrouter_api_key.as_ref(),
            ProviderKind::Fireworks => self.fireworks_api_key.as_ref(),
            ProviderKind::Cerebras => self.cerebras_api_key.as_ref(),
            ProviderKind::Moonshot => self.moonshot_api_key.as_ref(),
            ProviderKind::Xai => self.grok_api_key.as_ref(),
        }
    }

    pub fn base_url_for(&self, kind: ProviderKind) -> Option<String> {
        self.base_url_overrides.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cerebras_by_membership() {
        assert_eq!(classify("zai-glm-4.7"), ProviderKind::Cerebras);
    }

    #[test]
    fn classifies_anthropic_by_prefix_or_map() {
        assert_eq!(classify("anthropic/claude-opus-4.5"), ProviderKind::Anthropic);
        assert_eq!(classify("claude-opus-4.5"), ProviderKind::Anthropic);
    }

    #[test]
    fn falls_through_to_openrouter() {
        assert_eq!(classify("google/gemini-unlisted-variant"), ProviderKind::Google);
        assert_eq!(classify("meta-llama/llama-3-70b"), ProviderKind::OpenRouter);
    }
}
