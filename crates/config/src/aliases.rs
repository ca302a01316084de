//! Friendly-name aliases accepted wherever a canonical model id is expected
//! (`backend/config.py::MODEL_ALIASES` / `resolve_model_alias`).

use std::collections::HashMap;

/// Alias → canonical model id. Lookup is case-insensitive; the keys here are
/// already lowercase.
pub fn model_aliases() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("opus", "anthropic/claude-opus-4.5"),
        ("sonnet", "anthropic/claude-sonnet-4.5"),
        ("haiku", "anthropic/claude-3.5-haiku"),
        ("gemini", "google/gemini-3-flash"),
        ("flash", "google/gemini-3-flash"),
        ("grok", "x-ai/grok-4"),
        ("glm", "zai-glm-4.7"),
        ("kimi", "moonshot/kimi-k2.5"),
    ])
}

/// Resolve an alias (case-insensitive) to its canonical id, or return the
/// input unchanged if it isn't a known alias — callers pass the result
/// straight to [`crate::provider::classify`].
pub fn resolve_model_alias(input: &str) -> String {
    let lower = input.to_lowercase();
    model_aliases()
        .get(lower.as_str())
        .map(|canonical| canonical.to_string())
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_alias_case_insensitively() {
        assert_eq!(resolve_model_alias("OPUS"), "anthropic/claude-opus-4.5");
        assert_eq!(resolve_model_alias("Grok"), "x-ai/grok-4");
    }

    #[test]
    fn passes_through_unknown_ids() {
        assert_eq!(resolve_model_alias("meta-llama/llama-3-70b"), "meta-llama/llama-3-70b");
    }
}
