//! Generic OpenAI-compatible chat-completions adapter, shared by
//! OpenRouter, Fireworks, Cerebras, Moonshot, and xAI — their Python clients
//! (`openrouter.py`, `fireworks_client.py`, `cerebras.py`, `moonshot_client.py`,
//! `xai_client.py`) are near-identical `httpx` POSTs against an
//! OpenAI-shaped `/chat/completions` endpoint, differing only in base URL,
//! model id mapping, and a couple of provider-specific quirks.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChatParams, Provider, http_client};
use crate::types::{ModelResponse, Usage};

/// Per-deployment knobs distinguishing one OpenAI-style provider from
/// another.
pub struct OpenAiStyleConfig {
    pub provider_name: &'static str,
    pub base_url: String,
    pub api_key: SecretString,
    /// Canonical model id -> native model id. Ids missing from the map fall
    /// through to `strip_prefix`.
    pub model_map: HashMap<String, String>,
    /// Prefix stripped from the canonical id when it isn't in `model_map`
    /// (e.g. xAI strips `x-ai/`, Moonshot strips `moonshot/`).
    pub strip_prefix: Option<&'static str>,
    pub extra_headers: Vec<(HeaderName, HeaderValue)>,
    pub default_max_tokens: u32,
    pub timeout: Duration,
    /// When `content` is empty, fall back to `reasoning_content` — needed
    /// for thinking models like Kimi K2.5 on Moonshot.
    pub fallback_to_reasoning_content: bool,
    /// Native model ids (substring match) that must be called with
    /// temperature pinned to 1.0 regardless of the caller's request.
    pub force_temperature_one_for: Vec<String>,
}

impl OpenAiStyleConfig {
    fn resolve_model_id(&self, canonical: &str) -> String {
        if let Some(native) = self.model_map.get(canonical) {
            return native.clone();
        }
        match self.strip_prefix {
            Some(prefix) => canonical.strip_prefix(prefix).unwrap_or(canonical).to_string(),
            None => canonical.to_string(),
        }
    }
}

pub struct OpenAiStyleProvider {
    client: Client,
    config: OpenAiStyleConfig,
}

impl OpenAiStyleProvider {
    pub fn new(config: OpenAiStyleConfig) -> Self {
        Self {
            client: http_client(),
            config,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[async_trait]
impl Provider for OpenAiStyleProvider {
    async fn chat_completion(&self, params: ChatParams) -> Option<ModelResponse> {
        let native_model = self.config.resolve_model_id(&params.model_id);

        let temperature = if self
            .config
            .force_temperature_one_for
            .iter()
            .any(|needle| native_model.contains(needle))
        {
            1.0
        } else {
            params.temperature
        };

        let messages: Vec<WireMessage> = params
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        let body = ChatRequest {
            model: &native_model,
            messages: &messages,
            max_tokens: if params.max_tokens == 0 {
                self.config.default_max_tokens
            } else {
                params.max_tokens
            },
            temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key.expose_secret())).ok()?,
        );
        for (name, value) in &self.config.extra_headers {
            headers.insert(name.clone(), value.clone());
        }

        let response = match self
            .client
            .post(&url)
            .headers(headers)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::warn!("{} request error for {}: {err}", self.config.provider_name, params.model_id);
                return None;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::warn!(
                "{} HTTP error for {}: {status} - {}",
                self.config.provider_name,
                params.model_id,
                &text[..text.len().min(200)]
            );
            return None;
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("{} malformed response for {}: {err}", self.config.provider_name, params.model_id);
                return None;
            }
        };

        let message = parsed.choices.into_iter().next()?.message;
        let content = if self.config.fallback_to_reasoning_content {
            message.content.filter(|c| !c.is_empty()).or(message.reasoning_content).unwrap_or_default()
        } else {
            message.content.unwrap_or_default()
        };

        Some(ModelResponse {
            content,
            usage: Usage {
                prompt_tokens: parsed.usage.prompt_tokens,
                completion_tokens: parsed.usage.completion_tokens,
                total_tokens: parsed.usage.total_tokens,
            },
            model: params.model_id,
            provider: self.config.provider_name.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        self.config.provider_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OpenAiStyleConfig {
        OpenAiStyleConfig {
            provider_name: "moonshot",
            base_url: "https://api.moonshot.ai/v1".to_string(),
            api_key: SecretString::from("key".to_string()),
            model_map: HashMap::from([("moonshot/kimi-k2.5".to_string(), "kimi-k2.5".to_string())]),
            strip_prefix: Some("moonshot/"),
            extra_headers: vec![],
            default_max_tokens: 32768,
            timeout: Duration::from_secs(900),
            fallback_to_reasoning_content: true,
            force_temperature_one_for: vec!["k2.5".to_string()],
        }
    }

    #[test]
    fn resolves_mapped_model_id() {
        let cfg = config();
        assert_eq!(cfg.resolve_model_id("moonshot/kimi-k2.5"), "kimi-k2.5");
    }

    #[test]
    fn strips_prefix_for_unmapped_ids() {
        let cfg = config();
        assert_eq!(cfg.resolve_model_id("moonshot/kimi-next"), "kimi-next");
    }
}
