mod anthropic;
mod google;
mod http_client;
mod openai_style;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use http_client::http_client;
pub use openai_style::OpenAiStyleProvider;

use async_trait::async_trait;

use crate::types::{Message, ModelResponse};

/// Parameters common to every provider call. Mirrors the keyword arguments
/// threaded through `query_single_model` / `query_model` on the Python side.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatParams {
    pub fn new(model_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Uniform entry point every concrete adapter implements. A provider never
/// propagates a transport error to the caller: failures are logged and
/// folded into `None`, so a single bad provider can't cancel the rest of a
/// fan-out (spec §5).
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat_completion(&self, params: ChatParams) -> Option<ModelResponse>;

    fn name(&self) -> &'static str;
}

/// Builds the [`OpenAiStyleConfig`] for one of the five providers that
/// share the generic adapter, reproducing the base URL, model map, and
/// quirks of the corresponding Python client. `base_url_override` lets a
/// deployment point a provider at a different endpoint (tests point it at
/// a local mock server) without touching the defaults below.
pub fn openai_style_config_for(
    kind: config::provider::ProviderKind,
    api_key: secrecy::SecretString,
    base_url_override: Option<String>,
) -> openai_style::OpenAiStyleConfig {
    use config::provider::ProviderKind::*;
    use openai_style::OpenAiStyleConfig;
    use std::time::Duration;

    let mut config = match kind {
        OpenRouter => OpenAiStyleConfig {
            provider_name: "openrouter",
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key,
            model_map: Default::default(),
            strip_prefix: None,
            extra_headers: vec![
                (
                    reqwest::header::HeaderName::from_static("http-referer"),
                    reqwest::header::HeaderValue::from_static("http://localhost:8800"),
                ),
                (
                    reqwest::header::HeaderName::from_static("x-title"),
                    reqwest::header::HeaderValue::from_static("LLM Council"),
                ),
            ],
            default_max_tokens: 4096,
            timeout: Duration::from_secs(120),
            fallback_to_reasoning_content: false,
            force_temperature_one_for: vec![],
        },
        Fireworks => OpenAiStyleConfig {
            provider_name: "fireworks",
            base_url: "https://api.fireworks.ai/inference/v1".to_string(),
            api_key,
            model_map: config::provider::fireworks_model_map()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            strip_prefix: None,
            extra_headers: vec![],
            default_max_tokens: 32768,
            timeout: Duration::from_secs(900),
            fallback_to_reasoning_content: false,
            force_temperature_one_for: vec![],
        },
        Cerebras => OpenAiStyleConfig {
            provider_name: "cerebras",
            base_url: "https://api.cerebras.ai/v1".to_string(),
            api_key,
            model_map: Default::default(),
            strip_prefix: None,
            extra_headers: vec![],
            default_max_tokens: 4096,
            timeout: Duration::from_secs(120),
            fallback_to_reasoning_content: false,
            force_temperature_one_for: vec![],
        },
        Moonshot => OpenAiStyleConfig {
            provider_name: "moonshot",
            base_url: "https://api.moonshot.ai/v1".to_string(),
            api_key,
            model_map: config::provider::moonshot_model_map()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            strip_prefix: Some("moonshot/"),
            extra_headers: vec![],
            default_max_tokens: 32768,
            timeout: Duration::from_secs(900),
            fallback_to_reasoning_content: true,
            force_temperature_one_for: vec!["k2.5".to_string()],
        },
        Xai => OpenAiStyleConfig {
            provider_name: "xai",
            base_url: "https://api.x.ai/v1".to_string(),
            api_key,
            model_map: config::provider::xai_model_map()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            strip_prefix: Some("x-ai/"),
            extra_headers: vec![],
            default_max_tokens: 32768,
            timeout: Duration::from_secs(900),
            fallback_to_reasoning_content: false,
            force_temperature_one_for: vec![],
        },
        Anthropic | Google => unreachable!("anthropic and google use native adapters, not the openai-style one"),
    };

    if let Some(base_url) = base_url_override {
        config.base_url = base_url;
    }

    config
}
