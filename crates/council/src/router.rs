//! Resolves a canonical model id to a concrete [`Provider`] and drives the
//! single-retry-through-fallback behaviour described for Fireworks
//! (`fireworks_client.py`'s module docstring: "Fallback: OpenRouter").

use std::{collections::HashMap, sync::Arc};

use config::{
    Config,
    provider::{self, ProviderKind},
};

use crate::{
    provider::{AnthropicProvider, ChatParams, GoogleProvider, OpenAiStyleProvider, Provider},
    types::ModelResponse,
};

pub struct Router {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
    fallback_map: HashMap<String, String>,
}

impl Router {
    pub fn new(config: &Config) -> Self {
        let mut providers: HashMap<ProviderKind, Arc<dyn Provider>> = HashMap::new();

        // Anthropic is always registered: `AnthropicProvider` falls back to
        // OAuth credentials on disk even with no `ANTHROPIC_API_KEY` set.
        providers.insert(
            ProviderKind::Anthropic,
            Arc::new(AnthropicProvider::new(
                config.providers.anthropic_api_key.clone(),
                provider::anthropic_model_map().into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            )),
        );

        if let Some(key) = &config.providers.gemini_api_key {
            providers.insert(
                ProviderKind::Google,
                Arc::new(GoogleProvider::new(
                    Some(key.clone()),
                    provider::gemini_model_map().into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                )),
            );
        }

        if let Some(key) = &config.providers.openrouter_api_key {
            providers.insert(
                ProviderKind::OpenRouter,
                Arc::new(OpenAiStyleProvider::new(crate::provider::openai_style_config_for(
                    ProviderKind::OpenRouter,
                    key.clone(),
                    config.providers.base_url_for(ProviderKind::OpenRouter),
                ))),
            );
        }

        if let Some(key) = &config.providers.fireworks_api_key {
            providers.insert(
                ProviderKind::Fireworks,
                Arc::new(OpenAiStyleProvider::new(crate::provider::openai_style_config_for(
                    ProviderKind::Fireworks,
                    key.clone(),
                    config.providers.base_url_for(ProviderKind::Fireworks),
                ))),
            );
        }

        if let Some(key) = &config.providers.cerebras_api_key {
            providers.insert(
                ProviderKind::Cerebras,
                Arc::new(OpenAiStyleProvider::new(crate::provider::openai_style_config_for(
                    ProviderKind::Cerebras,
                    key.clone(),
                    config.providers.base_url_for(ProviderKind::Cerebras),
                ))),
            );
        }

        if let Some(key) = &config.providers.moonshot_api_key {
            providers.insert(
                ProviderKind::Moonshot,
                Arc::new(OpenAiStyleProvider::new(crate::provider::openai_style_config_for(
                    ProviderKind::Moonshot,
                    key.clone(),
                    config.providers.base_url_for(ProviderKind::Moonshot),
                ))),
            );
        }

        if let Some(key) = &config.providers.grok_api_key {
            providers.insert(
                ProviderKind::Xai,
                Arc::new(OpenAiStyleProvider::new(crate::provider::openai_style_config_for(
                    ProviderKind::Xai,
                    key.clone(),
                    config.providers.base_url_for(ProviderKind::Xai),
                ))),
            );
        }

        let fallback_map = provider::fallback_map()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self { providers, fallback_map }
    }

    /// Route a single call: classify, dispatch, and on absence try the
    /// static fallback id once through its own classification.
    pub async fn call(&self, params: ChatParams) -> Option<ModelResponse> {
        let kind = provider::classify(&params.model_id);

        if let Some(provider) = self.providers.get(&kind) {
            if let Some(response) = provider.chat_completion(params.clone()).await {
                return Some(response);
            }
        } else {
            log::warn!("no provider configured for '{}' (classified as {:?})", params.model_id, kind);
        }

        let Some(fallback_id) = self.fallback_map.get(&params.model_id) else {
            return None;
        };

        log::info!("falling back from '{}' to '{fallback_id}'", params.model_id);
        let fallback_kind = provider::classify(fallback_id);
        let provider = self.providers.get(&fallback_kind)?;
        let mut fallback_params = params;
        fallback_params.model_id = fallback_id.clone();
        provider.chat_completion(fallback_params).await
    }
}
