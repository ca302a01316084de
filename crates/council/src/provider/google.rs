//! Native Google Gemini `generateContent` adapter (`gemini_client.py`).

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChatParams, Provider, http_client};
use crate::types::{Message, ModelResponse, Usage};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model_map: HashMap<String, String>,
}

impl GoogleProvider {
    pub fn new(api_key: Option<SecretString>, model_map: HashMap<String, String>) -> Self {
        Self {
            client: http_client(),
            api_key,
            model_map,
        }
    }

    fn resolve_model_id(&self, canonical: &str) -> String {
        self.model_map
            .get(canonical)
            .cloned()
            .unwrap_or_else(|| canonical.strip_prefix("google/").unwrap_or(canonical).to_string())
    }
}

fn to_gemini_contents(messages: &[Message]) -> (Vec<GeminiContent>, Option<String>) {
    let mut contents = Vec::new();
    let mut system_text = None;

    for message in messages {
        match message.role.as_str() {
            "system" => {
                if system_text.is_none() {
                    system_text = Some(message.content.clone());
                }
            }
            "assistant" => contents.push(GeminiContent {
                role: "model".to_string(),
                parts: vec![GeminiPart { text: message.content.clone() }],
            }),
            _ => contents.push(GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: message.content.clone() }],
            }),
        }
    }

    (contents, system_text)
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: UsageMetadata,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartOut>,
}

#[derive(Deserialize)]
struct GeminiPartOut {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u64,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u64,
}

#[async_trait]
impl Provider for GoogleProvider {
    async fn chat_completion(&self, params: ChatParams) -> Option<ModelResponse> {
        let api_key = self.api_key.as_ref()?;
        let native_model = self.resolve_model_id(&params.model_id);
        let (contents, system_text) = to_gemini_contents(&params.messages);

        let body = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: params.max_tokens,
                temperature: params.temperature,
            },
            system_instruction: system_text.map(|text| GeminiContent {
                role: "system".to_string(),
                parts: vec![GeminiPart { text }],
            }),
        };

        let url = format!("{GEMINI_BASE}/models/{native_model}:generateContent");

        let response = match self
            .client
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .timeout(Duration::from_secs(900))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::warn!("gemini request error for {}: {err}", params.model_id);
                return None;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::warn!("gemini HTTP error for {}: {status} - {}", params.model_id, &text[..text.len().min(200)]);
            return None;
        }

        let parsed: GenerateContentResponse = response.json().await.ok()?;
        let candidate = parsed.candidates.into_iter().next();
        let Some(candidate) = candidate else {
            log::warn!("gemini {}: no candidates in response", params.model_id);
            return None;
        };

        let text: String = candidate.content.parts.iter().map(|p| p.text.as_str()).collect();

        Some(ModelResponse {
            content: text,
            usage: Usage {
                prompt_tokens: parsed.usage_metadata.prompt_token_count,
                completion_tokens: parsed.usage_metadata.candidates_token_count,
                total_tokens: parsed.usage_metadata.total_token_count,
            },
            model: params.model_id,
            provider: "gemini".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_roles_and_extracts_system() {
        let messages = vec![
            Message { role: "system".to_string(), content: "be terse".to_string() },
            Message { role: "user".to_string(), content: "hi".to_string() },
            Message { role: "assistant".to_string(), content: "hello".to_string() },
        ];
        let (contents, system) = to_gemini_contents(&messages);
        assert_eq!(system.as_deref(), Some("be terse"));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
    }

    #[test]
    fn resolve_model_id_strips_prefix_when_unmapped() {
        let provider = GoogleProvider::new(None, HashMap::new());
        assert_eq!(provider.resolve_model_id("google/gemini-unlisted"), "gemini-unlisted");
    }
}
