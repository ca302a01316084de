//! Native Anthropic Messages API adapter with OAuth-then-API-key fallback.
//!
//! Grounded on `anthropic_client.py`: an OAuth access token found in a
//! local OpenCode auth file is tried first (refreshed opportunistically
//! inside a 60 second expiry window), falling back to `ANTHROPIC_API_KEY`
//! when no OAuth session is present or the OAuth call itself fails.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use super::{ChatParams, Provider, http_client};
use crate::types::{ModelResponse, Usage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const ANTHROPIC_CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";
const ANTHROPIC_TOKEN_URL: &str = "https://console.anthropic.com/v1/oauth/token";

const CLAUDE_CODE_SYSTEM_PREFIX: &str = "You are Claude Code, Anthropic's official CLI for Claude.";
const CLAUDE_CODE_BETA_FLAGS: &str = "oauth-2025-04-20,claude-code-20250219,interleaved-thinking-2025-05-14,fine-grained-tool-streaming-2025-05-14";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model_map: HashMap<String, String>,
    auth_paths: Vec<PathBuf>,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<SecretString>, model_map: HashMap<String, String>) -> Self {
        let auth_paths = std::env::var_os("HOME")
            .map(|home| {
                let home = PathBuf::from(home);
                vec![
                    home.join(".local/share/opencode/auth.json"),
                    home.join(".opencode/data/auth.json"),
                    home.join(".config/opencode/auth.json"),
                ]
            })
            .unwrap_or_default();

        Self {
            client: http_client(),
            api_key,
            model_map,
            auth_paths,
        }
    }

    fn resolve_model_id(&self, canonical: &str) -> String {
        self.model_map.get(canonical).cloned().unwrap_or_else(|| canonical.to_string())
    }

    async fn call_oauth(&self, native_model: &str, prompt: &str, max_tokens: u32) -> Option<AnthropicCallResult> {
        let token = self.valid_oauth_token().await?;

        let payload = json!({
            "model": native_model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
            "system": CLAUDE_CODE_SYSTEM_PREFIX,
        });

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("authorization", format!("Bearer {token}"))
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("anthropic-beta", CLAUDE_CODE_BETA_FLAGS)
            .timeout(Duration::from_secs(120))
            .json(&payload)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            log::warn!("anthropic oauth call failed: HTTP {}", response.status());
            return None;
        }

        let body: MessagesResponse = response.json().await.ok()?;
        Some(AnthropicCallResult { body, provider: "anthropic-oauth" })
    }

    async fn call_api_key(&self, native_model: &str, prompt: &str, max_tokens: u32) -> Option<AnthropicCallResult> {
        let api_key = self.api_key.as_ref()?;

        let payload = json!({
            "model": native_model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .timeout(Duration::from_secs(120))
            .json(&payload)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::warn!("anthropic api-key call failed: HTTP {status} - {}", &text[..text.len().min(200)]);
            return None;
        }

        let body: MessagesResponse = response.json().await.ok()?;
        Some(AnthropicCallResult { body, provider: "anthropic" })
    }

    async fn valid_oauth_token(&self) -> Option<String> {
        let (auth_path, creds) = self.load_oauth_credentials()?;

        let now_ms = now_millis();
        if !creds.access.is_empty() && creds.expires > now_ms + 60_000 {
            return Some(creds.access);
        }

        let refresh = creds.refresh.clone();
        if refresh.is_empty() {
            return None;
        }

        log::info!("anthropic oauth token expired, refreshing");
        let refreshed = self.refresh_oauth_token(&refresh).await?;
        self.save_oauth_credentials(&auth_path, &refreshed);
        Some(refreshed.access)
    }

    fn load_oauth_credentials(&self) -> Option<(PathBuf, OAuthCreds)> {
        for path in &self.auth_paths {
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            let Ok(data) = serde_json::from_str::<serde_json::Value>(&content) else {
                continue;
            };
            let anthropic = data.get("anthropic")?;
            if anthropic.get("type").and_then(|t| t.as_str()) != Some("oauth") {
                continue;
            }
            let creds = OAuthCreds {
                access: anthropic.get("access").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                refresh: anthropic.get("refresh").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                expires: anthropic.get("expires").and_then(|v| v.as_i64()).unwrap_or(0),
            };
            return Some((path.clone(), creds));
        }
        None
    }

    fn save_oauth_credentials(&self, auth_path: &PathBuf, creds: &OAuthCreds) {
        let Ok(content) = std::fs::read_to_string(auth_path) else {
            return;
        };
        let Ok(mut data) = serde_json::from_str::<serde_json::Value>(&content) else {
            return;
        };
        data["anthropic"] = json!({
            "type": "oauth",
            "access": creds.access,
            "refresh": creds.refresh,
            "expires": creds.expires,
        });
        if let Ok(rendered) = serde_json::to_string_pretty(&data) {
            if let Err(err) = std::fs::write(auth_path, rendered) {
                log::warn!("could not persist refreshed oauth credentials: {err}");
            }
        }
    }

    async fn refresh_oauth_token(&self, refresh_token: &str) -> Option<OAuthCreds> {
        let response = self
            .client
            .post(ANTHROPIC_TOKEN_URL)
            .timeout(Duration::from_secs(30))
            .json(&json!({
                "grant_type": "refresh_token",
                "refresh_token": refresh_token,
                "client_id": ANTHROPIC_CLIENT_ID,
            }))
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            log::warn!("anthropic oauth token refresh failed: HTTP {}", response.status());
            return None;
        }

        let data: serde_json::Value = response.json().await.ok()?;
        let expires_in = data.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600);
        Some(OAuthCreds {
            access: data.get("access_token").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            refresh: data.get("refresh_token").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            expires: now_millis() + expires_in * 1000,
        })
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

struct OAuthCreds {
    access: String,
    refresh: String,
    expires: i64,
}

struct AnthropicCallResult {
    body: MessagesResponse,
    provider: &'static str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: MessagesUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn chat_completion(&self, params: ChatParams) -> Option<ModelResponse> {
        let native_model = self.resolve_model_id(&params.model_id);
        let prompt = params.messages.last().map(|m| m.content.as_str()).unwrap_or("");

        let result = match self.call_oauth(&native_model, prompt, params.max_tokens).await {
            Some(result) => result,
            None => self.call_api_key(&native_model, prompt, params.max_tokens).await?,
        };

        let text: String = result
            .body
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text.as_str())
            .collect();

        Some(ModelResponse {
            content: text,
            usage: Usage {
                prompt_tokens: result.body.usage.input_tokens,
                completion_tokens: result.body.usage.output_tokens,
                total_tokens: result.body.usage.input_tokens + result.body.usage.output_tokens,
            },
            model: params.model_id,
            provider: result.provider.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_model_id_falls_back_to_input() {
        let provider = AnthropicProvider::new(None, HashMap::new());
        assert_eq!(provider.resolve_model_id("claude-opus-4.5"), "claude-opus-4.5");
    }

    #[test]
    fn resolve_model_id_uses_map() {
        let map = HashMap::from([("anthropic/claude-opus-4.5".to_string(), "claude-opus-4-20250514".to_string())]);
        let provider = AnthropicProvider::new(None, map);
        assert_eq!(provider.resolve_model_id("anthropic/claude-opus-4.5"), "claude-opus-4-20250514");
    }
}
