//! Webhook delivery with HMAC signing and retry, ported from
//! `webhooks.py::send_webhook`.

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::provider::http_client;

const USER_AGENT: &str = "LLM-Council-Webhook/1.0";

pub struct WebhookDispatcher {
    client: reqwest::Client,
    retries: u32,
    timeout: Duration,
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self {
            client: http_client(),
            retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl WebhookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// POST `payload` to `url`, retrying with exponential backoff
    /// (`2^attempt` seconds) up to `retries` times. Returns whether delivery
    /// ultimately succeeded.
    pub async fn send(&self, url: &str, payload: &Value, secret: Option<&str>) -> bool {
        let body = match sorted_keys_json(payload) {
            Ok(body) => body,
            Err(err) => {
                log::error!("failed to serialize webhook payload: {err}");
                return false;
            }
        };

        for attempt in 0..self.retries {
            let mut request = self
                .client
                .post(url)
                .timeout(self.timeout)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .body(body.clone());

            if let Some(secret) = secret {
                request = request.header("X-Webhook-Signature", format!("sha256={}", sign(secret, &body)));
            }

            match request.send().await {
                Ok(response) if response.status().as_u16() < 300 => return true,
                Ok(response) => log::warn!("webhook attempt {} failed: HTTP {}", attempt + 1, response.status()),
                Err(err) if err.is_timeout() => log::warn!("webhook attempt {} timed out", attempt + 1),
                Err(err) => log::warn!("webhook attempt {} error: {err}", attempt + 1),
            }

            if attempt + 1 < self.retries {
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }

        false
    }
}

/// Signs with HMAC-SHA256 over the JSON body with sorted keys, matching
/// Python's `json.dumps(payload, sort_keys=True)` before signing.
fn sign(secret: &str, body: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Re-serializes a `serde_json::Value` with object keys sorted, since
/// `serde_json` preserves insertion order by default.
fn sorted_keys_json(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string(&sort_value(value.clone()))
}

fn sort_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            for key in keys {
                if let Some(v) = map.get(&key) {
                    sorted.insert(key, sort_value(v.clone()));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_nested_object_keys() {
        let value = json!({"b": 1, "a": {"z": 1, "y": 2}});
        let rendered = sorted_keys_json(&value).unwrap();
        assert_eq!(rendered, r#"{"a":{"y":2,"z":1},"b":1}"#);
    }

    #[test]
    fn signature_is_deterministic() {
        let sig1 = sign("secret", "{}");
        let sig2 = sign("secret", "{}");
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn signature_matches_known_hmac_sha256_reference() {
        let signature = sign("s3cret", r#"{"a":1,"b":2}"#);
        assert_eq!(signature, "3c3a50a5327d4ff99220ba594fc5a91164aee080a9bd5232d852100c083279d3");
    }
}
