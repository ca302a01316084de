//! Model discovery with a TTL cache, backing `GET /api/models`. Ported
//! from `model_discovery.py::ModelDiscovery`, trimmed to the two providers
//! that expose a public model-listing endpoint (OpenRouter, Cerebras) —
//! the rest of the panel is reached only through fixed model maps.

use std::{
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::provider::http_client;

const CACHE_TTL: Duration = Duration::from_secs(86_400);

struct CacheEntry {
    fetched_at: Instant,
    models: Vec<Value>,
}

pub struct ModelCatalog {
    client: reqwest::Client,
    openrouter_key: Option<SecretString>,
    cerebras_key: Option<SecretString>,
    openrouter_cache: Mutex<Option<CacheEntry>>,
    cerebras_cache: Mutex<Option<CacheEntry>>,
    #[allow(dead_code)]
    cache_dir: PathBuf,
}

impl ModelCatalog {
    pub fn new(cache_dir: PathBuf, openrouter_key: Option<SecretString>, cerebras_key: Option<SecretString>) -> Self {
        Self {
            client: http_client(),
            openrouter_key,
            cerebras_key,
            openrouter_cache: Mutex::new(None),
            cerebras_cache: Mutex::new(None),
            cache_dir,
        }
    }

    pub async fn list_all(&self, force_refresh: bool) -> Vec<Value> {
        let mut models = self.fetch_openrouter(force_refresh).await;
        models.extend(self.fetch_cerebras(force_refresh).await);
        models
    }

    async fn fetch_openrouter(&self, force_refresh: bool) -> Vec<Value> {
        if !force_refresh {
            if let Some(cached) = cached_if_fresh(&self.openrouter_cache) {
                return cached;
            }
        }

        let Some(key) = &self.openrouter_key else {
            return Vec::new();
        };

        let result = self
            .client
            .get("https://openrouter.ai/api/v1/models")
            .bearer_auth(key.expose_secret())
            .timeout(Duration::from_secs(30))
            .send()
            .await;

        let models = match result {
            Ok(response) if response.status().is_success() => extract_models(response, "openrouter").await,
            Ok(response) => {
                log::warn!("openrouter model listing failed: HTTP {}", response.status());
                Vec::new()
            }
            Err(err) => {
                log::warn!("openrouter model listing error: {err}");
                Vec::new()
            }
        };

        store_cache(&self.openrouter_cache, models.clone());
        models
    }

    async fn fetch_cerebras(&self, force_refresh: bool) -> Vec<Value> {
        if !force_refresh {
            if let Some(cached) = cached_if_fresh(&self.cerebras_cache) {
                return cached;
            }
        }

        let Some(key) = &self.cerebras_key else {
            return Vec::new();
        };

        let result = self
            .client
            .get("https://api.cerebras.ai/v1/models")
            .bearer_auth(key.expose_secret())
            .timeout(Duration::from_secs(30))
            .send()
            .await;

        let models = match result {
            Ok(response) if response.status().is_success() => extract_models(response, "cerebras").await,
            Ok(response) => {
                log::warn!("cerebras model listing failed: HTTP {}", response.status());
                Vec::new()
            }
            Err(err) => {
                log::warn!("cerebras model listing error: {err}");
                Vec::new()
            }
        };

        store_cache(&self.cerebras_cache, models.clone());
        models
    }
}

async fn extract_models(response: reqwest::Response, provider: &str) -> Vec<Value> {
    let Ok(body) = response.json::<Value>().await else {
        return Vec::new();
    };

    let Some(Value::Array(models)) = body.get("data").cloned() else {
        return Vec::new();
    };

    models
        .into_iter()
        .map(|mut model| {
            if let Value::Object(map) = &mut model {
                map.insert("provider".to_string(), Value::String(provider.to_string()));
            }
            model
        })
        .collect()
}

fn cached_if_fresh(cache: &Mutex<Option<CacheEntry>>) -> Option<Vec<Value>> {
    let guard = cache.lock().unwrap();
    let entry = guard.as_ref()?;
    if entry.fetched_at.elapsed() < CACHE_TTL {
        Some(entry.models.clone())
    } else {
        None
    }
}

fn store_cache(cache: &Mutex<Option<CacheEntry>>, models: Vec<Value>) {
    *cache.lock().unwrap() = Some(CacheEntry { fetched_at: Instant::now(), models });
}
