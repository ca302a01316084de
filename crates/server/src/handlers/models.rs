//! `GET /api/models` — provider model catalog, ported from
//! `model_discovery.py`'s discovery endpoint.

use axum::{Json, extract::{Query, State}};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    provider: Option<String>,
    #[serde(default)]
    refresh: bool,
}

pub async fn list_models(State(state): State<AppState>, Query(query): Query<ModelsQuery>) -> Json<Value> {
    let mut models = state.model_catalog.list_all(query.refresh).await;

    if let Some(provider) = &query.provider {
        models.retain(|model| model.get("provider").and_then(Value::as_str) == Some(provider.as_str()));
    }

    Json(json!({ "models": models }))
}
