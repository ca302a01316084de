//! Liveness and configuration-echo endpoints, always public
//! (`main.py`'s bare `/` route plus the allow-list in spec §6).

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "llm-council",
        "status": "ok",
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "council_models": state.council_models,
        "chairman_model": state.chairman_model,
        "auth_enabled": state.api_key.is_some(),
    }))
}
