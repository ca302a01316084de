//! Endpoint and alias catalog for MCP/tool discovery, ported from
//! `opencode_integration.py`'s `MCP_TOOL_SCHEMA` and `MODEL_ALIASES_HELP`.

use axum::Json;
use config::aliases::model_aliases;
use serde_json::{Value, json};

pub async fn info() -> Json<Value> {
    let aliases: Value = model_aliases()
        .into_iter()
        .map(|(alias, canonical)| (alias.to_string(), Value::String(canonical.to_string())))
        .collect();

    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {"method": "GET", "path": "/", "description": "liveness"},
            {"method": "GET", "path": "/health", "description": "liveness and configuration echo"},
            {"method": "GET", "path": "/api/info", "description": "this endpoint"},
            {"method": "GET", "path": "/api/models", "description": "provider model catalog"},
            {"method": "POST", "path": "/api/council", "description": "run a synchronous deliberation"},
            {"method": "POST", "path": "/api/council/async", "description": "run an async deliberation with a webhook callback"},
            {"method": "GET", "path": "/api/council/jobs", "description": "list async jobs"},
            {"method": "GET", "path": "/api/council/jobs/{id}", "description": "get one async job"},
            {"method": "DELETE", "path": "/api/council/jobs/cleanup", "description": "remove stale jobs"},
            {"method": "POST", "path": "/api/conversations/{id}/message/stream", "description": "stage-streamed deliberation (SSE)"},
        ],
        "aliases": aliases,
    }))
}
