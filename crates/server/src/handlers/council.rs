//! `POST /api/council` and `POST /api/council/async` — the synchronous and
//! webhook-backed entry points to the deliberation engine, ported from
//! `main.py`'s council routes and `opencode_integration.py::handle_council_command`.

use std::time::Instant;

use axum::{Json, extract::State};
use config::aliases::resolve_model_alias;
use council::{
    Error,
    engine::{self, DeliberationInputs},
    types::{Job, JobStatus},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{markdown, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CouncilRequest {
    query: String,
    #[serde(default)]
    final_only: bool,
    models: Option<Vec<String>>,
    chairman: Option<String>,
    #[serde(default = "default_true")]
    include_details: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CouncilAsyncRequest {
    #[serde(flatten)]
    base: CouncilRequest,
    webhook_url: url::Url,
    webhook_secret: Option<String>,
    metadata: Option<Value>,
}

#[derive(Serialize)]
struct AsyncAccepted {
    status: &'static str,
    job_id: Uuid,
    poll_url: String,
    webhook_url: String,
}

pub async fn run_sync(State(state): State<AppState>, Json(request): Json<CouncilRequest>) -> Result<Json<Value>, Error> {
    if request.query.trim().is_empty() {
        return Err(Error::InvalidRequest("query must not be empty".to_string()));
    }

    let models = resolve_models(&state, request.models);
    let chairman = resolve_chairman(&state, request.chairman);

    let started = Instant::now();
    let result = engine::run_full_council(
        &state.router,
        DeliberationInputs {
            user_query: &request.query,
            final_only: request.final_only,
            models: &models,
            chairman_model: &chairman,
        },
    )
    .await;
    let elapsed_seconds = started.elapsed().as_secs_f64();

    let rendered = markdown::render(&request.query, &result, request.include_details, elapsed_seconds);

    Ok(Json(json!({
        "markdown": rendered,
        "stage1": result.stage1,
        "stage2": result.stage2,
        "stage3": result.stage3,
        "metadata": {
            "aggregate_rankings": result.aggregate_rankings,
            "label_to_model": result.label_to_model,
            "final_only": result.final_only,
        },
        "timing": { "elapsed_seconds": (elapsed_seconds * 100.0).round() / 100.0 },
        "config": {
            "council_models": models,
            "chairman_model": chairman,
            "final_only": request.final_only,
        },
    })))
}

pub async fn run_async(
    State(state): State<AppState>,
    Json(request): Json<CouncilAsyncRequest>,
) -> Result<Json<AsyncAccepted>, Error> {
    if request.base.query.trim().is_empty() {
        return Err(Error::InvalidRequest("query must not be empty".to_string()));
    }
    if !matches!(request.webhook_url.scheme(), "http" | "https") {
        return Err(Error::InvalidRequest("webhook_url must be an http(s) URL".to_string()));
    }

    let models = request.base.models.map(|models| models.into_iter().map(|m| resolve_model_alias(&m)).collect());
    let chairman = request.base.chairman.map(|c| resolve_model_alias(&c));

    let job_id = Uuid::new_v4();
    let job = Job {
        job_id,
        status: JobStatus::Pending,
        query: request.base.query,
        webhook_url: request.webhook_url.to_string(),
        webhook_secret: request.webhook_secret,
        final_only: request.base.final_only,
        models,
        chairman,
        include_details: request.base.include_details,
        metadata: request.metadata,
        created_at: chrono::Utc::now(),
        started_at: None,
        completed_at: None,
        error: None,
        result_summary: None,
        result: None,
    };

    state.jobs.create(job);

    let runner = state.runner.clone();
    tokio::spawn(async move { runner.run(job_id).await });

    Ok(Json(AsyncAccepted {
        status: "accepted",
        job_id,
        poll_url: format!("/api/council/jobs/{job_id}"),
        webhook_url: request.webhook_url.to_string(),
    }))
}

fn resolve_models(state: &AppState, requested: Option<Vec<String>>) -> Vec<String> {
    requested
        .map(|models| models.into_iter().map(|m| resolve_model_alias(&m)).collect())
        .unwrap_or_else(|| state.council_models.clone())
}

fn resolve_chairman(state: &AppState, requested: Option<String>) -> String {
    requested.map(|c| resolve_model_alias(&c)).unwrap_or_else(|| state.chairman_model.clone())
}
