//! Job listing, lookup, and cleanup — ported from `webhooks.py`'s
//! `list_jobs` / `get_job` / `cleanup_old_jobs`.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use council::{Error, types::JobStatus};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    status: Option<String>,
}

fn default_limit() -> usize {
    50
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<Value>, Error> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let jobs = state.jobs.list(query.limit, status);
    Ok(Json(json!({ "jobs": jobs })))
}

#[derive(Debug, Deserialize)]
pub struct GetQuery {
    #[serde(default)]
    include_result: bool,
}

pub async fn get(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<GetQuery>,
) -> Result<Json<Value>, Error> {
    let job = state.jobs.get(job_id).ok_or_else(|| Error::JobNotFound(job_id.to_string()))?;
    let mut body = serde_json::to_value(council::types::JobInfo::from(&job)).expect("JobInfo always serializes");

    if query.include_result {
        if let Value::Object(map) = &mut body {
            map.insert("result".to_string(), serde_json::to_value(&job.result).unwrap_or(Value::Null));
        }
    }

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    #[serde(default = "default_max_age_hours")]
    max_age_hours: i64,
}

fn default_max_age_hours() -> i64 {
    24
}

pub async fn cleanup(State(state): State<AppState>, Query(query): Query<CleanupQuery>) -> Json<Value> {
    let removed = state.jobs.cleanup_older_than(query.max_age_hours);
    Json(json!({ "removed": removed }))
}

fn parse_status(raw: &str) -> Result<JobStatus, Error> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        "webhook_sent" => Ok(JobStatus::WebhookSent),
        "webhook_failed" => Ok(JobStatus::WebhookFailed),
        other => Err(Error::InvalidRequest(format!("unknown job status '{other}'"))),
    }
}
