//! Advances an async job through pending -> running -> completed/failed ->
//! webhook_sent/webhook_failed, mirroring `webhooks.py::run_council_async`.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    engine::{self, DeliberationInputs},
    job::JobStore,
    router::Router,
    types::JobStatus,
    webhook::WebhookDispatcher,
};

/// The council panel/chairman to fall back to when a job didn't request an
/// override — the same defaults `Config` resolves at startup.
#[derive(Clone)]
pub struct CouncilDefaults {
    pub council_models: Vec<String>,
    pub chairman_model: String,
}

pub struct AsyncRunner {
    router: Arc<Router>,
    jobs: JobStore,
    webhooks: Arc<WebhookDispatcher>,
    defaults: CouncilDefaults,
}

impl AsyncRunner {
    pub fn new(router: Arc<Router>, jobs: JobStore, webhooks: Arc<WebhookDispatcher>, defaults: CouncilDefaults) -> Self {
        Self { router, jobs, webhooks, defaults }
    }

    /// Runs one job to completion and delivers its webhook. Meant to be
    /// spawned as a detached task right after the job is created.
    pub async fn run(&self, job_id: Uuid) {
        let Some(job) = self.jobs.get(job_id) else {
            return;
        };

        self.jobs.update(job_id, |job| {
            job.status = JobStatus::Running;
            job.started_at = Some(chrono::Utc::now());
        });

        let models = job.models.clone().unwrap_or_else(|| self.defaults.council_models.clone());
        let chairman = job.chairman.clone().unwrap_or_else(|| self.defaults.chairman_model.clone());

        let result = engine::run_full_council(
            &self.router,
            DeliberationInputs {
                user_query: &job.query,
                final_only: job.final_only,
                models: &models,
                chairman_model: &chairman,
            },
        )
        .await;

        let completed_at = chrono::Utc::now();
        let result_summary = format!("Council completed with {} models", result.stage1.len());

        self.jobs.update(job_id, |job| {
            job.status = JobStatus::Completed;
            job.completed_at = Some(completed_at);
            job.result_summary = Some(result_summary.clone());
            job.result = Some(result.clone());
        });

        let payload = json!({
            "event": "council.completed",
            "job_id": job_id.to_string(),
            "query": job.query,
            "result": result,
            "metadata": job.metadata,
            "timing": {
                "created_at": job.created_at,
                "started_at": job.started_at,
                "completed_at": completed_at,
            },
        });

        let delivered = self.webhooks.send(&job.webhook_url, &payload, job.webhook_secret.as_deref()).await;

        self.jobs.update(job_id, |job| {
            job.status = if delivered { JobStatus::WebhookSent } else { JobStatus::WebhookFailed };
            if !delivered {
                job.error = Some("Failed to deliver webhook after retries".to_string());
            }
        });
    }
}
