//! Shared data model for a single deliberation: messages, per-model
//! responses, anonymized rankings, and the async job envelope.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// A single provider's reply, or `None` if the provider failed — absence is
/// modeled as `Option<ModelResponse>` at the call boundary, never as an
/// empty-string sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: String,
    #[serde(default)]
    pub usage: Usage,
    pub model: String,
    pub provider: String,
}

/// Stage 1 entry: one model's answer to the original query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage1Entry {
    pub model: String,
    pub response: String,
    pub usage: Usage,
    pub provider: String,
}

/// Stage 2 entry: one model's ranking of the anonymized Stage 1 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage2Entry {
    pub model: String,
    pub ranking: String,
    pub parsed_ranking: Vec<String>,
    pub usage: Usage,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage3Result {
    pub model: String,
    pub response: String,
    pub usage: Usage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRanking {
    pub model: String,
    pub average_rank: f64,
    pub rankings_count: usize,
}

/// Bijective mapping between anonymized labels ("Response A") and the
/// canonical model id that produced that response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelMap(IndexMap<String, String>);

impl LabelMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, label: impl Into<String>, model: impl Into<String>) {
        self.0.insert(label.into(), model.into());
    }

    pub fn model_for_label(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.0
    }
}

/// Label letters assigned in Stage 1 response order: A, B, C, ...
pub fn label_for_index(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    if index < 26 {
        letter.to_string()
    } else {
        format!("{}{}", letter, index / 26)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliberationResult {
    pub stage1: Vec<Stage1Entry>,
    pub stage2: Vec<Stage2Entry>,
    pub stage3: Stage3Result,
    pub aggregate_rankings: Vec<AggregateRanking>,
    pub label_to_model: HashMap<String, String>,
    pub final_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    WebhookSent,
    WebhookFailed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: uuid::Uuid,
    pub status: JobStatus,
    pub query: String,
    pub webhook_url: String,
    pub webhook_secret: Option<String>,
    pub final_only: bool,
    pub models: Option<Vec<String>>,
    pub chairman: Option<String>,
    pub include_details: bool,
    pub metadata: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
    pub result_summary: Option<String>,
    pub result: Option<DeliberationResult>,
}

/// A job's fields trimmed for listing: long queries truncated at 100 chars
/// and the full result payload omitted.
#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub job_id: uuid::Uuid,
    pub status: JobStatus,
    pub query: String,
    pub webhook_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
    pub result_summary: Option<String>,
}

impl From<&Job> for JobInfo {
    fn from(job: &Job) -> Self {
        let query = if job.query.len() > 100 {
            format!("{}...", &job.query[..100])
        } else {
            job.query.clone()
        };

        Self {
            job_id: job.job_id,
            status: job.status,
            query,
            webhook_url: job.webhook_url.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            error: job.error.clone(),
            result_summary: job.result_summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cycle_past_z() {
        assert_eq!(label_for_index(0), "A");
        assert_eq!(label_for_index(25), "Z");
        assert_eq!(label_for_index(26), "A1");
    }

    #[test]
    fn job_info_truncates_long_queries() {
        let job = Job {
            job_id: uuid::Uuid::nil(),
            status: JobStatus::Pending,
            query: "x".repeat(150),
            webhook_url: "https://example.com/hook".to_string(),
            webhook_secret: None,
            final_only: false,
            models: None,
            chairman: None,
            include_details: true,
            metadata: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
            result_summary: None,
            result: None,
        };
        let info = JobInfo::from(&job);
        assert_eq!(info.query.len(), 103);
        assert!(info.query.ends_with("..."));
    }
}
