//! In-process async job store, backed by a sharded concurrent map instead
//! of the single `_jobs: Dict` + global interpreter lock `webhooks.py` gets
//! away with — concurrent Rust handlers need a store that doesn't serialize
//! every read behind one mutex.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::types::{Job, JobInfo, JobStatus};

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<DashMap<Uuid, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, job: Job) -> Uuid {
        let id = job.job_id;
        self.jobs.insert(id, job);
        id
    }

    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.jobs.get(&job_id).map(|entry| entry.value().clone())
    }

    /// Apply an in-place update, avoiding the clone-whole-job-then-reinsert
    /// pattern so concurrent readers never see a partially-updated record.
    pub fn update<F: FnOnce(&mut Job)>(&self, job_id: Uuid, f: F) {
        if let Some(mut entry) = self.jobs.get_mut(&job_id) {
            f(entry.value_mut());
        }
    }

    pub fn list(&self, limit: usize, status: Option<JobStatus>) -> Vec<JobInfo> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|job| status.map(|s| job.status == s).unwrap_or(true))
            .collect();

        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        jobs.iter().map(JobInfo::from).collect()
    }

    /// Remove jobs older than `max_age_hours`, returning how many were
    /// removed (`cleanup_old_jobs`).
    pub fn cleanup_older_than(&self, max_age_hours: i64) -> usize {
        let cutoff = chrono::Utc::now() - chrono::Duration::hours(max_age_hours);
        let stale: Vec<Uuid> = self
            .jobs
            .iter()
            .filter(|entry| entry.value().created_at < cutoff)
            .map(|entry| *entry.key())
            .collect();

        for id in &stale {
            self.jobs.remove(id);
        }
        stale.len()
    }
}

impl Job {
    pub fn status(&self) -> JobStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(created_at: chrono::DateTime<chrono::Utc>) -> Job {
        Job {
            job_id: Uuid::new_v4(),
            status: JobStatus::Pending,
            query: "what is rust".to_string(),
            webhook_url: "https://example.com/hook".to_string(),
            webhook_secret: None,
            final_only: false,
            models: None,
            chairman: None,
            include_details: true,
            metadata: None,
            created_at,
            started_at: None,
            completed_at: None,
            error: None,
            result_summary: None,
            result: None,
        }
    }

    #[test]
    fn list_sorts_newest_first_and_respects_limit() {
        let store = JobStore::new();
        let now = chrono::Utc::now();
        store.create(sample_job(now - chrono::Duration::hours(2)));
        let newest = sample_job(now);
        let newest_id = newest.job_id;
        store.create(newest);

        let listed = store.list(10, None);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].job_id, newest_id);
    }

    #[test]
    fn update_mutates_in_place() {
        let store = JobStore::new();
        let id = store.create(sample_job(chrono::Utc::now()));
        store.update(id, |job| job.status = JobStatus::Running);
        assert_eq!(store.get(id).unwrap().status, JobStatus::Running);
    }

    #[test]
    fn cleanup_removes_only_stale_jobs() {
        let store = JobStore::new();
        let now = chrono::Utc::now();
        store.create(sample_job(now - chrono::Duration::hours(48)));
        let fresh = sample_job(now);
        let fresh_id = fresh.job_id;
        store.create(fresh);

        let removed = store.cleanup_older_than(24);
        assert_eq!(removed, 1);
        assert!(store.get(fresh_id).is_some());
    }
}
