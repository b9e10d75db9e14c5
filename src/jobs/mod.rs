//! Job lifecycle: upload registration, status tracking, and transform execution.
//!
//! The job layer is the thin orchestration shell around [`crate::transform`]: it owns no
//! concurrency of its own beyond the locked [`JobStore`] map. [`enqueue_job`] saves an upload
//! and registers a `QUEUED` job; [`process_job`] is a blocking call the embedding application
//! runs wherever it likes (a spawned thread, a task pool). Success becomes `DONE` with an output
//! file path, failure becomes `FAILED` with the error message and no leftover partial output.

mod observer;

pub use observer::{FileJobObserver, JobObserver, StdErrJobObserver};

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::error::{TransformError, TransformResult};
use crate::storage::Storage;
use crate::transform::{transform, Mode, TransformOptions, DEFAULT_WORKER_COUNT};

/// Lifecycle state of a job, serialized with the wire values existing clients expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    #[serde(rename = "QUEUED")]
    Queued,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
}

/// One upload-transform-download unit of work.
///
/// Serializes to the status payload callers surface to clients; file paths stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(skip)]
    pub input_path: PathBuf,
    #[serde(skip)]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub updated_at: u64,
    pub mode: Mode,
}

/// In-memory job registry.
///
/// Explicitly constructed and owned by the caller; there is no process-global store.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job.
    pub fn create(&self, job: Job) {
        self.jobs
            .lock()
            .expect("job store lock poisoned")
            .insert(job.id.clone(), job);
    }

    /// Fetch a snapshot of a job by id.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs
            .lock()
            .expect("job store lock poisoned")
            .get(id)
            .cloned()
    }

    /// Update a job's status (and error message, when failing).
    pub fn set_status(&self, id: &str, status: JobStatus, error: Option<&TransformError>) {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        if let Some(job) = jobs.get_mut(id) {
            job.status = status;
            if let Some(err) = error {
                job.error = Some(err.to_string());
            }
            job.updated_at = unix_now();
        }
    }

    /// Record the processed output path for a job.
    pub fn set_output(&self, id: &str, path: PathBuf) {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        if let Some(job) = jobs.get_mut(id) {
            job.output_path = Some(path);
            job.updated_at = unix_now();
        }
    }
}

/// Options controlling [`process_job`].
#[derive(Clone, Default)]
pub struct ProcessOptions {
    /// Worker count used when the job's mode is [`Mode::Parallel`].
    /// `None` uses [`DEFAULT_WORKER_COUNT`].
    pub worker_count: Option<usize>,
    /// Optional observer for job transitions and failures.
    pub observer: Option<Arc<dyn JobObserver>>,
}

impl std::fmt::Debug for ProcessOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessOptions")
            .field("worker_count", &self.worker_count)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Save an uploaded byte stream and register a `QUEUED` job for it.
pub fn enqueue_job<R: Read>(
    store: &JobStore,
    storage: &Storage,
    file: R,
    mode: Mode,
) -> TransformResult<Job> {
    let id = Uuid::new_v4().to_string();
    let input_path = storage.save_upload(file, &id)?;

    let now = unix_now();
    let job = Job {
        id,
        status: JobStatus::Queued,
        input_path,
        output_path: None,
        error: None,
        created_at: now,
        updated_at: now,
        mode,
    };
    store.create(job.clone());
    Ok(job)
}

/// Run a queued job to completion on the calling thread.
///
/// Opens the job's upload, transforms it into the storage output path in the job's mode, and
/// records the outcome in `store`. On failure the partially-written output file is removed.
/// The result is also returned so embedding code can react without polling the store.
pub fn process_job(
    store: &JobStore,
    storage: &Storage,
    job: &Job,
    options: &ProcessOptions,
) -> TransformResult<()> {
    store.set_status(&job.id, JobStatus::InProgress, None);
    notify_transition(store, options, &job.id);

    let result = run_transform(storage, job, options);
    match result {
        Ok(output_path) => {
            store.set_output(&job.id, output_path);
            store.set_status(&job.id, JobStatus::Done, None);
            notify_transition(store, options, &job.id);
            Ok(())
        }
        Err(err) => {
            // Never leave a partial output behind.
            let output_path = storage.output_path(&job.id);
            if let Err(remove_err) = fs::remove_file(&output_path) {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    notify_failure(store, options, &job.id, &TransformError::Io(remove_err));
                }
            }
            store.set_status(&job.id, JobStatus::Failed, Some(&err));
            notify_failure(store, options, &job.id, &err);
            Err(err)
        }
    }
}

fn run_transform(
    storage: &Storage,
    job: &Job,
    options: &ProcessOptions,
) -> TransformResult<PathBuf> {
    let input = File::open(&job.input_path)?;
    let output_path = storage.output_path(&job.id);
    let output = File::create(&output_path)?;

    let transform_options = TransformOptions {
        mode: job.mode,
        worker_count: options.worker_count.unwrap_or(DEFAULT_WORKER_COUNT),
        ..TransformOptions::default()
    };
    transform(input, output, &transform_options)?;
    Ok(output_path)
}

fn notify_transition(store: &JobStore, options: &ProcessOptions, id: &str) {
    if let (Some(observer), Some(job)) = (&options.observer, store.get(id)) {
        observer.on_transition(&job);
    }
}

fn notify_failure(store: &JobStore, options: &ProcessOptions, id: &str, error: &TransformError) {
    if let (Some(observer), Some(job)) = (&options.observer, store.get(id)) {
        observer.on_failure(&job, error);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::{JobStatus, JobStore, Job};
    use crate::error::TransformError;
    use crate::transform::Mode;

    fn queued_job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            status: JobStatus::Queued,
            input_path: "in".into(),
            output_path: None,
            error: None,
            created_at: 0,
            updated_at: 0,
            mode: Mode::Sequential,
        }
    }

    #[test]
    fn store_tracks_status_and_error_message() {
        let store = JobStore::new();
        store.create(queued_job("a"));

        store.set_status("a", JobStatus::Failed, Some(&TransformError::EmptyInput));
        let job = store.get("a").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("CSV input is empty or invalid"));
    }

    #[test]
    fn unknown_ids_are_absent_and_updates_to_them_are_no_ops() {
        let store = JobStore::new();
        assert!(store.get("missing").is_none());
        store.set_status("missing", JobStatus::Done, None);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn job_serializes_wire_statuses_and_hides_paths() {
        let mut job = queued_job("a");
        job.mode = Mode::Parallel;
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "QUEUED");
        assert_eq!(json["mode"], "parallel");
        assert!(json.get("input_path").is_none());
        assert!(json.get("output_path").is_none());
        assert!(json.get("error").is_none());
    }
}
