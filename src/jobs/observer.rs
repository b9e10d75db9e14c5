use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TransformError;

use super::Job;

/// Observer interface for job outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait JobObserver: Send + Sync {
    /// Called after a job changes state (`IN_PROGRESS`, `DONE`).
    fn on_transition(&self, _job: &Job) {}

    /// Called when processing a job fails.
    fn on_failure(&self, _job: &Job, _error: &TransformError) {}
}

/// Logs job events to stderr.
#[derive(Debug, Default)]
pub struct StdErrJobObserver;

impl JobObserver for StdErrJobObserver {
    fn on_transition(&self, job: &Job) {
        eprintln!(
            "[job][{:?}] id={} mode={}",
            job.status,
            job.id,
            job.mode.as_str()
        );
    }

    fn on_failure(&self, job: &Job, error: &TransformError) {
        eprintln!(
            "[job][{:?}] id={} mode={} err={}",
            job.status,
            job.id,
            job.mode.as_str(),
            error
        );
    }
}

/// Appends job events to a local log file.
#[derive(Debug)]
pub struct FileJobObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileJobObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl JobObserver for FileJobObserver {
    fn on_transition(&self, job: &Job) {
        self.append_line(&format!(
            "{} {:?} id={} mode={}",
            unix_ts(),
            job.status,
            job.id,
            job.mode.as_str()
        ));
    }

    fn on_failure(&self, job: &Job, error: &TransformError) {
        self.append_line(&format!(
            "{} {:?} id={} mode={} err={}",
            unix_ts(),
            job.status,
            job.id,
            job.mode.as_str(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
