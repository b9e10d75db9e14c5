//! On-disk file management for uploads and processed outputs.
//!
//! A [`Storage`] is scoped to an explicit root directory; nothing here is process-global, so
//! tests and embedding applications can each own their own storage tree and tear it down.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Suffix for raw uploaded files.
pub const UPLOAD_SUFFIX: &str = ".upload";
/// Suffix for processed output files.
pub const PROCESSED_SUFFIX: &str = ".csv";

/// File storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open storage rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the upload for `id` is (or would be) stored.
    pub fn upload_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}{UPLOAD_SUFFIX}"))
    }

    /// Path where the processed output for `id` is (or would be) stored.
    pub fn output_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}{PROCESSED_SUFFIX}"))
    }

    /// Copy an uploaded byte stream to disk under `id`, returning its path.
    pub fn save_upload<R: Read>(&self, mut file: R, id: &str) -> io::Result<PathBuf> {
        let path = self.upload_path(id);
        let mut out = File::create(&path)?;
        io::copy(&mut file, &mut out)?;
        Ok(path)
    }

    /// Remove files older than `max_age`. Per-file failures are skipped so one stuck file does
    /// not block cleanup of the rest.
    pub fn cleanup_older_than(&self, max_age: Duration) -> io::Result<()> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        for entry in fs::read_dir(&self.root)? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if modified < cutoff {
                let _ = fs::remove_file(&path);
            }
        }
        Ok(())
    }

    /// Remove both the upload and the processed output for a job, if present.
    pub fn remove_job_files(&self, id: &str) -> io::Result<()> {
        let mut first_error = None;
        for path in [self.upload_path(id), self.output_path(id)] {
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != io::ErrorKind::NotFound && first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Storage, PROCESSED_SUFFIX, UPLOAD_SUFFIX};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn tmp_root(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("csv-email-flagger-{name}-{nanos}"))
    }

    #[test]
    fn paths_use_the_expected_suffixes() {
        let root = tmp_root("paths");
        let storage = Storage::new(&root).unwrap();
        assert_eq!(
            storage.upload_path("abc"),
            root.join(format!("abc{UPLOAD_SUFFIX}"))
        );
        assert_eq!(
            storage.output_path("abc"),
            root.join(format!("abc{PROCESSED_SUFFIX}"))
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn save_upload_round_trips_bytes() {
        let root = tmp_root("save");
        let storage = Storage::new(&root).unwrap();
        let path = storage.save_upload("a,b\n1,2\n".as_bytes(), "job").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn remove_job_files_ignores_missing_files() {
        let root = tmp_root("remove");
        let storage = Storage::new(&root).unwrap();
        storage.save_upload(&b"x"[..], "job").unwrap();
        storage.remove_job_files("job").unwrap();
        assert!(!storage.upload_path("job").exists());
        // Second removal is a no-op, not an error.
        storage.remove_job_files("job").unwrap();
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn cleanup_spares_recent_files() {
        let root = tmp_root("cleanup");
        let storage = Storage::new(&root).unwrap();
        storage.save_upload(&b"x"[..], "fresh").unwrap();
        storage.cleanup_older_than(Duration::from_secs(3600)).unwrap();
        assert!(storage.upload_path("fresh").exists());
        let _ = std::fs::remove_dir_all(&root);
    }
}
