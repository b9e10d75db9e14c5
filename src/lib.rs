//! `csv-email-flagger` annotates CSV files with whether each data row contains an email address.
//!
//! The core is an ordered parallel row-transformation engine: rows fan out to a fixed worker
//! pool, get classified concurrently, and are reassembled in strict original order before being
//! written. A single-threaded transformer with identical observable behavior serves as the
//! reference implementation, and a thin job layer wraps either one for upload/download style
//! workflows.
//!
//! ## What a transform does
//!
//! - The header row gains a `hasEmail` column (unless one already exists, case-insensitively).
//! - Every data row gets exactly one appended field, `"true"` or `"false"`, depending on whether
//!   the row's fields (joined with a space) contain an email-shaped substring.
//! - Rows whose fields are all blank are dropped.
//! - Output row order always equals input row order, in both modes.
//!
//! ## Quick example: transform in memory
//!
//! ```rust
//! use csv_email_flagger::transform::{transform, Mode, TransformOptions};
//!
//! # fn main() -> Result<(), csv_email_flagger::TransformError> {
//! let input = "name,email\nAlice,alice@example.com\nBob,not-an-email\n";
//! let mut output = Vec::new();
//!
//! let options = TransformOptions {
//!     mode: Mode::Parallel,
//!     ..TransformOptions::default()
//! };
//! transform(input.as_bytes(), &mut output, &options)?;
//!
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "name,email,hasEmail\nAlice,alice@example.com,true\nBob,not-an-email,false\n"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Job workflow
//!
//! The job layer turns the blocking transform call into tracked units of work. Spawning is left
//! to the embedding application (a thread, a task pool, a request handler):
//!
//! ```no_run
//! use csv_email_flagger::jobs::{enqueue_job, process_job, JobStore, ProcessOptions};
//! use csv_email_flagger::storage::Storage;
//! use csv_email_flagger::transform::Mode;
//!
//! # fn main() -> Result<(), csv_email_flagger::TransformError> {
//! let storage = Storage::new("storage")?;
//! let store = JobStore::new();
//!
//! let upload = std::fs::File::open("contacts.csv")?;
//! let job = enqueue_job(&store, &storage, upload, Mode::from_env())?;
//! process_job(&store, &storage, &job, &ProcessOptions::default())?;
//!
//! let done = store.get(&job.id).expect("job exists");
//! println!("output at {:?}", done.output_path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`transform`]: sequential and parallel transformers plus the shared contract
//! - [`classify`]: the email classifier
//! - [`jobs`]: job registry, processing, and observer hooks
//! - [`storage`]: scoped on-disk upload/output management
//! - [`error`]: error types shared across the crate

pub mod classify;
pub mod error;
pub mod jobs;
pub mod storage;
pub mod transform;

pub use error::{TransformError, TransformResult};
