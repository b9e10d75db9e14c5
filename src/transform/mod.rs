//! CSV row transformation.
//!
//! Both transformers read CSV records from a byte stream, append a `hasEmail` column, and write
//! the annotated records to an output stream:
//!
//! - [`sequential::transform_sequential`]: single-threaded reference implementation
//! - [`parallel::transform_parallel`]: fixed worker pool with collector-side reordering
//!
//! For a fixed input the two modes produce byte-identical output; the parallel path only changes
//! who does the classification work, never the order of the result.
//!
//! Shared rules (both modes):
//!
//! - The first record is the header. `hasEmail` is appended unless some existing field already
//!   case-insensitively equals `hasemail` after trimming; in that case the header is passed
//!   through unchanged (data rows still gain their annotation column, so header and data widths
//!   can disagree; a quirk kept for compatibility with existing consumers).
//! - Data rows whose fields are all empty or whitespace-only are dropped from the output.
//! - Every surviving data row gets exactly one appended field, the literal `"true"` or `"false"`.
//! - Field counts may vary from record to record; no schema is enforced and field content is
//!   never trimmed in the output.

pub mod parallel;
pub mod sequential;

pub use parallel::transform_parallel;
pub use sequential::transform_sequential;

use std::io::{Read, Write};

use serde::Serialize;

use crate::classify::record_has_email;
use crate::error::TransformResult;

/// Name of the annotation column appended to the header.
pub const HAS_EMAIL_HEADER: &str = "hasEmail";

/// Default worker count for [`Mode::Parallel`].
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default capacity of the row and result queues in the parallel pipeline.
///
/// Large enough that the feeder rarely stalls on typical files, while still bounding memory.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Processing mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Single-threaded, row-by-row.
    #[default]
    Sequential,
    /// Fixed worker pool with ordered reassembly.
    Parallel,
}

impl Mode {
    /// Parse a mode selector. `"parallel"` (case-insensitive) selects [`Mode::Parallel`];
    /// anything else falls back to [`Mode::Sequential`].
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("parallel") {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }

    /// Read the mode from the `PROCESS_MODE` environment variable.
    pub fn from_env() -> Self {
        std::env::var("PROCESS_MODE")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// The selector string this mode parses from.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

/// Options controlling [`transform`].
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Sequential or parallel execution.
    pub mode: Mode,
    /// Worker count used in parallel mode.
    pub worker_count: usize,
    /// Capacity of the row and result queues in parallel mode.
    pub queue_capacity: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Transform CSV from `input` to `output` according to `options`.
///
/// This is the single entry point collaborators call; it dispatches to
/// [`transform_sequential`] or [`transform_parallel`] based on [`TransformOptions::mode`].
///
/// # Panics
///
/// Panics if `options.worker_count == 0` or `options.queue_capacity == 0` in parallel mode.
pub fn transform<R, W>(input: R, output: W, options: &TransformOptions) -> TransformResult<()>
where
    R: Read + Send,
    W: Write,
{
    match options.mode {
        Mode::Sequential => sequential::transform_sequential(input, output),
        Mode::Parallel => parallel::transform_parallel_with_capacity(
            input,
            output,
            options.worker_count,
            options.queue_capacity,
        ),
    }
}

/// Build the CSV reader both modes share: no header inference, variable field counts allowed.
pub(crate) fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

/// Build the CSV writer both modes share. Flexible, since annotated data rows and a passed-through
/// header can have different widths.
pub(crate) fn csv_writer<W: Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().flexible(true).from_writer(output)
}

/// True if every field is empty or whitespace-only.
pub(crate) fn is_blank_record(fields: &[String]) -> bool {
    fields.iter().all(|f| f.trim().is_empty())
}

/// Append `hasEmail` to the header unless a field already names that column.
pub(crate) fn header_with_flag(mut fields: Vec<String>) -> Vec<String> {
    let exists = fields
        .iter()
        .any(|f| f.trim().eq_ignore_ascii_case("hasemail"));
    if !exists {
        fields.push(HAS_EMAIL_HEADER.to_string());
    }
    fields
}

/// Classify a data row and append its `"true"`/`"false"` annotation.
pub(crate) fn annotate_record(mut fields: Vec<String>) -> Vec<String> {
    let has_email = record_has_email(&fields);
    fields.push(has_email.to_string());
    fields
}
