use thiserror::Error;

/// Convenience result type for transform and job operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Error type returned by the transformers and the job layer.
///
/// This is a single error enum shared by the sequential and parallel paths; both produce the
/// same variant for the same input, so callers can treat the two modes interchangeably.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input stream produced zero parsed records (not even a header).
    #[error("CSV input is empty or invalid")]
    EmptyInput,

    /// The CSV reader rejected a record.
    ///
    /// Carries the 1-based row number of the record that failed to parse. Note that the `csv`
    /// crate recovers from most quoting irregularities; in practice this surfaces invalid UTF-8
    /// and other hard decode failures.
    #[error("error reading CSV row {row}: {source}")]
    MalformedInput { row: usize, source: csv::Error },

    /// The output stream rejected a write (or the final flush).
    #[error("error writing data row {row}: {source}")]
    Write { row: usize, source: csv::Error },

    /// Underlying I/O error outside CSV encode/decode (e.g. opening or removing job files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
