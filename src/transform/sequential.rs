//! Single-threaded reference transformer.
//!
//! Reads, classifies, and writes row by row. This is the correctness oracle for the parallel
//! path: for any input the parallel transformer must match this output byte for byte.

use std::io::{Read, Write};

use crate::error::{TransformError, TransformResult};

use super::{annotate_record, csv_reader, csv_writer, header_with_flag, is_blank_record};

/// Transform CSV from `input` to `output` on the calling thread.
///
/// Fails with [`TransformError::EmptyInput`] if the stream yields zero records, and with
/// [`TransformError::MalformedInput`] if the CSV reader rejects a record. The output is flushed
/// before returning success.
pub fn transform_sequential<R: Read, W: Write>(input: R, output: W) -> TransformResult<()> {
    let mut reader = csv_reader(input);
    let mut writer = csv_writer(output);

    let mut rows_written = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|source| TransformError::MalformedInput {
            row: index + 1,
            source,
        })?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();

        let out = if index == 0 {
            header_with_flag(fields)
        } else if is_blank_record(&fields) {
            continue;
        } else {
            annotate_record(fields)
        };

        writer
            .write_record(&out)
            .map_err(|source| TransformError::Write {
                row: index + 1,
                source,
            })?;
        rows_written += 1;
    }

    if rows_written == 0 {
        return Err(TransformError::EmptyInput);
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::transform_sequential;
    use crate::error::TransformError;

    fn run(input: &str) -> Result<String, TransformError> {
        let mut output = Vec::new();
        transform_sequential(input.as_bytes(), &mut output)?;
        Ok(String::from_utf8(output).expect("output is UTF-8"))
    }

    #[test]
    fn annotates_rows_and_extends_header() {
        let out = run("name,email\nAlice,alice@example.com\nBob,not-an-email\n").unwrap();
        assert_eq!(
            out,
            "name,email,hasEmail\nAlice,alice@example.com,true\nBob,not-an-email,false\n"
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(run(""), Err(TransformError::EmptyInput)));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let out = run("a,b\nx,y\n,\nz,w\n").unwrap();
        assert_eq!(out, "a,b,hasEmail\nx,y,false\nz,w,false\n");
    }

    #[test]
    fn header_only_input_still_succeeds() {
        let out = run("name,email\n").unwrap();
        assert_eq!(out, "name,email,hasEmail\n");
    }
}
