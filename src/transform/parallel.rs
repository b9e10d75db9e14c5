//! Worker-pool transformer with collector-side reordering.
//!
//! Three concurrent stages connected by two bounded queues:
//!
//! 1. **Feeder** (one thread): reads records in input order, tags each with its zero-based
//!    position, and pushes it onto the row queue. On a parse error it pushes a single tagged
//!    error result and stops feeding.
//! 2. **Workers** (`worker_count` threads): pull rows in no particular order, classify them
//!    independently, and push tagged outcomes onto the result queue. The header row is handled by
//!    whichever worker receives position 0, under a one-shot lock so the presence check and the
//!    column append happen exactly once.
//! 3. **Collector** (the calling thread): drains the result queue, parks out-of-order outcomes in
//!    a [`PendingBuffer`], and writes in strict ascending position order.
//!
//! Queue closure drives shutdown: the row queue closes when the feeder drops its sender, each
//! worker exits once the row queue is closed and drained, and the result queue closes when the
//! last worker's sender drops, ending the collector's drain loop. On the first error the
//! collector returns immediately; in-flight rows run to completion and their sends fail once the
//! receivers are gone, which unwinds the remaining threads without further coordination.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::{bounded, Receiver};

use crate::error::{TransformError, TransformResult};

use super::{
    annotate_record, csv_reader, csv_writer, header_with_flag, is_blank_record,
    DEFAULT_QUEUE_CAPACITY,
};

/// One input record tagged with its zero-based position.
struct Row {
    index: usize,
    fields: Vec<String>,
}

/// What a stage produced for one position.
enum Outcome {
    /// A record to write.
    Record(Vec<String>),
    /// A blank data row; advances the order counter without being written.
    Skip,
    /// A terminal error; aborts the whole transform.
    Failed(TransformError),
}

/// A tagged outcome on its way to the collector.
struct Tagged {
    index: usize,
    outcome: Outcome,
}

/// Transform CSV from `input` to `output` using `worker_count` classification workers.
///
/// Output is byte-identical to [`super::transform_sequential`] for any input and any
/// `worker_count >= 1`; worker completion order is unconstrained, output order is always the
/// original row order.
///
/// # Panics
///
/// Panics if `worker_count == 0`.
pub fn transform_parallel<R, W>(input: R, output: W, worker_count: usize) -> TransformResult<()>
where
    R: Read + Send,
    W: Write,
{
    transform_parallel_with_capacity(input, output, worker_count, DEFAULT_QUEUE_CAPACITY)
}

/// [`transform_parallel`] with an explicit queue capacity (rows buffered between stages).
///
/// # Panics
///
/// Panics if `worker_count == 0` or `queue_capacity == 0`.
pub fn transform_parallel_with_capacity<R, W>(
    input: R,
    output: W,
    worker_count: usize,
    queue_capacity: usize,
) -> TransformResult<()>
where
    R: Read + Send,
    W: Write,
{
    assert!(worker_count > 0, "worker_count must be > 0");
    assert!(queue_capacity > 0, "queue_capacity must be > 0");

    let mut reader = csv_reader(input);
    let mut writer = csv_writer(output);

    let (row_tx, row_rx) = bounded::<Row>(queue_capacity);
    let (result_tx, result_rx) = bounded::<Tagged>(queue_capacity);
    // One-shot header guard: whichever worker receives position 0 takes it, everyone else
    // passes headers through untouched.
    let header_done = Mutex::new(false);

    let collected = thread::scope(|scope| {
        let feeder_tx = result_tx.clone();
        scope.spawn(move || {
            let mut index = 0usize;
            for result in reader.records() {
                match result {
                    Ok(record) => {
                        let fields = record.iter().map(str::to_string).collect();
                        if row_tx.send(Row { index, fields }).is_err() {
                            // Collector aborted; nobody is listening.
                            break;
                        }
                        index += 1;
                    }
                    Err(source) => {
                        let _ = feeder_tx.send(Tagged {
                            index,
                            outcome: Outcome::Failed(TransformError::MalformedInput {
                                row: index + 1,
                                source,
                            }),
                        });
                        break;
                    }
                }
            }
            // Dropping row_tx here closes the row queue.
        });

        for _ in 0..worker_count {
            let row_rx = row_rx.clone();
            let result_tx = result_tx.clone();
            let header_done = &header_done;
            scope.spawn(move || {
                for row in row_rx.iter() {
                    let outcome = classify_row(row.fields, row.index, header_done);
                    if result_tx
                        .send(Tagged {
                            index: row.index,
                            outcome,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }

        // The threads hold the only remaining senders/receivers; the result queue closes when
        // the last of them exits.
        drop(result_tx);
        drop(row_rx);

        collect(result_rx, &mut writer)
    });
    collected?;

    writer.flush()?;
    Ok(())
}

/// Per-row work done by the pool. Rows share no mutable state except the header guard.
fn classify_row(fields: Vec<String>, index: usize, header_done: &Mutex<bool>) -> Outcome {
    if index == 0 {
        let mut done = header_done.lock().expect("header lock poisoned");
        if *done {
            // Defensive: position 0 is fed once, but a repeat must never double-append.
            return Outcome::Record(fields);
        }
        *done = true;
        return Outcome::Record(header_with_flag(fields));
    }
    if is_blank_record(&fields) {
        return Outcome::Skip;
    }
    Outcome::Record(annotate_record(fields))
}

/// Drain the result queue, restoring original row order before writing.
fn collect<W: Write>(result_rx: Receiver<Tagged>, writer: &mut csv::Writer<W>) -> TransformResult<()> {
    let mut pending = PendingBuffer::new();
    let mut rows_written = 0usize;

    for tagged in result_rx.iter() {
        if let Outcome::Failed(err) = tagged.outcome {
            // First error wins; partial output already written stays as-is.
            return Err(err);
        }
        pending.push(tagged.index, tagged.outcome);

        while let Some((index, outcome)) = pending.pop_next() {
            match outcome {
                Outcome::Record(fields) => {
                    writer
                        .write_record(&fields)
                        .map_err(|source| TransformError::Write {
                            row: index + 1,
                            source,
                        })?;
                    rows_written += 1;
                }
                Outcome::Skip => {}
                Outcome::Failed(_) => unreachable!("errors are returned before buffering"),
            }
        }
    }

    // End of a successful drain with nothing written (not even a header) means the input
    // stream produced zero records.
    if rows_written == 0 {
        return Err(TransformError::EmptyInput);
    }
    Ok(())
}

/// Position-indexed holding area for out-of-order outcomes awaiting in-order emission.
///
/// A position enters the buffer at most once, leaves at most once, and no entry is retained
/// after it has been emitted.
struct PendingBuffer {
    pending: HashMap<usize, Outcome>,
    next: usize,
}

impl PendingBuffer {
    fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next: 0,
        }
    }

    fn push(&mut self, index: usize, outcome: Outcome) {
        let previous = self.pending.insert(index, outcome);
        debug_assert!(previous.is_none(), "position {index} buffered twice");
    }

    /// Remove and return the next in-order outcome, if it has arrived.
    fn pop_next(&mut self) -> Option<(usize, Outcome)> {
        let outcome = self.pending.remove(&self.next)?;
        let index = self.next;
        self.next += 1;
        Some((index, outcome))
    }
}
