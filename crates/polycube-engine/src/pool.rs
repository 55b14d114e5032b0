//! Fixed-size growth thread pool.
//!
//! A [`GrowthPool`] hands seeds to its workers a few at a time from one
//! shared buffer, so threads that draw cheap seeds simply come back sooner.
//! Two locks guard the shared state:
//!
//! - the seed lock covers the seed buffer, its cursor, and any
//!   [`SeedSource`] the buffer is refilled from;
//! - the output lock covers the accumulated output.
//!
//! In streaming mode the sink itself is owned by a dedicated writer thread.
//! Workers pack their keys outside any lock, append the bytes under the
//! output lock, and when the buffer passes the high-water mark swap it for
//! an empty one and send the full one to the writer over a bounded channel.
//! The writer returns drained buffers on a second channel for reuse.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver};
use polycube_core::{Key, KeySink, SeedSource, StreamError};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, RunConfig, SEED_REFILL};
use crate::error::RunError;
use crate::metrics::RunReport;
use crate::progress::ProgressEstimator;
use crate::worker::{worker_loop, writer_loop, Flush, WorkerOutput, WriterReport};

/// Full buffers queued for the writer at once. With the buffer being filled
/// this makes the classic double buffer plus one batch of slack.
const WRITER_QUEUE: usize = 2;

// ── Seed queue ─────────────────────────────────────────────────────

struct SeedQueue {
    input_length: usize,
    buffer: Vec<Key>,
    cursor: usize,
    source: Option<Box<dyn SeedSource>>,
    source_declared: Option<u64>,
    source_read: u64,
    consumed: u64,
    rejected: u64,
    progress: Option<ProgressEstimator>,
}

impl SeedQueue {
    /// Append up to `max` seeds to `out`, refilling from the source when
    /// the buffer runs dry.
    fn fetch(&mut self, max: usize, out: &mut Vec<Key>) -> Result<usize, StreamError> {
        if self.cursor >= self.buffer.len() {
            self.refill()?;
        }
        let end = (self.cursor + max).min(self.buffer.len());
        let n = end - self.cursor;
        out.extend_from_slice(&self.buffer[self.cursor..end]);
        self.cursor = end;
        self.consumed += n as u64;

        if n > 0 {
            if let Some(snapshot) = self.progress.as_mut().and_then(|p| p.observe(self.consumed)) {
                info!(
                    consumed = snapshot.consumed,
                    total = snapshot.total,
                    remaining_s = snapshot.remaining.as_secs(),
                    "{snapshot}"
                );
            }
        }
        Ok(n)
    }

    /// Read from the source until the buffer holds a usable seed or the
    /// source runs dry. Keys of the wrong length are dropped.
    fn refill(&mut self) -> Result<(), StreamError> {
        while self.cursor >= self.buffer.len() {
            let Some(source) = self.source.as_mut() else {
                return Ok(());
            };
            self.buffer.clear();
            self.cursor = 0;
            let n = source.read_batch(SEED_REFILL, &mut self.buffer)?;
            self.source_read += n as u64;
            debug!(read = n, total_read = self.source_read, "refilled seed buffer");

            let expected = self.input_length;
            self.buffer.retain(|k| k.len() == expected);
            let dropped = n - self.buffer.len();
            if dropped > 0 {
                self.rejected += dropped as u64;
                warn!(expected, dropped, "dropped seeds of the wrong length");
            }

            if n == 0 {
                self.source = None;
                if let Some(declared) = self.source_declared {
                    if declared != self.source_read {
                        warn!(
                            declared,
                            read = self.source_read,
                            "seed source held a different number of keys than it declared"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Output state ───────────────────────────────────────────────────

/// Streaming accumulation buffer.
pub(crate) struct StreamBuffer {
    bytes: Vec<u8>,
    count: u64,
    recycled: Receiver<Vec<u8>>,
}

impl StreamBuffer {
    /// Swap out the accumulated batch, reusing a drained buffer if the
    /// writer has returned one.
    fn take(&mut self) -> Flush {
        let fresh = self.recycled.try_recv().unwrap_or_default();
        Flush {
            bytes: mem::replace(&mut self.bytes, fresh),
            count: mem::take(&mut self.count),
        }
    }
}

pub(crate) enum OutputState {
    Count,
    Collect(Vec<Key>),
    Stream(StreamBuffer),
}

/// State shared by every worker of one run.
pub(crate) struct PoolShared {
    fetch_batch: usize,
    collect: bool,
    output_cache: u64,
    stop: AtomicBool,
    seeds: Mutex<SeedQueue>,
    output: Mutex<OutputState>,
}

impl PoolShared {
    /// Fill `out` with the next seed batch. Returns 0 when the seeds are
    /// exhausted or the run is stopping.
    pub(crate) fn fetch_seeds(&self, out: &mut Vec<Key>) -> Result<usize, RunError> {
        if self.stop.load(Ordering::Acquire) {
            return Ok(0);
        }
        let mut queue = self.seeds.lock().unwrap();
        Ok(queue.fetch(self.fetch_batch, out)?)
    }

    /// Hand one emission to the output.
    pub(crate) fn push_output(&self, keys: &[Key], local: &mut WorkerOutput) -> Result<(), RunError> {
        let Some((packer, scratch, writer)) = local.stream_parts() else {
            if self.collect {
                if let OutputState::Collect(all) = &mut *self.output.lock().unwrap() {
                    all.extend_from_slice(keys);
                }
            }
            return Ok(());
        };

        scratch.clear();
        packer.pack_keys(keys, scratch)?;
        let full = {
            let mut output = self.output.lock().unwrap();
            match &mut *output {
                OutputState::Stream(buf) => {
                    buf.bytes.extend_from_slice(scratch);
                    buf.count += keys.len() as u64;
                    (buf.count >= self.output_cache).then(|| buf.take())
                }
                _ => None,
            }
        };
        if let Some(flush) = full {
            writer.send(flush).map_err(|_| RunError::WriterFailed {
                reason: "writer thread stopped".into(),
            })?;
        }
        Ok(())
    }

    /// Ask every worker to stop at its next fetch.
    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

// ── GrowthPool ─────────────────────────────────────────────────────

enum OutputMode {
    Count,
    Collect,
    Stream(Box<dyn KeySink>),
}

/// Result of [`GrowthPool::run`].
#[derive(Debug, Default)]
pub struct RunOutput {
    /// Run counters.
    pub report: RunReport,
    /// Emitted keys, in no particular order. Empty unless the pool was
    /// built with [`GrowthPool::collect`].
    pub keys: Vec<Key>,
}

/// A fixed set of worker threads growing seeds to one output length.
///
/// ```
/// use polycube_core::Key;
/// use polycube_engine::{GrowthPool, RunConfig};
///
/// let config = RunConfig { threads: Some(2), progress: false, ..RunConfig::new(2, 5) };
/// let out = GrowthPool::new(config)?.with_seeds(vec![Key::base()])?.run()?;
/// assert_eq!(out.report.total, 29);
/// # Ok::<(), polycube_engine::RunError>(())
/// ```
pub struct GrowthPool {
    config: RunConfig,
    seeds: Vec<Key>,
    source: Option<Box<dyn SeedSource>>,
    output: OutputMode,
}

impl GrowthPool {
    /// A pool for `config` with no seeds, counting its output.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            seeds: Vec::new(),
            source: None,
            output: OutputMode::Count,
        })
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Add in-memory seeds. Every seed must have the input length.
    pub fn with_seeds(mut self, seeds: Vec<Key>) -> Result<Self, ConfigError> {
        if let Some(bad) = seeds.iter().find(|k| k.len() != self.config.input_length) {
            return Err(ConfigError::SeedLengthMismatch {
                expected: self.config.input_length,
                found: bad.len(),
            });
        }
        self.seeds.extend(seeds);
        Ok(self)
    }

    /// Read further seeds from `source` once the in-memory seeds run out.
    ///
    /// A source declaring length 0 is empty and accepted as such.
    pub fn with_source(mut self, source: Box<dyn SeedSource>) -> Result<Self, ConfigError> {
        let found = source.declared_length();
        if found != 0 && found != self.config.input_length {
            return Err(ConfigError::SeedLengthMismatch {
                expected: self.config.input_length,
                found,
            });
        }
        self.source = Some(source);
        Ok(self)
    }

    /// Collect emitted keys into [`RunOutput::keys`].
    pub fn collect(mut self) -> Self {
        self.output = OutputMode::Collect;
        self
    }

    /// Stream emitted keys to `sink`.
    pub fn stream_to(mut self, sink: Box<dyn KeySink>) -> Result<Self, ConfigError> {
        if sink.output_length() != self.config.output_length {
            return Err(ConfigError::SinkLengthMismatch {
                expected: self.config.output_length,
                found: sink.output_length(),
            });
        }
        self.output = OutputMode::Stream(sink);
        Ok(self)
    }

    /// Run every worker to completion.
    ///
    /// Blocks until the seeds are exhausted, then flushes the remaining
    /// output and records the final count with the sink.
    pub fn run(self) -> Result<RunOutput, RunError> {
        let GrowthPool {
            config,
            seeds,
            source,
            output,
        } = self;
        let threads = config.resolved_thread_count();
        let start = Instant::now();

        let source_declared = source.as_ref().and_then(|s| s.declared_count());
        let expected_seeds = seeds.len() as u64 + source_declared.unwrap_or(0);
        info!(
            input_length = config.input_length,
            output_length = config.output_length,
            threads,
            seeds = expected_seeds,
            "starting growth run"
        );

        let (flush_tx, flush_rx) = bounded::<Flush>(WRITER_QUEUE);
        let (recycle_tx, recycle_rx) = bounded::<Vec<u8>>(WRITER_QUEUE);
        let (state, sink) = match output {
            OutputMode::Count => (OutputState::Count, None),
            OutputMode::Collect => (OutputState::Collect(Vec::new()), None),
            OutputMode::Stream(sink) => (
                OutputState::Stream(StreamBuffer {
                    bytes: Vec::new(),
                    count: 0,
                    recycled: recycle_rx,
                }),
                Some(sink),
            ),
        };
        let packers = sink.as_ref().map(|s| (0..threads).map(|_| s.packer()).collect::<Vec<_>>());

        let shared = Arc::new(PoolShared {
            fetch_batch: config.fetch_batch,
            collect: matches!(state, OutputState::Collect(_)),
            output_cache: config.output_cache as u64,
            stop: AtomicBool::new(false),
            seeds: Mutex::new(SeedQueue {
                input_length: config.input_length,
                buffer: seeds,
                cursor: 0,
                source,
                source_declared,
                source_read: 0,
                consumed: 0,
                rejected: 0,
                progress: config.progress.then(|| ProgressEstimator::new(expected_seeds)),
            }),
            output: Mutex::new(state),
        });

        let writer = match sink {
            Some(sink) => Some(spawn_writer(sink, flush_rx, recycle_tx)?),
            None => None,
        };

        let mut packers = packers.map(|p| p.into_iter());
        let mut workers: Vec<JoinHandle<Result<u64, RunError>>> = Vec::with_capacity(threads);
        let mut spawn_error = None;
        for i in 0..threads {
            let local = WorkerOutput::new(
                packers.as_mut().and_then(|p| p.next()),
                writer.is_some().then(|| flush_tx.clone()),
            );
            let shared_ref = Arc::clone(&shared);
            let (input_length, output_length) = (config.input_length, config.output_length);
            let spawned = thread::Builder::new()
                .name(format!("polycube-worker-{i}"))
                .spawn(move || worker_loop(&shared_ref, input_length, output_length, local));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    shared.stop();
                    spawn_error = Some(RunError::Config(ConfigError::ThreadSpawnFailed {
                        reason: e.to_string(),
                    }));
                    break;
                }
            }
        }

        let mut total = 0u64;
        let mut first_error = spawn_error;
        for (i, handle) in workers.into_iter().enumerate() {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(RunError::WorkerPanicked { worker: i }));
            match result {
                Ok(n) => total += n,
                Err(e) => {
                    shared.stop();
                    first_error.get_or_insert(e);
                }
            }
        }

        // A worker that panicked under a lock has already been reported;
        // the counters it left behind are still readable.
        let (seeds_consumed, seeds_rejected) = {
            let queue = shared.seeds.lock().unwrap_or_else(PoisonError::into_inner);
            (queue.consumed, queue.rejected)
        };
        let final_state = mem::replace(
            &mut *shared.output.lock().unwrap_or_else(PoisonError::into_inner),
            OutputState::Count,
        );
        let mut flushes = 0;
        let mut keys = Vec::new();
        match final_state {
            OutputState::Count => {}
            OutputState::Collect(all) => keys = all,
            OutputState::Stream(mut buf) => {
                if first_error.is_none() && buf.count > 0 {
                    // A failed send means the writer has already stopped;
                    // its own error is reported when it is joined.
                    let _ = flush_tx.send(buf.take());
                }
            }
        }
        drop(flush_tx);

        if let Some(handle) = writer {
            let WriterReport {
                mut sink,
                flushes: written,
            } = handle.join().map_err(|_| RunError::WriterFailed {
                reason: "writer thread panicked".into(),
            })??;
            flushes = written;
            if let Some(e) = first_error {
                return Err(e);
            }
            sink.write_final_count(total)?;
            sink.finish()?;
        } else if let Some(e) = first_error {
            return Err(e);
        }

        let report = RunReport {
            total,
            seeds_consumed,
            seeds_rejected,
            flushes,
            elapsed: start.elapsed(),
            threads,
        };
        info!(
            total,
            seeds = seeds_consumed,
            rejected = seeds_rejected,
            flushes,
            elapsed_s = report.elapsed.as_secs_f64(),
            "growth run finished"
        );
        Ok(RunOutput { report, keys })
    }
}

fn spawn_writer(
    sink: Box<dyn KeySink>,
    rx: Receiver<Flush>,
    recycle: crossbeam_channel::Sender<Vec<u8>>,
) -> Result<JoinHandle<Result<WriterReport, StreamError>>, ConfigError> {
    thread::Builder::new()
        .name("polycube-writer".into())
        .spawn(move || writer_loop(sink, rx, recycle))
        .map_err(|e| ConfigError::ThreadSpawnFailed {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycube_test_utils::{MemorySink, MemorySource, KNOWN_COUNTS};

    fn config(input: usize, output: usize, threads: usize) -> RunConfig {
        RunConfig {
            threads: Some(threads),
            progress: false,
            ..RunConfig::new(input, output)
        }
    }

    #[test]
    fn counts_from_base() {
        for n in 3..=6 {
            let out = GrowthPool::new(config(2, n, 2))
                .unwrap()
                .with_seeds(vec![Key::base()])
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(out.report.total, KNOWN_COUNTS[n], "n = {n}");
            assert_eq!(out.report.seeds_consumed, 1);
            assert!(out.keys.is_empty());
        }
    }

    #[test]
    fn collect_returns_every_key() {
        let out = GrowthPool::new(config(2, 5, 3))
            .unwrap()
            .with_seeds(vec![Key::base()])
            .unwrap()
            .collect()
            .run()
            .unwrap();
        assert_eq!(out.keys.len() as u64, out.report.total);
        assert!(out.keys.iter().all(|k| k.len() == 5));
    }

    #[test]
    fn no_seeds_is_an_empty_run() {
        let out = GrowthPool::new(config(3, 5, 4)).unwrap().run().unwrap();
        assert_eq!(out.report.total, 0);
        assert_eq!(out.report.threads, 4);
    }

    #[test]
    fn rejects_mismatched_seeds_and_sinks() {
        let pool = GrowthPool::new(config(3, 5, 1)).unwrap();
        assert!(matches!(
            pool.with_seeds(vec![Key::base()]),
            Err(ConfigError::SeedLengthMismatch { expected: 3, found: 2 })
        ));
        let pool = GrowthPool::new(config(3, 5, 1)).unwrap();
        assert!(matches!(
            pool.with_source(Box::new(MemorySource::new(4, Vec::new()))),
            Err(ConfigError::SeedLengthMismatch { expected: 3, found: 4 })
        ));
        let pool = GrowthPool::new(config(3, 5, 1)).unwrap();
        assert!(matches!(
            pool.stream_to(Box::new(MemorySink::new(6))),
            Err(ConfigError::SinkLengthMismatch { expected: 5, found: 6 })
        ));
        assert!(GrowthPool::new(config(5, 5, 1)).is_err());
    }

    #[test]
    fn small_cache_flushes_often() {
        let sink = MemorySink::new(5);
        let contents = sink.contents();
        let cfg = RunConfig {
            output_cache: 4,
            ..config(2, 5, 2)
        };
        let out = GrowthPool::new(cfg)
            .unwrap()
            .with_seeds(vec![Key::base()])
            .unwrap()
            .stream_to(Box::new(sink))
            .unwrap()
            .run()
            .unwrap();
        let contents = contents.lock().unwrap();
        assert_eq!(contents.keys.len(), 29);
        assert_eq!(contents.final_count, Some(29));
        assert_eq!(contents.writes as u64, out.report.flushes);
        assert!(out.report.flushes >= 2);
    }

    #[test]
    fn wrong_length_source_keys_are_dropped() {
        let straight = Key::from_coords(&[[1, 1, 1], [2, 1, 1], [3, 1, 1]]).unwrap();
        let bent = Key::from_coords(&[[1, 1, 1], [2, 1, 1], [2, 2, 1]]).unwrap();
        // A whole refill of bad keys must not end the run early.
        let mut keys = vec![Key::single(); SEED_REFILL];
        keys.extend([straight, Key::base(), bent]);
        let out = GrowthPool::new(config(3, 4, 2))
            .unwrap()
            .with_source(Box::new(MemorySource::new(3, keys)))
            .unwrap()
            .collect()
            .run()
            .unwrap();
        assert_eq!(out.report.total, KNOWN_COUNTS[4]);
        assert_eq!(out.report.seeds_consumed, 2);
        assert_eq!(out.report.seeds_rejected, SEED_REFILL as u64 + 1);
        assert!(out.keys.iter().all(|k| k.len() == 4));
    }

    struct PanickingSource;

    impl SeedSource for PanickingSource {
        fn declared_length(&self) -> usize {
            3
        }

        fn declared_count(&self) -> Option<u64> {
            None
        }

        fn read_batch(&mut self, _max: usize, _out: &mut Vec<Key>) -> Result<usize, StreamError> {
            panic!("source failed mid-read");
        }
    }

    #[test]
    fn panic_under_seed_lock_is_reported() {
        let result = GrowthPool::new(config(3, 4, 1))
            .unwrap()
            .with_source(Box::new(PanickingSource))
            .unwrap()
            .run();
        assert!(matches!(result, Err(RunError::WorkerPanicked { worker: 0 })));
    }
}
