//! Worker and writer thread bodies.

use crossbeam_channel::{Receiver, Sender};
use polycube_core::{KeyPacker, KeySink, StreamError};
use polycube_grow::LevelChain;
use tracing::debug;

use crate::error::RunError;
use crate::pool::PoolShared;

/// A full output batch on its way to the writer.
pub(crate) struct Flush {
    pub(crate) bytes: Vec<u8>,
    pub(crate) count: u64,
}

/// What the writer hands back when its channel closes.
pub(crate) struct WriterReport {
    pub(crate) sink: Box<dyn KeySink>,
    pub(crate) flushes: u64,
}

/// Per-worker output state. Streaming workers own a packer, a scratch
/// buffer, and a sender to the writer; counting and collecting workers own
/// nothing.
pub(crate) struct WorkerOutput {
    packer: Option<Box<dyn KeyPacker>>,
    scratch: Vec<u8>,
    writer: Option<Sender<Flush>>,
}

impl WorkerOutput {
    pub(crate) fn new(packer: Option<Box<dyn KeyPacker>>, writer: Option<Sender<Flush>>) -> Self {
        Self {
            packer,
            scratch: Vec::new(),
            writer,
        }
    }

    pub(crate) fn stream_parts(
        &mut self,
    ) -> Option<(&mut Box<dyn KeyPacker>, &mut Vec<u8>, &Sender<Flush>)> {
        match (self.packer.as_mut(), self.writer.as_ref()) {
            (Some(packer), Some(writer)) => Some((packer, &mut self.scratch, writer)),
            _ => None,
        }
    }
}

/// Fetch seed batches and grow them until the pool runs dry.
///
/// Returns the number of keys this worker emitted. Any error stops the
/// other workers at their next fetch.
pub(crate) fn worker_loop(
    shared: &PoolShared,
    input_length: usize,
    output_length: usize,
    mut output: WorkerOutput,
) -> Result<u64, RunError> {
    let mut chain = LevelChain::new(input_length, output_length);
    let result = grow_all(shared, &mut chain, &mut output);
    if result.is_err() {
        shared.stop();
    }
    result
}

fn grow_all(
    shared: &PoolShared,
    chain: &mut LevelChain,
    output: &mut WorkerOutput,
) -> Result<u64, RunError> {
    let mut emitted = 0u64;
    loop {
        let seeds = chain.seeds_mut();
        seeds.clear();
        if shared.fetch_seeds(seeds)? == 0 {
            return Ok(emitted);
        }
        chain.start();
        while let Some(keys) = chain.process_chunk() {
            if keys.is_empty() {
                continue;
            }
            emitted += keys.len() as u64;
            shared.push_output(keys, output)?;
        }
    }
}

/// Drain flush batches into `sink` until every sender is dropped.
pub(crate) fn writer_loop(
    mut sink: Box<dyn KeySink>,
    rx: Receiver<Flush>,
    recycle: Sender<Vec<u8>>,
) -> Result<WriterReport, StreamError> {
    let mut flushes = 0;
    for Flush { mut bytes, count } in rx.iter() {
        sink.write_packed(&bytes, count)?;
        flushes += 1;
        debug!(count, bytes = bytes.len(), "flushed output batch");
        bytes.clear();
        // A full recycle queue just means the buffer is dropped.
        let _ = recycle.try_send(bytes);
    }
    sink.flush()?;
    Ok(WriterReport { sink, flushes })
}
