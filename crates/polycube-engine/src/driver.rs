//! Two-phase enumeration driver.
//!
//! Small sizes are grown on a single thread, where spawning workers would
//! cost more than the work itself. The keys of the switch-over size are
//! collected and become the seeds of a multi-threaded pass to the target.
//! A seed source replaces both the base case and the first pass.

use std::mem;
use std::time::{Duration, Instant};

use polycube_core::{Key, KeySink, MAX_LENGTH};
use tracing::{info, warn};

use crate::config::{ConfigError, DriverConfig, RunConfig};
use crate::error::RunError;
use crate::metrics::RunReport;
use crate::pool::GrowthPool;

/// Outcome of a full enumeration.
#[derive(Clone, Debug, Default)]
pub struct DriverReport {
    /// Size of the counted shapes.
    pub target_length: usize,
    /// Distinct shapes of `target_length`.
    pub count: u64,
    /// One report per pool pass, in order. Empty for the base cases.
    pub passes: Vec<RunReport>,
    /// Wall-clock time for the whole enumeration.
    pub elapsed: Duration,
}

/// Count the shapes of `target_length` without writing them anywhere.
pub fn count(target_length: usize, threads: Option<usize>) -> Result<u64, RunError> {
    let mut config = DriverConfig::new(target_length);
    config.threads = threads;
    config.progress = false;
    Ok(run(config)?.count)
}

/// Enumerate every shape of `config.target_length`.
pub fn run(mut config: DriverConfig) -> Result<DriverReport, RunError> {
    let target = config.target_length;
    if target < 1 || target > MAX_LENGTH {
        return Err(ConfigError::InvalidLengths {
            input_length: 1,
            output_length: target,
        }
        .into());
    }
    if let Some(sink) = &config.sink {
        if sink.output_length() != target {
            return Err(ConfigError::SinkLengthMismatch {
                expected: target,
                found: sink.output_length(),
            }
            .into());
        }
    }

    let start = Instant::now();
    let mut report = DriverReport {
        target_length: target,
        ..DriverReport::default()
    };

    let source = config.source.take();
    let (mut seeds, mut length) = match &source {
        Some(source) => {
            let length = source.declared_length();
            if length == 0 {
                warn!("seed source is empty");
                return finish_direct(config.sink.take(), &[], report, start);
            }
            if length >= target {
                return Err(ConfigError::InvalidLengths {
                    input_length: length,
                    output_length: target,
                }
                .into());
            }
            info!(length, declared = ?source.declared_count(), "starting from seed source");
            (Vec::new(), length)
        }
        None if target == 1 => {
            return finish_direct(config.sink.take(), &[Key::single()], report, start);
        }
        None if target == 2 => {
            return finish_direct(config.sink.take(), &[Key::base()], report, start);
        }
        None => (vec![Key::base()], 2),
    };

    if source.is_none() {
        let switch = config.single_thread_length.min(target);
        if switch > length {
            let single = RunConfig {
                threads: Some(1),
                progress: false,
                ..RunConfig::new(length, switch)
            };
            let pool = GrowthPool::new(single)?.with_seeds(mem::take(&mut seeds))?;
            if switch == target {
                let pool = match config.sink.take() {
                    Some(sink) => pool.stream_to(sink)?,
                    None => pool,
                };
                let out = pool.run()?;
                report.count = out.report.total;
                report.passes.push(out.report);
                return Ok(finish(report, start));
            }
            let out = pool.collect().run()?;
            info!(
                length = switch,
                seeds = out.keys.len(),
                threads = ?config.threads,
                "switching to multi-threaded growth"
            );
            report.passes.push(out.report);
            seeds = out.keys;
            length = switch;
        }
    }

    let multi = RunConfig {
        threads: config.threads,
        progress: config.progress,
        ..RunConfig::new(length, target)
    };
    let mut pool = GrowthPool::new(multi)?.with_seeds(seeds)?;
    if let Some(source) = source {
        pool = pool.with_source(source)?;
    }
    if let Some(sink) = config.sink.take() {
        pool = pool.stream_to(sink)?;
    }
    let out = pool.run()?;
    report.count = out.report.total;
    report.passes.push(out.report);
    Ok(finish(report, start))
}

/// Finish a run whose result needed no growth.
fn finish_direct(
    sink: Option<Box<dyn KeySink>>,
    keys: &[Key],
    mut report: DriverReport,
    start: Instant,
) -> Result<DriverReport, RunError> {
    if let Some(mut sink) = sink {
        if !keys.is_empty() {
            sink.write_batch(keys)?;
        }
        sink.write_final_count(keys.len() as u64)?;
        sink.finish()?;
    }
    report.count = keys.len() as u64;
    Ok(finish(report, start))
}

fn finish(mut report: DriverReport, start: Instant) -> DriverReport {
    report.elapsed = start.elapsed();
    info!(
        length = report.target_length,
        count = report.count,
        elapsed_s = report.elapsed.as_secs_f64(),
        "enumeration finished"
    );
    report
}
