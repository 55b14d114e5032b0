//! Command-line surface of the `polycube` binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polycube_core::MAX_LENGTH;
use polycube_engine::config::DEFAULT_SINGLE_THREAD_LENGTH;
use polycube_engine::{driver, DriverConfig, DriverReport};
use polycube_format::{create_sink, open_source, Compression, Format};
use tracing::info;

/// Smallest size worth enumerating from the command line.
pub const MIN_CLI_LENGTH: usize = 3;

/// Count the polycubes of a given size.
#[derive(Debug, Parser)]
#[command(name = "polycube")]
#[command(author, version, about = "Count the polycubes of a given size")]
pub struct Cli {
    /// Size of the polycubes to count
    pub n: usize,

    /// Worker threads for the parallel pass (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Cache file of smaller polycubes to grow from
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Encoding of the input file (default: from its extension)
    #[arg(long)]
    pub input_format: Option<Format>,

    /// File to write the polycubes of size n to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encoding of the output file (default: from its extension)
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Gzip-compress the output file
    #[arg(short = 'z', long)]
    pub compress: bool,

    /// Sizes up to this are grown on one thread first
    #[arg(long, default_value_t = DEFAULT_SINGLE_THREAD_LENGTH)]
    pub single_thread_length: usize,

    /// Disable remaining-time estimates
    #[arg(long)]
    pub no_progress: bool,
}

/// What a CLI invocation produced.
#[derive(Debug)]
pub enum Outcome {
    /// `n` was outside the supported range; nothing was run.
    OutOfRange(String),
    /// The enumeration completed.
    Finished(DriverReport),
}

impl Cli {
    /// Map the flags onto a [`DriverConfig`], opening any files.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = DriverConfig::new(self.n);
        config.threads = self.threads;
        config.single_thread_length = self.single_thread_length;
        config.progress = !self.no_progress;

        if let Some(path) = &self.input {
            let format = self.input_format.unwrap_or_else(|| Format::from_path(path));
            info!(path = %path.display(), %format, "starting file reader");
            let source = open_source(format, path)
                .with_context(|| format!("failed to open `{}` for reading", path.display()))?;
            config.source = Some(source);
        }
        if let Some(path) = &self.output {
            let format = self.format.unwrap_or_else(|| Format::from_path(path));
            let compression = if self.compress {
                Compression::Gzip
            } else {
                Compression::None
            };
            info!(path = %path.display(), %format, %compression, "starting file writer");
            let sink = create_sink(format, path, self.n, compression)
                .with_context(|| format!("failed to open `{}` for writing", path.display()))?;
            config.sink = Some(sink);
        }
        Ok(config)
    }

    /// Validate `n` and run the enumeration.
    pub fn run(&self) -> Result<Outcome> {
        if self.n < MIN_CLI_LENGTH {
            return Ok(Outcome::OutOfRange(format!(
                "Length must be at least {MIN_CLI_LENGTH}"
            )));
        }
        if self.n > MAX_LENGTH {
            return Ok(Outcome::OutOfRange(format!(
                "Length above {MAX_LENGTH} not supported"
            )));
        }
        let report = driver::run(self.driver_config()?)
            .with_context(|| format!("enumeration of size {} failed", self.n))?;
        Ok(Outcome::Finished(report))
    }
}
