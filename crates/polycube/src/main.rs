use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polycube::cli::{Cli, Outcome};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage errors print and exit cleanly.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    match cli.run()? {
        Outcome::OutOfRange(message) => println!("{message}"),
        Outcome::Finished(report) => {
            println!("{} polycubes found of length {}", report.count, cli.n);
            println!("{:.0} seconds elapsed", report.elapsed.as_secs_f64());
        }
    }
    Ok(())
}
