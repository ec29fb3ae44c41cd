// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use clap::Parser;
use cli::{Cli, Commands};
use querylog_core::config::LoggerConfig;
use querylog_core::router::Stream;
use querylog_core::{QueryWriter, SqlLogger};

mod cli;
mod ingest;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Cli::parse();

    logging::init(args.verbose)?;

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_BIN_NAME"), querylog_core::version());
        }
        Commands::Check { config } => check(config.as_deref())?,
        Commands::Ingest { config, input } => ingest(config.as_deref(), input.as_deref())?,
    }

    Ok(())
}

fn check(config: Option<&Path>) -> Result<()> {
    let config = LoggerConfig::load(config)?;
    let writer = QueryWriter::from_config(config)?;
    let router = writer.router();

    println!("directory: {}", router.directory().display());
    for stream in [Stream::AllQueries, Stream::SlowQueries] {
        let route = router.resolve(stream, 1);
        println!("{stream}: {} ({:?} on first query)", route.path.display(), route.mode);
    }
    println!(
        "alerts: {}",
        if writer.config().slack.is_some() {
            "slack"
        } else {
            "disabled"
        }
    );

    Ok(())
}

fn ingest(config: Option<&Path>, input: Option<&Path>) -> Result<()> {
    let config = LoggerConfig::load(config)?;
    let logger = SqlLogger::new(QueryWriter::from_config(config)?);

    let summary = match input {
        Some(path) => ingest::run(&logger, BufReader::new(File::open(path)?))?,
        None => ingest::run(&logger, io::stdin().lock())?,
    };

    println!("{summary}");

    if summary.rejected > 0 {
        return Err(Error::Custom(format!(
            "{} event(s) rejected",
            summary.rejected
        )));
    }
    Ok(())
}
