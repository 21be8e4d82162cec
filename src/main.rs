use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use applog::{Config, Level, Logger, ParseLevelError};

#[derive(Parser)]
#[command(name = "applog")]
#[command(about = "Log messages through the configured console and rotating file sinks")]
struct Cli {
    /// Configuration file holding the [log] section
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Level to log at: trace, debug, info, warn, error or fatal
    #[arg(short, long, default_value = "info", value_parser = parse_level)]
    level: Level,

    /// Message words, joined by spaces; stdin lines are logged when omitted
    message: Vec<String>,
}

fn parse_level(value: &str) -> Result<Level, ParseLevelError> {
    value.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    // Exits with a diagnostic if the log folder cannot be created
    let logger = Logger::init_or_exit(&config.log);

    if cli.message.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if !line.trim().is_empty() {
                logger.log(cli.level, line);
            }
        }
    } else {
        logger.log(cli.level, cli.message.join(" "));
    }

    logger.shutdown();
    Ok(())
}
