//! applog - leveled logging facade with console and rotating file output
//!
//! Build a [`Logger`] once at startup from the `log.*` configuration and pass
//! it to whatever needs to log.
//!
//! ```no_run
//! use applog::{Config, Logger};
//!
//! let config = Config::load("config.toml".as_ref()).unwrap_or_default();
//! let logger = Logger::init_or_exit(&config.log);
//!
//! applog::info!(logger, "listening on", 8080);
//! applog::warnf!(logger, "retrying in {}s", 5);
//! logger.shutdown();
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, FileConfig, LogConfig};
pub use error::InitError;
pub use logging::{
    Level, Logger, LoggerBuilder, ParseLevelError, RotatingFile, RotationPolicy, Tag,
};
