//! The logging facade
//!
//! A [`Logger`] is built once by the host's startup code and handed to the
//! components that log. Clones are cheap and share the same sinks. Every
//! record goes to the console and, when configured, to a rotating file.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use tracing::{Dispatch, Metadata};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use super::file_writer::{RotatingFile, SharedRotatingFile};
use super::format::{self, RecordFormat, FATAL_TARGET};
use super::level::Level;
use crate::config::LogConfig;
use crate::error::InitError;

/// Target of every event emitted through the facade
pub const TARGET: &str = "applog";

/// Handle to the configured sinks
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    level: Level,
    caller: bool,
    dispatch: Dispatch,
    file: Option<SharedRotatingFile>,
}

impl Logger {
    /// Start building a logger by hand
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a logger from the `log.*` configuration
    ///
    /// Creates the log folder when file logging is enabled.
    pub fn from_config(config: &LogConfig) -> Result<Self, InitError> {
        Ok(LoggerBuilder::from_config(config)?.build())
    }

    /// Like [`Logger::from_config`], but a setup failure terminates the
    /// process with a diagnostic on stderr
    pub fn init_or_exit(config: &LogConfig) -> Self {
        match Self::from_config(config) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    /// Minimum level records must reach to be written
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// Whether a record at `level` would be written
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.level
    }

    /// Path of the active log file, if file logging is on
    pub fn log_file(&self) -> Option<&Path> {
        self.inner.file.as_ref().map(|f| f.path())
    }

    /// Also route plain `tracing` events from the rest of the process to
    /// these sinks
    ///
    /// Only one global subscriber can exist per process.
    pub fn install(&self) -> Result<(), InitError> {
        tracing::dispatcher::set_global_default(self.inner.dispatch.clone())
            .map_err(|_| InitError::AlreadyInstalled)
    }

    /// Flush console and file sinks
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        if let Some(file) = &self.inner.file {
            let _ = file.flush();
        }
    }

    /// Flush everything before the process exits
    pub fn shutdown(self) {
        self.flush();
    }

    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::Trace, &message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::Debug, &message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, &message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::Warn, &message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, &message);
    }

    /// Log at fatal level, flush, and exit with status 1
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.emit(Level::Fatal, &message);
        self.exit()
    }

    #[track_caller]
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, &args);
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, &args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, &args);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, &args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, &args);
    }

    /// Formatted [`Logger::fatal`]
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit(Level::Fatal, &args);
        self.exit()
    }

    /// Log at a level chosen at runtime
    ///
    /// `Level::Fatal` exits the process like [`Logger::fatal`].
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, &message);
        if level == Level::Fatal {
            self.exit();
        }
    }

    /// Formatted [`Logger::log`]
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        self.log(level, args);
    }

    #[track_caller]
    fn emit(&self, level: Level, message: &dyn fmt::Display) {
        if !self.enabled(level) {
            return;
        }

        let location = Location::caller();
        let (file, line) = if self.inner.caller {
            (Some(base_name(location.file())), Some(location.line()))
        } else {
            (None, None)
        };

        let stamp = format::timestamp();
        let stamp = stamp.as_str();

        tracing::dispatcher::with_default(&self.inner.dispatch, || match level {
            Level::Trace => {
                tracing::trace!(target: TARGET, { applog.timestamp = stamp, file, line }, "{}", message)
            }
            Level::Debug => {
                tracing::debug!(target: TARGET, { applog.timestamp = stamp, file, line }, "{}", message)
            }
            Level::Info => {
                tracing::info!(target: TARGET, { applog.timestamp = stamp, file, line }, "{}", message)
            }
            Level::Warn => {
                tracing::warn!(target: TARGET, { applog.timestamp = stamp, file, line }, "{}", message)
            }
            Level::Error => {
                tracing::error!(target: TARGET, { applog.timestamp = stamp, file, line }, "{}", message)
            }
            Level::Fatal => tracing::error!(
                target: FATAL_TARGET,
                { applog.timestamp = stamp, file, line },
                "{}",
                message
            ),
        });
    }

    fn exit(&self) -> ! {
        self.flush();
        std::process::exit(1)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.inner.level)
            .field("caller", &self.inner.caller)
            .field("log_file", &self.log_file())
            .finish()
    }
}

/// Global filter applied at fatal level, where plain `ERROR` events are below
/// the minimum
fn is_fatal_record(metadata: &Metadata<'_>) -> bool {
    metadata.target() == FATAL_TARGET
}

/// Base name of a source path, as reported in the `file` field
fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Assembles the sinks of a [`Logger`]
pub struct LoggerBuilder {
    level: Level,
    caller: bool,
    console: BoxMakeWriter,
    file: Option<SharedRotatingFile>,
}

impl LoggerBuilder {
    /// Info level, caller capture on, console on stdout, no file
    pub fn new() -> Self {
        Self {
            level: Level::default(),
            caller: true,
            console: BoxMakeWriter::new(io::stdout),
            file: None,
        }
    }

    /// Builder preloaded from the `log.*` configuration
    ///
    /// When file logging is enabled this creates the log folder and opens the
    /// log file. With it disabled nothing on disk is touched.
    pub fn from_config(config: &LogConfig) -> Result<Self, InitError> {
        let builder = Self::new()
            .with_level(config.min_level())
            .with_caller(config.caller);

        if !config.file.enable {
            return Ok(builder);
        }

        let folder = config.folder_path();
        fs::create_dir_all(&folder).map_err(|source| InitError::CreateFolder {
            path: folder.clone(),
            source,
        })?;

        let file_name = config.file_name();
        let file = RotatingFile::open(&folder, &file_name, config.rotation_policy()).map_err(
            |source| InitError::OpenFile {
                path: folder.join(&file_name),
                source,
            },
        )?;

        Ok(builder.with_file(file))
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Attach the caller's file base name and line to every record
    pub fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Replace stdout as the console sink
    pub fn with_console<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = BoxMakeWriter::new(writer);
        self
    }

    /// Add a rotating file sink
    pub fn with_file(mut self, file: RotatingFile) -> Self {
        self.file = Some(SharedRotatingFile::new(file));
        self
    }

    pub fn build(self) -> Logger {
        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(RecordFormat)
            .with_writer(self.console);
        let file_layer = self.file.clone().map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(RecordFormat)
                .with_writer(file)
        });

        let fatal_only = (self.level == Level::Fatal).then(|| filter_fn(is_fatal_record));

        let subscriber = tracing_subscriber::registry()
            .with(self.level.as_level_filter())
            .with(fatal_only)
            .with(console_layer)
            .with(file_layer);

        Logger {
            inner: Arc::new(Inner {
                level: self.level,
                caller: self.caller,
                dispatch: Dispatch::new(subscriber),
                file: self.file,
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("level", &self.level)
            .field("caller", &self.caller)
            .field("file", &self.file.as_ref().map(|f| f.path()))
            .finish()
    }
}
