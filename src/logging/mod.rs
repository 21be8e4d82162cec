//! Logging facade
//!
//! Leveled logging functions over `tracing`, writing to the console and to a
//! size-rotated log file with count and age based retention.

#[cfg(test)]
mod capture;
mod file_writer;
mod format;
mod level;
mod logger;
#[doc(hidden)]
pub mod macros;
mod retention;
mod tags;

pub use file_writer::{RotatingFile, RotationPolicy, SharedRotatingFile};
pub use format::RecordFormat;
pub use level::{Level, ParseLevelError};
pub use logger::{Logger, LoggerBuilder, TARGET};
pub use retention::{compress_file, enforce_retention, list_backups, Backup};
pub use tags::Tag;
