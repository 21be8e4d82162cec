//! Size-rotated log file with tracing integration
//!
//! `RotatingFile` owns the active file handle. When a record would push the
//! file past the size limit, the file is renamed to a timestamped backup and a
//! fresh one is opened, after which retention runs over the backups.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing_subscriber::fmt::MakeWriter;

use super::retention::{backup_file_name, enforce_retention, list_backups};

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Rotation and retention parameters for the file sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes after which the file is rotated (0 disables rotation)
    pub max_size: u64,
    /// Number of backups to keep (0 keeps all)
    pub max_backups: usize,
    /// Age in days after which backups are deleted (0 keeps them forever)
    pub max_age_days: u64,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl RotationPolicy {
    /// Build a policy with the size limit given in megabytes
    pub fn from_megabytes(
        max_size_mb: u64,
        max_backups: usize,
        max_age_days: u64,
        compress: bool,
    ) -> Self {
        Self {
            max_size: max_size_mb.saturating_mul(BYTES_PER_MEGABYTE),
            max_backups,
            max_age_days,
            compress,
        }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::from_megabytes(10, 3, 28, true)
    }
}

/// Log file that rotates itself according to a [`RotationPolicy`]
#[derive(Debug)]
pub struct RotatingFile {
    dir: PathBuf,
    stem: String,
    path: PathBuf,
    file: Option<File>,
    size: u64,
    policy: RotationPolicy,
    last_rotated_at: Option<DateTime<Utc>>,
}

impl RotatingFile {
    /// Open (or create) `dir/file_name` for appending
    ///
    /// The directory must already exist. Retention runs once over any
    /// backups left by previous runs.
    pub fn open(
        dir: impl Into<PathBuf>,
        file_name: &str,
        policy: RotationPolicy,
    ) -> io::Result<Self> {
        let dir = dir.into();
        let path = dir.join(file_name);
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_string();

        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        let _ = enforce_retention(&dir, &stem, &policy);
        let last_rotated_at = list_backups(&dir, &stem)
            .ok()
            .and_then(|backups| backups.first().map(|b| b.rotated_at));

        Ok(Self {
            dir,
            stem,
            path,
            file: Some(file),
            size,
            policy,
            last_rotated_at,
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written to the active file so far
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Write one record, rotating first if it would not fit
    pub fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        if self.file.is_none() {
            let file = open_append(&self.path)?;
            self.size = file.metadata()?.len();
            self.file = Some(file);
        }

        let len = record.len() as u64;
        if self.policy.max_size > 0 && self.size > 0 && self.size + len > self.policy.max_size {
            self.rotate()?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(record)?;
            self.size += len;
        }
        Ok(())
    }

    /// Move the active file aside and start a new one
    pub fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        if self.path.exists() {
            let backup = self.next_backup_path();
            fs::rename(&self.path, backup)?;
        }

        self.file = Some(open_append(&self.path)?);
        self.size = 0;

        // Retention problems never block logging; the next rotation retries
        let _ = enforce_retention(&self.dir, &self.stem, &self.policy);
        Ok(())
    }

    /// Flush the active file and sync it to disk
    pub fn sync(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.flush()?;
                file.sync_data()
            }
            None => Ok(()),
        }
    }

    /// Backup names must sort strictly after every earlier backup, even when
    /// several rotations land in the same millisecond
    fn next_backup_path(&mut self) -> PathBuf {
        let mut rotated_at = Utc::now().trunc_subsecs(3);
        if let Some(last) = self.last_rotated_at {
            if rotated_at <= last {
                rotated_at = last + Duration::milliseconds(1);
            }
        }

        loop {
            let candidate = self.dir.join(backup_file_name(&self.stem, rotated_at));
            let mut compressed = candidate.clone().into_os_string();
            compressed.push(".gz");
            if !candidate.exists() && !Path::new(&compressed).exists() {
                self.last_rotated_at = Some(rotated_at);
                return candidate;
            }
            rotated_at += Duration::milliseconds(1);
        }
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Shared handle to a [`RotatingFile`], usable as a tracing writer
#[derive(Debug, Clone)]
pub struct SharedRotatingFile {
    inner: Arc<Mutex<RotatingFile>>,
    path: PathBuf,
}

impl SharedRotatingFile {
    pub fn new(file: RotatingFile) -> Self {
        let path = file.path().to_path_buf();
        Self {
            inner: Arc::new(Mutex::new(file)),
            path,
        }
    }

    /// Path of the active log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered data to disk
    pub fn flush(&self) -> io::Result<()> {
        match self.inner.lock() {
            Ok(mut file) => file.sync(),
            Err(_) => Ok(()),
        }
    }
}

/// Per-event writer handed out to tracing-subscriber
pub struct RotatingFileWriter {
    inner: Arc<Mutex<RotatingFile>>,
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Sink errors never reach the caller
        if let Ok(mut file) = self.inner.lock() {
            let _ = file.write_record(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Ok(mut file) = self.inner.lock() {
            let _ = file.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedRotatingFile {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingFileWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}
