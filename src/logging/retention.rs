//! Backup file retention
//!
//! Rotated files are named `<stem>-<timestamp>.log`, optionally followed by
//! `.gz` once compressed. Retention prunes them by count and by the age encoded
//! in the name, then compresses whatever is left uncompressed.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;

use super::file_writer::RotationPolicy;

/// Timestamp embedded in backup names
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

const LOG_EXTENSION: &str = ".log";
const GZ_EXTENSION: &str = ".gz";

/// A rotated-out log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Full path to the backup
    pub path: PathBuf,
    /// Rotation time taken from the file name
    pub rotated_at: DateTime<Utc>,
    /// Whether the backup has already been gzip-compressed
    pub compressed: bool,
}

/// Build the file name for a backup of `stem` rotated at `rotated_at`
pub fn backup_file_name(stem: &str, rotated_at: DateTime<Utc>) -> String {
    format!(
        "{}-{}{}",
        stem,
        rotated_at.format(BACKUP_TIME_FORMAT),
        LOG_EXTENSION
    )
}

/// Parse a file name as a backup of `stem`
///
/// Returns `None` for anything that is not `<stem>-<timestamp>.log[.gz]`.
fn parse_backup_name(name: &str, stem: &str) -> Option<(DateTime<Utc>, bool)> {
    let rest = name.strip_prefix(stem)?.strip_prefix('-')?;
    let (rest, compressed) = match rest.strip_suffix(GZ_EXTENSION) {
        Some(rest) => (rest, true),
        None => (rest, false),
    };
    let timestamp = rest.strip_suffix(LOG_EXTENSION)?;
    let naive = NaiveDateTime::parse_from_str(timestamp, BACKUP_TIME_FORMAT).ok()?;
    Some((naive.and_utc(), compressed))
}

/// List backups of `stem` in `dir`, newest first
pub fn list_backups(dir: &Path, stem: &str) -> Result<Vec<Backup>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir).context("Failed to read log directory")? {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((rotated_at, compressed)) = parse_backup_name(name, stem) else {
            continue;
        };

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            backups.push(Backup {
                path,
                rotated_at,
                compressed,
            });
        }
    }

    backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at).then(b.path.cmp(&a.path)));
    Ok(backups)
}

/// Apply the retention part of `policy` to the backups of `stem` in `dir`
///
/// Keeps the newest `max_backups` (all when zero), then drops backups older
/// than `max_age_days` (no age limit when zero), then compresses the survivors
/// if requested. Returns the number of files deleted.
pub fn enforce_retention(dir: &Path, stem: &str, policy: &RotationPolicy) -> Result<usize> {
    let mut backups = list_backups(dir, stem)?;
    let mut deleted_count = 0;

    let mut expired = Vec::new();
    if policy.max_backups > 0 && backups.len() > policy.max_backups {
        expired.extend(backups.split_off(policy.max_backups));
    }

    if policy.max_age_days > 0 {
        let cutoff = i64::try_from(policy.max_age_days)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let (keep, old): (Vec<_>, Vec<_>) =
            backups.into_iter().partition(|b| b.rotated_at >= cutoff);
        backups = keep;
        expired.extend(old);
    }

    for backup in &expired {
        if fs::remove_file(&backup.path).is_ok() {
            deleted_count += 1;
        }
    }

    if policy.compress {
        for backup in backups.iter().filter(|b| !b.compressed) {
            // A failed compression leaves the plain backup for the next pass
            let _ = compress_file(&backup.path);
        }
    }

    Ok(deleted_count)
}

/// Gzip `path` to `<path>.gz` and remove the original
pub fn compress_file(path: &Path) -> Result<PathBuf> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(GZ_EXTENSION);
    let gz_path = PathBuf::from(gz_name);

    let source = File::open(path).context("Failed to open backup for compression")?;
    let target = File::create(&gz_path).context("Failed to create compressed backup")?;

    let mut encoder = GzEncoder::new(target, Compression::default());
    let copied = io::copy(&mut BufReader::new(source), &mut encoder)
        .and_then(|_| encoder.finish().map(|_| ()));
    if let Err(e) = copied {
        let _ = fs::remove_file(&gz_path);
        return Err(e).context("Failed to compress backup");
    }

    fs::remove_file(path).context("Failed to remove compressed backup source")?;
    Ok(gz_path)
}
