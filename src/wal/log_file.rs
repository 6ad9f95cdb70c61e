//! Write-Ahead Log Module
//!
//! Append-only JSON-lines file with sequential replay and an atomic
//! rewrite-and-swap used by compaction.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

use crate::cache::current_timestamp_ms;
use crate::error::{Result, StoreError};
use crate::wal::LogRecord;

// == Replay Result ==
/// Outcome of reading the whole log from the start.
#[derive(Debug, Default)]
pub struct Replay {
    /// Decoded records in file order
    pub records: Vec<LogRecord>,
    /// Non-blank lines read, corrupt ones included
    pub lines: usize,
    /// Lines skipped because they failed to decode
    pub skipped: usize,
}

/// Result of swapping a rewritten log into place.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// Where the previous log now lives
    pub backup: PathBuf,
    /// Lines written to the new log
    pub lines: usize,
}

// == Write-Ahead Log ==
#[derive(Debug, Clone)]
pub struct WriteAheadLog {
    path: PathBuf,
    fsync: bool,
}

impl WriteAheadLog {
    // == Constructor ==
    /// Creates a handle for the log at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fsync: true,
        }
    }

    /// Controls whether each append is followed by `sync_data`.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the scratch file compaction writes before swapping.
    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    pub async fn exists(&self) -> Result<bool> {
        fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::io("stat", self.path.display().to_string(), e))
    }

    // == Directory Setup ==
    /// Creates the directory containing the log if it is missing.
    pub async fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io("create_dir", dir.display().to_string(), e)),
            _ => Ok(()),
        }
    }

    // == Seal Torn Tail ==
    /// Terminates a trailing partial line left by an interrupted write.
    ///
    /// Without the newline the next append would be glued onto the torn
    /// fragment and become unreadable too. Returns true if a newline was added.
    pub async fn seal_torn_tail(&self) -> Result<bool> {
        let target = || self.path.display().to_string();

        let mut file = match OpenOptions::new().read(true).append(true).open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io("open", target(), e)),
        };

        let len = file
            .metadata()
            .await
            .map_err(|e| StoreError::io("stat", target(), e))?
            .len();
        if len == 0 {
            return Ok(false);
        }

        file.seek(std::io::SeekFrom::Start(len - 1))
            .await
            .map_err(|e| StoreError::io("seek", target(), e))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)
            .await
            .map_err(|e| StoreError::io("read", target(), e))?;
        if last[0] == b'\n' {
            return Ok(false);
        }

        warn!(path = %self.path.display(), "log ends with a partial line, sealing it");
        file.write_all(b"\n")
            .await
            .map_err(|e| StoreError::io("seal", target(), e))?;
        file.sync_data()
            .await
            .map_err(|e| StoreError::io("seal", target(), e))?;
        Ok(true)
    }

    // == Append ==
    /// Appends one record as a newline-terminated line.
    pub async fn append(&self, record: &LogRecord) -> Result<()> {
        let target = || format!("key '{}'", record.key);

        let mut line = record.encode()?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::io("append", target(), e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::io("append", target(), e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io("append", target(), e))?;
        if self.fsync {
            file.sync_data()
                .await
                .map_err(|e| StoreError::io("append", target(), e))?;
        }

        debug!(key = %record.key, action = ?record.action(), "appended log record");
        Ok(())
    }

    // == Replay All ==
    /// Reads every record from the start of the file, in file order.
    ///
    /// A missing file replays as empty. Lines that fail to decode are
    /// skipped with a warning.
    pub async fn replay_all(&self) -> Result<Replay> {
        let target = || self.path.display().to_string();

        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Replay::default()),
            Err(e) => return Err(StoreError::io("replay", target(), e)),
        };

        let mut replay = Replay::default();
        let mut lines = BufReader::new(file).split(b'\n');
        let mut line_no = 0usize;

        while let Some(raw) = lines
            .next_segment()
            .await
            .map_err(|e| StoreError::io("replay", target(), e))?
        {
            line_no += 1;

            let text = match std::str::from_utf8(&raw) {
                Ok(text) => text,
                Err(e) => {
                    replay.lines += 1;
                    replay.skipped += 1;
                    warn!(line = line_no, error = %e, "skipping log line with invalid UTF-8");
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            replay.lines += 1;

            match LogRecord::decode(text, line_no) {
                Ok(record) => replay.records.push(record),
                Err(e) => {
                    replay.skipped += 1;
                    warn!(line = line_no, error = %e, "skipping malformed log entry");
                }
            }
        }

        Ok(replay)
    }

    // == Count Lines ==
    /// Number of non-blank lines currently in the log.
    pub async fn count_lines(&self) -> Result<usize> {
        let target = || self.path.display().to_string();

        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io("count", target(), e)),
        };

        let mut lines = BufReader::new(file).split(b'\n');
        let mut count = 0usize;
        while let Some(raw) = lines
            .next_segment()
            .await
            .map_err(|e| StoreError::io("count", target(), e))?
        {
            if !raw.iter().all(u8::is_ascii_whitespace) {
                count += 1;
            }
        }
        Ok(count)
    }

    // == Rewrite And Swap ==
    /// Replaces the log with `records`.
    ///
    /// The records go to a temp file first. Only once it is fully written
    /// and synced is the current log renamed to a timestamped backup and the
    /// temp file renamed into its place. On any failure the current log is
    /// left at its path and the temp file is removed.
    pub async fn replace_with(&self, records: &[LogRecord]) -> Result<SwapOutcome> {
        let temp = self.temp_path();

        if let Err(e) = self.write_file(&temp, records).await {
            discard(&temp).await;
            return Err(e);
        }

        let backup = match self.backup_path().await {
            Ok(backup) => backup,
            Err(e) => {
                discard(&temp).await;
                return Err(e);
            }
        };
        if let Err(e) = fs::rename(&self.path, &backup).await {
            discard(&temp).await;
            return Err(StoreError::io("backup", self.path.display().to_string(), e));
        }

        if let Err(e) = self.install(&temp, &backup).await {
            discard(&temp).await;
            return Err(e);
        }

        Ok(SwapOutcome {
            backup,
            lines: records.len(),
        })
    }

    /// Renames `temp` onto the log path. If that fails the backup is moved
    /// back so the store is never left without a log.
    async fn install(&self, temp: &Path, backup: &Path) -> Result<()> {
        let Err(e) = fs::rename(temp, &self.path).await else {
            return Ok(());
        };
        if let Err(restore) = fs::rename(backup, &self.path).await {
            warn!(
                backup = %backup.display(),
                error = %restore,
                "failed to restore log from backup"
            );
        }
        Err(StoreError::io("swap", self.path.display().to_string(), e))
    }

    async fn write_file(&self, path: &Path, records: &[LogRecord]) -> Result<()> {
        let target = || path.display().to_string();

        let file = File::create(path)
            .await
            .map_err(|e| StoreError::io("compact", target(), e))?;
        let mut writer = BufWriter::new(file);

        for record in records {
            let mut line = record.encode()?;
            line.push('\n');
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(|e| StoreError::io("compact", target(), e))?;
        }

        writer
            .flush()
            .await
            .map_err(|e| StoreError::io("compact", target(), e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| StoreError::io("compact", target(), e))?;
        Ok(())
    }

    /// `<log>.backup.<unix millis>`, with a counter appended if taken.
    async fn backup_path(&self) -> Result<PathBuf> {
        let base = with_suffix(&self.path, &format!(".backup.{}", current_timestamp_ms()));
        let mut candidate = base.clone();
        let mut n = 1;
        while fs::try_exists(&candidate)
            .await
            .map_err(|e| StoreError::io("backup", candidate.display().to_string(), e))?
        {
            candidate = with_suffix(&base, &format!(".{n}"));
            n += 1;
        }
        Ok(candidate)
    }
}

// == Helpers ==
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove temp log");
        }
    }
}
