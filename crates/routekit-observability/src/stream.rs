//! Logging stream provider.
//!
//! Each stream writes plain-text lines to `<kind>-current.log` inside the
//! log directory. The active file is rotated on `LOG_SIZE`, on
//! `LOG_INTERVAL` and once at startup; retired segments are gzipped to
//! `<kind>-<date>[.<n>].log.gz` and at most `LOG_MAX_FILES` of them are kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::info;

use routekit_config::LogConfig;
use routekit_core::ConfigError;

use crate::rotate::{RotatingFile, RotationPolicy};

/// Which log a stream feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogKind {
    Access,
    Error,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Error => "error",
        }
    }

    /// Whether a response with `status` belongs in this log.
    ///
    /// The access log keeps statuses up to 301, the error log keeps 301 and
    /// above; a 301 is written to both.
    pub fn records(&self, status: u16) -> bool {
        match self {
            Self::Access => status <= 301,
            Self::Error => status >= 301,
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rotating line sink. Clones write to the same file.
#[derive(Clone)]
pub struct LogStream {
    kind: LogKind,
    directory: PathBuf,
    writer: Arc<Mutex<RotatingFile>>,
}

impl LogStream {
    pub fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Appends `line` and a newline, then flushes. Rotation happens inside
    /// the call when a threshold is crossed.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_line(line, Utc::now())
    }

    /// Path of the segment currently written to.
    pub fn active_path(&self) -> PathBuf {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active_path()
    }
}

impl std::fmt::Debug for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("kind", &self.kind)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

/// Opens the `kind` stream under `directory`, or under `config.directory`
/// when none is given. The directory is created if needed.
pub fn get_file_stream(
    kind: LogKind,
    directory: Option<&Path>,
    config: &LogConfig,
) -> Result<LogStream, ConfigError> {
    let directory = directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.directory.clone());
    fs::create_dir_all(&directory)?;

    let policy = RotationPolicy {
        max_size_bytes: config.max_size_bytes,
        interval: config.interval.period(),
        max_files: config.max_files,
    };
    let file = RotatingFile::open(&directory, kind.as_str(), policy, Utc::now())
        .map_err(|e| ConfigError::LogStream(format!("{} log: {}", kind, e)))?;

    info!(
        log.kind = %kind,
        log.directory = %directory.display(),
        log.interval = %config.interval,
        log.max_files = config.max_files,
        log.max_size_bytes = config.max_size_bytes,
        "Log stream opened"
    );

    Ok(LogStream {
        kind,
        directory,
        writer: Arc::new(Mutex::new(file)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use routekit_config::LogInterval;

    fn never_rotating(dir: &Path) -> LogConfig {
        LogConfig {
            interval: LogInterval::Never,
            directory: dir.to_path_buf(),
            ..LogConfig::default()
        }
    }

    #[test]
    fn test_partition_boundaries() {
        assert!(LogKind::Access.records(200));
        assert!(LogKind::Access.records(301));
        assert!(!LogKind::Access.records(302));
        assert!(!LogKind::Access.records(404));

        assert!(!LogKind::Error.records(200));
        assert!(!LogKind::Error.records(300));
        assert!(LogKind::Error.records(301));
        assert!(LogKind::Error.records(500));
    }

    #[test]
    fn test_stream_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let stream = get_file_stream(LogKind::Error, None, &never_rotating(dir.path())).unwrap();
        stream.write_line("boom").unwrap();

        assert_eq!(stream.active_path(), dir.path().join("error-current.log"));
        let written = fs::read_to_string(dir.path().join("error-current.log")).unwrap();
        assert_eq!(written, "boom\n");
    }

    #[test]
    fn test_explicit_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("logs");
        let config = never_rotating(dir.path());

        let stream = get_file_stream(LogKind::Access, Some(&nested), &config).unwrap();
        stream.write_line("one").unwrap();
        stream.clone().write_line("two").unwrap();

        assert_eq!(stream.directory(), nested.as_path());
        let written = fs::read_to_string(nested.join("access-current.log")).unwrap();
        assert_eq!(written, "one\ntwo\n");
    }

    #[test]
    fn test_size_limit_rotates_into_gzip_segment() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            max_size_bytes: 64,
            ..never_rotating(dir.path())
        };
        let stream = get_file_stream(LogKind::Access, None, &config).unwrap();

        for n in 0..10 {
            stream.write_line(&format!("GET /items/{} 200", n)).unwrap();
        }

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(names.iter().any(|n| n == "access-current.log"));
        assert!(
            names
                .iter()
                .any(|n| n.starts_with("access-") && n.ends_with(".log.gz"))
        );
        assert!(fs::metadata(stream.active_path()).unwrap().len() < 64);
    }
}
