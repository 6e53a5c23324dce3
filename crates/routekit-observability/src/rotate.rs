//! Size and time based rotation of one log file.
//!
//! The active segment is `{prefix}-current.log`. A segment is retired when it
//! reaches the size threshold, when its interval period ends, or at open time
//! if a non-empty segment was left behind. Retired segments are gzipped to
//! `{prefix}-{YYYY-MM-DD}[.{n}].log.gz`, dated by the day the segment started,
//! and only the newest `max_files` of them are kept.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use flate2::{Compression, write::GzEncoder};
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RotationPolicy {
    /// `0` disables size rotation.
    pub max_size_bytes: u64,
    pub interval: Option<Duration>,
    /// `0` keeps every compressed segment.
    pub max_files: usize,
}

pub(crate) struct RotatingFile {
    directory: PathBuf,
    prefix: &'static str,
    policy: RotationPolicy,
    writer: Option<RollingFileAppender>,
    size: u64,
    started: DateTime<Utc>,
}

impl RotatingFile {
    pub(crate) fn open(
        directory: &Path,
        prefix: &'static str,
        policy: RotationPolicy,
        now: DateTime<Utc>,
    ) -> io::Result<Self> {
        let mut file = Self {
            directory: directory.to_path_buf(),
            prefix,
            policy,
            writer: None,
            size: 0,
            started: period_start(now, policy.interval),
        };

        let leftover = fs::metadata(file.active_path()).ok().filter(|m| m.len() > 0);
        if let Some(meta) = leftover {
            let modified = meta.modified().map(DateTime::<Utc>::from).unwrap_or(now);
            file.started = period_start(modified, policy.interval);
            file.retire()?;
            file.started = period_start(now, policy.interval);
        }

        file.reopen()?;
        Ok(file)
    }

    pub(crate) fn active_path(&self) -> PathBuf {
        self.directory.join(format!("{}-current.log", self.prefix))
    }

    /// Appends `line` and a newline, rotating first if the period has
    /// ended and afterwards if the segment has grown past the threshold.
    pub(crate) fn write_line(&mut self, line: &str, now: DateTime<Utc>) -> io::Result<()> {
        if self.policy.interval.is_some() && period_start(now, self.policy.interval) > self.started {
            self.rotate(now)?;
        }

        let writer = self.writer()?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        self.size += line.len() as u64 + 1;

        if self.policy.max_size_bytes > 0 && self.size >= self.policy.max_size_bytes {
            self.rotate(now)?;
        }
        Ok(())
    }

    fn writer(&mut self) -> io::Result<&mut RollingFileAppender> {
        if self.writer.is_none() {
            self.reopen()?;
        }
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("log segment is closed"))
    }

    fn rotate(&mut self, now: DateTime<Utc>) -> io::Result<()> {
        if self.size > 0 {
            self.retire()?;
            self.reopen()?;
        }
        self.started = period_start(now, self.policy.interval);
        Ok(())
    }

    fn reopen(&mut self) -> io::Result<()> {
        let writer = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(format!("{}-current", self.prefix))
            .filename_suffix("log")
            .build(&self.directory)
            .map_err(|e| io::Error::other(e.to_string()))?;
        self.size = fs::metadata(self.active_path()).map(|m| m.len()).unwrap_or(0);
        self.writer = Some(writer);
        Ok(())
    }

    fn retire(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let active = self.active_path();
        let target = self.next_segment_path()?;
        debug!(from = %active.display(), to = %target.display(), "Rotating log segment");
        compress(&active, &target)?;
        fs::remove_file(&active)?;
        self.size = 0;

        self.prune()
    }

    /// The day's first segment has no index; later ones continue from the
    /// highest index still on disk.
    fn next_segment_path(&self) -> io::Result<PathBuf> {
        let day = self.started.date_naive();
        let last = self
            .segments()?
            .into_iter()
            .filter(|((date, _), _)| *date == day)
            .map(|((_, index), _)| index)
            .max();
        let name = match last {
            None => format!("{}-{}.log.gz", self.prefix, day.format("%Y-%m-%d")),
            Some(index) => format!(
                "{}-{}.{}.log.gz",
                self.prefix,
                day.format("%Y-%m-%d"),
                index + 1
            ),
        };
        Ok(self.directory.join(name))
    }

    fn segments(&self) -> io::Result<Vec<((NaiveDate, u64), PathBuf)>> {
        Ok(fs::read_dir(&self.directory)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let key = segment_key(entry.file_name().to_str()?, self.prefix)?;
                Some((key, entry.path()))
            })
            .collect())
    }

    fn prune(&self) -> io::Result<()> {
        if self.policy.max_files == 0 {
            return Ok(());
        }

        let mut segments = self.segments()?;
        if segments.len() <= self.policy.max_files {
            return Ok(());
        }

        segments.sort_by(|a, b| a.0.cmp(&b.0));
        let excess = segments.len() - self.policy.max_files;
        for (_, path) in segments.into_iter().take(excess) {
            debug!(path = %path.display(), "Removing old log segment");
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Start of the interval period containing `now`, aligned on the Unix
/// epoch. Without an interval a segment starts when it is opened.
fn period_start(now: DateTime<Utc>, interval: Option<Duration>) -> DateTime<Utc> {
    let Some(period) = interval else {
        return now;
    };
    let secs = i64::try_from(period.as_secs()).unwrap_or(i64::MAX).max(1);
    let start = now.timestamp().div_euclid(secs) * secs;
    DateTime::<Utc>::from_timestamp(start, 0).unwrap_or(now)
}

/// Sort key of a compressed segment name, `None` for anything else.
fn segment_key(name: &str, prefix: &str) -> Option<(NaiveDate, u64)> {
    let rest = name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".log.gz")?;
    let (date, index) = match rest.split_once('.') {
        Some((date, index)) => (date, index.parse().ok()?),
        None => (rest, 0),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, index))
}

fn compress(source: &Path, target: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut encoder = GzEncoder::new(File::create(target)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()
}
