//! Access/error log configuration.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: preset name or `:token` template (default: `combined`)
//! - `LOG_SIZE`: size threshold such as `10M`, `512K`, `1G` (default: `10M`)
//! - `LOG_INTERVAL`: rotation interval `<n><s|m|h|d>` or `never` (default: `1d`)
//! - `LOG_MAX_FILES`: number of compressed segments kept, `0` keeps all (default: `10`)
//! - `LOG_FOLDER`: log directory (default: `<cwd>/logs`)
//!
//! Values that are present but malformed are rejected with a
//! [`ConfigError`] instead of silently falling back.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use routekit_core::ConfigError;

/// How often the active log segment is rolled over.
///
/// Periods are aligned on multiples of the interval since the Unix epoch,
/// so `1d` rolls at UTC midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogInterval {
    Every(Duration),
    Never,
}

impl LogInterval {
    pub const DAILY: Self = Self::Every(Duration::from_secs(24 * 60 * 60));

    /// Parses `<n><unit>` with unit `s`, `m`, `h` or `d` (`n` defaults to
    /// 1), or `never`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("never") {
            return Ok(Self::Never);
        }

        let Some((unit_at, unit)) = value.char_indices().last() else {
            return Err(ConfigError::invalid("LOG_INTERVAL", value, "expected <n><unit>"));
        };
        let unit_secs: u64 = match unit {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => {
                return Err(ConfigError::invalid(
                    "LOG_INTERVAL",
                    value,
                    "unit must be one of s, m, h, d",
                ));
            }
        };

        let count = &value[..unit_at];
        let count = if count.is_empty() {
            1
        } else {
            count
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid("LOG_INTERVAL", value, "expected <n><unit>"))?
        };

        count
            .checked_mul(unit_secs)
            .filter(|secs| *secs > 0)
            .map(|secs| Self::Every(Duration::from_secs(secs)))
            .ok_or_else(|| ConfigError::invalid("LOG_INTERVAL", value, "expected a positive interval"))
    }

    pub fn period(&self) -> Option<Duration> {
        match self {
            Self::Every(period) => Some(*period),
            Self::Never => None,
        }
    }
}

impl fmt::Display for LogInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = match self {
            Self::Never => return f.write_str("never"),
            Self::Every(period) => period.as_secs(),
        };
        match secs {
            s if s % (24 * 60 * 60) == 0 => write!(f, "{}d", s / (24 * 60 * 60)),
            s if s % (60 * 60) == 0 => write!(f, "{}h", s / (60 * 60)),
            s if s % 60 == 0 => write!(f, "{}m", s / 60),
            s => write!(f, "{}s", s),
        }
    }
}

/// Parses sizes like `10M`, `512K`, `1G`, `2048B` or a bare byte count.
pub fn parse_size(value: &str) -> Result<u64, ConfigError> {
    let trimmed = value.trim();
    let upper = trimmed.to_ascii_uppercase();
    let (digits, multiplier) = match upper.chars().last() {
        Some('B') => (&upper[..upper.len() - 1], 1),
        Some('K') => (&upper[..upper.len() - 1], 1024),
        Some('M') => (&upper[..upper.len() - 1], 1024 * 1024),
        Some('G') => (&upper[..upper.len() - 1], 1024 * 1024 * 1024),
        Some(c) if c.is_ascii_digit() => (upper.as_str(), 1),
        _ => return Err(ConfigError::invalid("LOG_SIZE", value, "expected <n>[B|K|M|G]")),
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::invalid("LOG_SIZE", value, "expected a positive size"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub format: String,
    pub max_size_bytes: u64,
    pub interval: LogInterval,
    pub max_files: usize,
    pub directory: PathBuf,
}

impl LogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let format = env::var("LOG_FORMAT").unwrap_or(defaults.format);
        let max_size_bytes = match env::var("LOG_SIZE") {
            Ok(v) => parse_size(&v)?,
            Err(_) => defaults.max_size_bytes,
        };
        let interval = match env::var("LOG_INTERVAL") {
            Ok(v) => LogInterval::parse(&v)?,
            Err(_) => defaults.interval,
        };
        let max_files = match env::var("LOG_MAX_FILES") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("LOG_MAX_FILES", v, "expected an integer"))?,
            Err(_) => defaults.max_files,
        };
        let directory = env::var("LOG_FOLDER")
            .map(PathBuf::from)
            .unwrap_or(defaults.directory);

        Ok(Self {
            format,
            max_size_bytes,
            interval,
            max_files,
            directory,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: "combined".to_string(),
            max_size_bytes: 10 * 1024 * 1024,
            interval: LogInterval::DAILY,
            max_files: 10,
            directory: env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("logs"),
        }
    }
}
