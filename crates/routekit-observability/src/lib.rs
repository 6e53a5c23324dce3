//! Routekit Observability
//!
//! - [`stream`]: the logging stream provider ([`get_file_stream`]) writing
//!   `<kind>-current.log` with size/time rotation into gzipped segments
//! - [`format`]: morgan-style log-line templates ([`LogFormat`])
//! - [`access_log`]: the status-partitioned access/error logging middleware
//! - [`request_trace`]: per-request `tracing` events with a request id
//! - [`basic_logging`]: console subscriber initialisation
//!
//! # Examples
//!
//! ```no_run
//! use routekit_config::LogConfig;
//! use routekit_observability::{LogKind, get_file_stream, init_basic_console_logging};
//!
//! init_basic_console_logging();
//! let config = LogConfig::default();
//! let access = get_file_stream(LogKind::Access, None, &config).unwrap();
//! access.write_line("hello").unwrap();
//! ```

pub mod access_log;
pub mod basic_logging;
pub mod format;
pub mod request_trace;
mod rotate;
pub mod stream;

pub use access_log::{access_and_error_logs, access_log};
pub use basic_logging::init_basic_console_logging;
pub use format::{LogFormat, LogRecord};
pub use request_trace::trace_requests;
pub use stream::{LogKind, LogStream, get_file_stream};
