use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console logging for the `tracing` macros used across routekit.
///
/// # Configuration
///
/// - **Log Level**: `LOG_LEVEL` (default: "info"), applied to the routekit crates
/// - **Filtering**: `RUST_LOG` overrides the whole filter when set
/// - **Format**: compact, with module targets, file and line
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "routekit={lvl},routekit_auth={lvl},routekit_cache={lvl},routekit_observability={lvl},tower_http=warn,hyper=warn",
            lvl = log_level
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
