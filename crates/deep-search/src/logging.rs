use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Map a `LOG_LEVEL` value (ERROR|WARN|INFO|DEBUG, any case) to a filter.
/// Unknown or missing values fall back to INFO.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
        Some("ERROR") => LevelFilter::ERROR,
        Some("WARN" | "WARNING") => LevelFilter::WARN,
        Some("DEBUG") => LevelFilter::DEBUG,
        _ => LevelFilter::INFO,
    }
}

/// `RUST_LOG` wins when it is set and parses; otherwise `LOG_LEVEL` decides.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_from(std::env::var(LOG_LEVEL_VAR).ok().as_deref());
        EnvFilter::default().add_directive(level.into())
    })
}

/// Install the process-wide subscriber. Logs always go to stderr: stdout carries the
/// MCP transport in server mode and the payload in CLI mode.
///
/// Call once, after the env file has been loaded (it may set `LOG_LEVEL`).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter_from_env())
        .with_target(false)
        .try_init();
}

/// Span handed to the dispatcher; tags every event with the calling front end.
pub fn root_span(surface: &'static str) -> tracing::Span {
    tracing::info_span!("deep_search", surface)
}
