//! Tracing initialization.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Selects the log line format: `compact` (default) or `json`.
pub const LOG_FORMAT_ENV: &str = "RDOC_LOG_FORMAT";

/// HTTP and Redis client internals are only interesting when asked for.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "redis=warn"];

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

fn filter(default_level: tracing::Level) -> EnvFilter {
    QUIET_TARGETS.iter().fold(
        EnvFilter::from_default_env().add_directive(default_level.into()),
        |filter, target| match target.parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        },
    )
}

/// Initialize tracing. Safe to call multiple times.
///
/// Output goes to stderr; stdout carries the MCP protocol. Under a test
/// harness the level defaults to DEBUG and output goes to the test writer.
pub fn init() {
    INIT.call_once(|| {
        let is_test =
            std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok();
        let level = if is_test {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter(level))
            .with_ansi(false)
            .with_target(true);

        let result = match (format, is_test) {
            (LogFormat::Json, _) => builder.json().with_writer(std::io::stderr).try_init(),
            (LogFormat::Compact, true) => builder.compact().with_test_writer().try_init(),
            (LogFormat::Compact, false) => builder.compact().with_writer(std::io::stderr).try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e)
        }
    });
}
