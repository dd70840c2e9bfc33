// src/infra/logger.rs — Structured logging with tracing
//
// Logs go to stderr so they never interleave with transcripts on stdout.
// `SUPPORT_CHAT_LOG` takes precedence over `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "SUPPORT_CHAT_LOG";

/// HTTP internals are only interesting when asked for explicitly.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

pub fn init_logging(level: &str) {
    let requested = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let filter = EnvFilter::try_new(filter_directives(level, requested.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Directive string for the subscriber: the requested filter if one was
/// given, otherwise `default_level` with noisy dependencies held at `warn`.
pub fn filter_directives(default_level: &str, requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => std::iter::once(default_level)
            .chain(QUIET_DEPENDENCIES.iter().copied())
            .collect::<Vec<_>>()
            .join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_http() {
        let d = filter_directives("debug", None);
        assert!(d.starts_with("debug,"));
        assert!(d.contains("hyper=warn"));
        assert!(d.contains("reqwest=warn"));
    }

    #[test]
    fn test_requested_filter_wins() {
        assert_eq!(filter_directives("warn", Some("support_chat=trace")), "support_chat=trace");
        assert_eq!(filter_directives("warn", Some("  ")), filter_directives("warn", None));
    }

    #[test]
    fn test_directives_parse() {
        assert!(EnvFilter::try_new(filter_directives("info", None)).is_ok());
    }
}
