// src/logging.rs
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// `RUST_LOG` wins when set and valid, then `LOG_LEVEL`, then `info`.
pub fn env_filter(rust_log: Option<&str>, log_level: Option<&str>) -> EnvFilter {
    [rust_log, log_level]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .find_map(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init() {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let log_level = env::var("LOG_LEVEL").ok();
    fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), log_level.as_deref()))
        .init();
}

/// Route stage diagnostics into the test harness output. Safe to call from
/// every test.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cheque_reminder=debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn rust_log_is_not_overridden_by_log_level() {
        let filter = env_filter(Some("debug"), Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn log_level_applies_without_rust_log() {
        let filter = env_filter(None, Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(env_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            env_filter(Some("  "), None).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
