//! Study Tracker - command-line front end
//!
//! Reads the CSV tables, prints recommendations, progress and study plans as
//! JSON on stdout. Logs go to stderr.

mod cli;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// WARN unless the directives say otherwise.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=info for store activity
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(std::io::stderr)
        .init();

    cli::run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter("").to_string(), "warn");
    }

    #[test]
    fn test_log_filter_honors_directives() {
        assert_eq!(log_filter("info").to_string(), "info");
        assert_eq!(log_filter("study_engine=debug").to_string(), "study_engine=debug");
    }
}
