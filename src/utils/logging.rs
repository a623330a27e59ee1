use std::{path::Path, sync::LazyLock};

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "lifelog";
const KEPT_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "info";

/// Diagnostics requested on the command line. Command output itself never goes through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggingOptions {
    /// Level from `--log-filter`.
    pub level: Option<LevelFilter>,
    /// Mirror log lines to standard output.
    pub console: bool,
}

impl LoggingOptions {
    /// `--log` without an explicit level shows everything.
    pub fn from_flags(level: Option<LevelFilter>, console: bool) -> Self {
        Self {
            level: level.or_else(|| console.then_some(LevelFilter::TRACE)),
            console,
        }
    }

    /// Filter directive for this crate. An explicit level wins over `rust_log`, a `rust_log` that
    /// already names targets is used as is.
    fn directive(&self, rust_log: Option<&str>) -> String {
        let crate_level =
            |level: &str| format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"));
        match (self.level, rust_log.map(str::trim)) {
            (Some(level), _) => crate_level(&level.to_string().to_lowercase()),
            (None, Some(value)) if value.contains('=') => value.to_owned(),
            (None, Some(value)) if !value.is_empty() => crate_level(value),
            _ => crate_level(DEFAULT_LEVEL),
        }
    }
}

/// Logs always go to daily rotated files in `log_dir`.
pub fn enable_logging(log_dir: &Path, options: LoggingOptions) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;

    let console = options.console;
    let stdout = std::io::stdout.with_filter(move |_| console);
    let rust_log = std::env::var("RUST_LOG").ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(options.directive(rust_log.as_deref())))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .try_init()
        .map_err(|e| anyhow!("Failed to set up logging: {e}"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
